/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 默认级别为 info，可以通过 `RUST_LOG` 覆盖。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `listen_addr`: 监听地址
/// - `model_name`: 使用的模型
/// - `static_dir`: 静态文件目录
pub fn log_startup(listen_addr: &str, model_name: &str, static_dir: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 出题服务启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: http://{}", listen_addr);
    info!("🤖 模型: {}", model_name);
    info!("📁 静态文件目录: {}", static_dir);
    info!("{}", "=".repeat(60));
}

/// 记录程序退出信息
pub fn log_shutdown() {
    info!("\n{}", "─".repeat(60));
    info!("👋 出题服务已停止");
    info!(
        "停止时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("你好世界", 2), "你好...");
        assert_eq!(truncate_text("abc", 3), "abc");
        assert_eq!(truncate_text("", 5), "");
    }
}
