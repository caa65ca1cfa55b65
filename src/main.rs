use anyhow::Result;
use quiz_generator::config::Config;
use quiz_generator::utils::logging;
use quiz_generator::App;

#[tokio::main]
async fn main() -> Result<()> {
    // 读取 .env（不存在时忽略）
    dotenvy::dotenv().ok();

    // 初始化日志
    logging::init();

    // 加载配置，缺少密钥时直接退出
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("配置错误: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
