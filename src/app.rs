use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::server::{build_router, AppState};
use crate::utils::logging::{log_shutdown, log_startup};
use crate::workflow::QuizFlow;

/// 应用主结构
pub struct App {
    config: Config,
    listener: TcpListener,
    router: axum::Router,
}

impl App {
    /// 初始化应用：构建出题流程和路由，绑定端口
    pub async fn initialize(config: Config) -> Result<Self> {
        let flow = QuizFlow::new(&config);
        let router = build_router(&config, AppState::new(flow));

        let listener = TcpListener::bind(("0.0.0.0", config.listen_port)).await?;

        Ok(Self {
            config,
            listener,
            router,
        })
    }

    /// 运行服务，直到收到退出信号
    pub async fn run(self) -> Result<()> {
        let listen_addr = self.listener.local_addr()?.to_string();
        log_startup(
            &listen_addr,
            &self.config.llm_model_name,
            &self.config.static_dir,
        );

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_shutdown();
        Ok(())
    }
}

/// 等待 Ctrl-C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("无法监听 Ctrl-C 信号: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("无法监听 SIGTERM 信号: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到退出信号，正在停止服务...");
}
