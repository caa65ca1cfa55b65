//! HTTP 接口层
//!
//! - `POST /generate-quiz` 出题接口
//! - 其余路径由静态文件目录提供
//! - 允许跨域请求

pub mod handlers;
pub mod response;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::workflow::QuizFlow;

/// 所有请求共享的状态
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<QuizFlow>,
    next_request_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(flow: QuizFlow) -> Self {
        Self {
            flow: Arc::new(flow),
            next_request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// 分配一个请求编号（仅用于日志关联）
    pub fn next_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// 构建路由
pub fn build_router(config: &Config, state: AppState) -> Router {
    Router::new()
        .route("/generate-quiz", post(handlers::generate_quiz))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
