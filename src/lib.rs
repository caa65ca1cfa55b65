//! # Quiz Generator
//!
//! 根据学生上传的试卷和错题号码，调用大模型生成变式练习题的 HTTP 服务
//!
//! ## 架构设计
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理一件事
//! - `PdfExtractor` - PDF 文字提取能力
//! - `build_quiz_prompt` - 提示词构建能力
//! - `LlmService` - 模型调用能力
//! - `parse_quiz_response` - 回复解析与校验能力
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一次出题请求"的完整处理流程
//! - `QuizCtx` - 上下文封装（请求编号 + 错题数量）
//! - `QuizFlow` - 流程编排（提取 → 提示词 → 模型 → 解析）
//!
//! ### ③ 接口层（Server）
//! - `server/` - HTTP 路由、表单读取、错误到响应的映射
//! - `App` - 管理应用生命周期（绑定端口、运行、退出）
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{QuizItem, QuizResult, UploadedDocument, WrongQuestionList};
pub use server::{build_router, AppState};
pub use services::{DocumentExtractor, TextGenerator};
pub use workflow::{QuizCtx, QuizFlow};
