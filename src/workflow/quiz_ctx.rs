//! 出题请求上下文
//!
//! 封装"这是第几个请求、要出几道题"这一信息，用于日志关联

use std::fmt::Display;

/// 出题请求上下文
#[derive(Debug, Clone)]
pub struct QuizCtx {
    /// 请求编号（进程内递增）
    pub request_id: u64,

    /// 错题数量，也就是期望生成的题目数量
    pub wrong_count: usize,
}

impl QuizCtx {
    /// 创建新的请求上下文
    pub fn new(request_id: u64, wrong_count: usize) -> Self {
        Self {
            request_id,
            wrong_count,
        }
    }
}

impl Display for QuizCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 #{} 错题 {} 道]", self.request_id, self.wrong_count)
    }
}
