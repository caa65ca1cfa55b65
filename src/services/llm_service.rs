//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词发给模型并拿回文字"，不关心提示词内容和回复格式
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（默认使用 Gemini 的 OpenAI 兼容端点）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ServiceError;

/// 文本生成能力
///
/// 出题流程只依赖这个接口，测试中可以换成固定回复的实现。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 发送一条提示词，返回模型的原始回复
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// LLM 服务
///
/// 职责：
/// - 每次调用只发一次请求，不重试（包括客户端内置的退避重试）
/// - 把 API 错误归类为鉴权、配额、网络等类型
/// - 底层 HTTP 连接池在请求之间共享
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        // 关闭客户端自带的退避重试：5xx / 429 直接作为错误返回
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = Client::with_config(openai_config).with_backoff(no_retry);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: config.llm_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn send_to_llm(&self, user_message: &str) -> Result<String, ServiceError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(invalid_request)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(invalid_request)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_error(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ServiceError::EmptyReply {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        match self.timeout {
            None => self.send_to_llm(prompt).await,
            Some(limit) => tokio::time::timeout(limit, self.send_to_llm(prompt))
                .await
                .map_err(|_| ServiceError::TimedOut {
                    model: self.model_name.clone(),
                    secs: limit.as_secs(),
                })?,
        }
    }
}

fn invalid_request(err: OpenAIError) -> ServiceError {
    ServiceError::InvalidRequest {
        message: err.to_string(),
    }
}

/// 把 async-openai 的错误归类
fn classify_error(model: &str, err: OpenAIError) -> ServiceError {
    match err {
        OpenAIError::ApiError(api_error) => classify_api_message(model, api_error.to_string()),
        OpenAIError::InvalidArgument(message) => ServiceError::InvalidRequest { message },
        other => ServiceError::transport(model, other),
    }
}

/// 根据服务返回的错误信息判断失败类型
fn classify_api_message(model: &str, message: String) -> ServiceError {
    let lower = message.to_lowercase();
    let model = model.to_string();

    const AUTH_MARKERS: [&str; 6] = [
        "api key",
        "api_key",
        "unauthorized",
        "unauthenticated",
        "permission_denied",
        "authentication",
    ];
    const QUOTA_MARKERS: [&str; 5] = [
        "quota",
        "rate limit",
        "rate_limit",
        "resource_exhausted",
        "too many requests",
    ];

    if AUTH_MARKERS.iter().any(|marker| lower.contains(marker)) {
        ServiceError::Unauthorized { model, message }
    } else if QUOTA_MARKERS.iter().any(|marker| lower.contains(marker)) {
        ServiceError::QuotaExhausted { model, message }
    } else {
        ServiceError::Rejected { model, message }
    }
}
