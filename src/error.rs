use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数错误（缺少文件或错题号码）
    #[error("请求错误: {0}")]
    Input(#[from] InputError),
    /// 出题流程失败
    #[error("出题流程失败: {0}")]
    Pipeline(#[from] FlowFailure),
}

/// 请求参数错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 缺少必填字段
    #[error("缺少字段 `{field}`")]
    MissingField { field: &'static str },
    /// 错题号码为空
    #[error("错题号码列表为空")]
    NoWrongQuestions,
    /// 表单无法读取
    #[error("无法读取表单: {reason}")]
    MalformedForm { reason: String },
    /// 上传内容超过大小限制
    #[error("上传内容过大: {reason}")]
    PayloadTooLarge { reason: String },
}

/// 文档文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 上传的文件为空
    #[error("上传的文件为空")]
    EmptyDocument,
    /// 文件不是 PDF
    #[error("文件不是 PDF 格式 (声明类型: {media_type})")]
    NotPdf { media_type: String },
    /// PDF 解析失败
    #[error("PDF 解析失败: {reason}")]
    Malformed { reason: String },
    /// PDF 中没有可提取的文字
    #[error("PDF 中没有可提取的文本")]
    NoText,
}

/// 生成服务错误
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 网络请求失败
    #[error("LLM 请求失败 (模型: {model}): {source}")]
    Transport {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 密钥被拒绝
    #[error("LLM 鉴权失败 (模型: {model}): {message}")]
    Unauthorized { model: String, message: String },
    /// 配额耗尽或请求频率限制
    #[error("LLM 配额不足 (模型: {model}): {message}")]
    QuotaExhausted { model: String, message: String },
    /// 服务返回其他错误
    #[error("LLM 返回错误 (模型: {model}): {message}")]
    Rejected { model: String, message: String },
    /// 请求构建失败
    #[error("LLM 请求构建失败: {message}")]
    InvalidRequest { message: String },
    /// 返回内容为空
    #[error("LLM 返回内容为空 (模型: {model})")]
    EmptyReply { model: String },
    /// 超时
    #[error("LLM 调用超时 (模型: {model}, {secs} 秒)")]
    TimedOut { model: String, secs: u64 },
}

/// 模型回复解析错误
#[derive(Debug, Error)]
pub enum ResponseError {
    /// 回复中找不到 JSON 数组
    #[error("AI 未返回有效的 JSON 数组 (回复长度: {response_len} 字符)")]
    Format { response_len: usize },
    /// JSON 语法错误
    #[error("JSON 解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    /// 题目结构不符合要求
    #[error("第 {index} 道题字段 `{field}` 不合法: {problem}")]
    Schema {
        index: usize,
        field: &'static str,
        problem: String,
    },
}

/// 流水线内部错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Extraction,
    Service,
    Format,
    Parse,
    Schema,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::Service => "ServiceError",
            ErrorKind::Format => "FormatError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Schema => "SchemaError",
        };
        f.write_str(name)
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Extraction(_) => ErrorKind::Extraction,
            PipelineError::Service(_) => ErrorKind::Service,
            PipelineError::Response(ResponseError::Format { .. }) => ErrorKind::Format,
            PipelineError::Response(ResponseError::Parse(_)) => ErrorKind::Parse,
            PipelineError::Response(ResponseError::Schema { .. }) => ErrorKind::Schema,
        }
    }
}

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracting,
    Prompting,
    Generating,
    Parsing,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "已接收",
            Stage::Extracting => "提取文本",
            Stage::Prompting => "构建提示词",
            Stage::Generating => "调用模型",
            Stage::Parsing => "解析回复",
            Stage::Completed => "已完成",
        };
        f.write_str(name)
    }
}

/// 流水线终止状态：在哪个阶段、因为什么失败
#[derive(Debug, Error)]
#[error("[{stage}] {kind}: {error}")]
pub struct FlowFailure {
    pub stage: Stage,
    pub kind: ErrorKind,
    #[source]
    pub error: PipelineError,
}

impl FlowFailure {
    pub fn new(stage: Stage, error: impl Into<PipelineError>) -> Self {
        let error = error.into();
        Self {
            stage,
            kind: error.kind(),
            error,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少模型服务密钥
    #[error("找不到模型服务密钥，请设置 GOOGLE_API_KEY 或 LLM_API_KEY")]
    MissingApiKey,
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建缺少字段错误
    pub fn missing_field(field: &'static str) -> Self {
        AppError::Input(InputError::MissingField { field })
    }

    /// 创建表单读取错误
    pub fn malformed_form(reason: impl Into<String>) -> Self {
        AppError::Input(InputError::MalformedForm {
            reason: reason.into(),
        })
    }
}

impl ServiceError {
    /// 创建网络请求失败错误
    pub fn transport(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ServiceError::Transport {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_kind() {
        let err = PipelineError::from(ExtractionError::EmptyDocument);
        assert_eq!(err.kind(), ErrorKind::Extraction);

        let err = PipelineError::from(ResponseError::Format { response_len: 3 });
        assert_eq!(err.kind(), ErrorKind::Format);

        let json_err = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        let err = PipelineError::from(ResponseError::from(json_err));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_flow_failure_records_stage_and_kind() {
        let failure = FlowFailure::new(
            Stage::Generating,
            ServiceError::EmptyReply {
                model: "gemini".to_string(),
            },
        );
        assert_eq!(failure.stage, Stage::Generating);
        assert_eq!(failure.kind, ErrorKind::Service);
        assert!(failure.to_string().contains("ServiceError"));
    }
}
