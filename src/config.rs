use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名（存在时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "quizgen.toml";

/// 程序配置
///
/// 启动时构建一次，之后以只读方式传给出题流程和 HTTP 服务。
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听端口
    pub listen_port: u16,
    /// 静态文件目录
    pub static_dir: String,
    /// 上传内容大小上限（字节）
    pub max_upload_bytes: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次模型调用的超时时间，未设置则不限制
    pub llm_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 3000,
            static_dir: "public".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            llm_model_name: "gemini-2.0-flash".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 4096,
            llm_timeout_secs: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_port", &self.listen_port)
            .field("static_dir", &self.static_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("verbose_logging", &self.verbose_logging)
            .field("llm_api_key", &"<redacted>")
            .field("llm_api_base_url", &self.llm_api_base_url)
            .field("llm_model_name", &self.llm_model_name)
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .finish()
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    ///
    /// 缺少模型服务密钥时返回错误，程序不应继续启动。
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("QUIZ_CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };

        let config = base.with_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，未出现的字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 按变量名返回值，测试中可以传入固定的映射。
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(key) = lookup("GOOGLE_API_KEY").or_else(|| lookup("LLM_API_KEY")) {
            self.llm_api_key = key;
        }
        if let Some(url) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = model;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.static_dir = dir;
        }
        if let Some(port) = parse_var(&lookup, "PORT", "u16")? {
            self.listen_port = port;
        }
        if let Some(limit) = parse_var(&lookup, "MAX_UPLOAD_BYTES", "usize")? {
            self.max_upload_bytes = limit;
        }
        if let Some(verbose) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = verbose;
        }
        if let Some(temperature) = parse_var(&lookup, "LLM_TEMPERATURE", "f32")? {
            self.llm_temperature = temperature;
        }
        if let Some(max_tokens) = parse_var(&lookup, "LLM_MAX_TOKENS", "u32")? {
            self.llm_max_tokens = max_tokens;
        }
        if let Some(secs) = parse_var(&lookup, "LLM_TIMEOUT_SECS", "u64")? {
            self.llm_timeout_secs = Some(secs);
        }
        Ok(self)
    }

    /// 校验必需的配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
