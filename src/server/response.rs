//! 错误到 HTTP 响应的映射
//!
//! 客户端只会看到通用提示，具体原因只写进服务端日志。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, InputError};

/// 请求不完整时的提示
pub const INCOMPLETE_REQUEST_MESSAGE: &str = "请求不完整，缺少试卷文件或错题号码。";
/// 上传过大时的提示
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "上传的文件过大。";
/// 出题失败时的统一提示
pub const GENERATION_FAILED_MESSAGE: &str = "AI 生成题目失败，请稍后再试。";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(InputError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::Input(InputError::PayloadTooLarge { .. }) => PAYLOAD_TOO_LARGE_MESSAGE,
            AppError::Input(_) => INCOMPLETE_REQUEST_MESSAGE,
            AppError::Pipeline(_) => GENERATION_FAILED_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, FlowFailure, Stage};

    #[test]
    fn test_input_errors_map_to_400() {
        let err = AppError::missing_field("pdfFile");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), INCOMPLETE_REQUEST_MESSAGE);
    }

    #[test]
    fn test_oversize_maps_to_413() {
        let err = AppError::Input(InputError::PayloadTooLarge {
            reason: "limit".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_pipeline_errors_map_to_generic_500() {
        let err = AppError::Pipeline(FlowFailure::new(
            Stage::Extracting,
            ExtractionError::Malformed {
                reason: "secret document content".to_string(),
            },
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), GENERATION_FAILED_MESSAGE);
    }
}
