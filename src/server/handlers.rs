use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, InputError};
use crate::models::{QuizResult, UploadedDocument, WrongQuestionList};
use crate::server::AppState;
use crate::workflow::QuizCtx;

/// 表单中的文件字段名
pub const PDF_FIELD: &str = "pdfFile";
/// 表单中的错题号码字段名
pub const WRONG_QUESTIONS_FIELD: &str = "wrongQuestions";

/// 出题接口
///
/// 表单缺少文件或错题号码时直接返回 400，不会提取文字，也不会调用模型。
pub async fn generate_quiz(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<QuizResult>> {
    let request_id = state.next_request_id();

    let (document, wrong_questions) = read_form(multipart).await.map_err(|e| {
        warn!("[请求 #{}] ⚠️ 请求不完整: {}", request_id, e);
        e
    })?;

    let ctx = QuizCtx::new(request_id, wrong_questions.len());
    info!(
        "{} 📥 收到出题请求: 文件 {} ({} 字节)，错题 [{}]",
        ctx,
        document.file_name.as_deref().unwrap_or("<未命名>"),
        document.len(),
        wrong_questions
    );

    let quiz = state.flow.run(document, &wrong_questions, &ctx).await?;
    Ok(Json(quiz))
}

/// 读取表单中的文件和错题号码
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(UploadedDocument, WrongQuestionList)> {
    let mut multipart = multipart.map_err(|e| AppError::malformed_form(e.body_text()))?;

    let mut document: Option<UploadedDocument> = None;
    let mut raw_wrong_questions: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(PDF_FIELD) => {
                let media_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                document =
                    Some(UploadedDocument::new(bytes.to_vec(), media_type).with_file_name(file_name));
            }
            Some(WRONG_QUESTIONS_FIELD) => {
                raw_wrong_questions = Some(field.text().await.map_err(form_error)?);
            }
            _ => {}
        }
    }

    let document = document.ok_or_else(|| AppError::missing_field(PDF_FIELD))?;
    let raw_wrong_questions =
        raw_wrong_questions.ok_or_else(|| AppError::missing_field(WRONG_QUESTIONS_FIELD))?;

    let wrong_questions = WrongQuestionList::parse(&raw_wrong_questions);
    if wrong_questions.is_empty() {
        return Err(AppError::Input(InputError::NoWrongQuestions));
    }

    Ok((document, wrong_questions))
}

fn form_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Input(InputError::PayloadTooLarge {
            reason: err.body_text(),
        })
    } else {
        AppError::malformed_form(err.body_text())
    }
}
