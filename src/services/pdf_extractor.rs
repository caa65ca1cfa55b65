//! 文档文本提取服务 - 业务能力层
//!
//! 只负责"把上传的 PDF 变成纯文本"，不关心后续流程

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::UploadedDocument;

/// PDF 文件头必须出现在前 1024 字节内
const PDF_SIGNATURE: &[u8] = b"%PDF-";
const SIGNATURE_SEARCH_WINDOW: usize = 1024;

/// 两行及以上的连续空行（允许行内只有空白）
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r\f]*(?:\n[ \t\r\f]*){2,}").unwrap());

/// 文本提取能力
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// 提取文档中的全部文字，文档在提取后被丢弃
    async fn extract(&self, document: UploadedDocument) -> Result<String, ExtractionError>;
}

/// 基于 `pdf-extract` 的 PDF 文本提取
#[derive(Debug, Default, Clone)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, document: UploadedDocument) -> Result<String, ExtractionError> {
        check_signature(&document)?;

        debug!(
            "开始提取 PDF 文本: {} ({} 字节)",
            document.file_name.as_deref().unwrap_or("<未命名>"),
            document.len()
        );

        // pdf-extract 是同步且 CPU 密集的，放到阻塞线程池执行；
        // 它在遇到损坏文件时可能 panic，JoinError 会把 panic 转成普通错误
        let bytes = document.bytes;
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Malformed {
            reason: format!("解析任务异常终止: {}", e),
        })?
        .map_err(|reason| ExtractionError::Malformed { reason })?;

        let text = normalize_text(&text);
        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        debug!("PDF 文本提取完成，长度: {} 字符", text.chars().count());
        Ok(text)
    }
}

/// 检查文件是否为 PDF
fn check_signature(document: &UploadedDocument) -> Result<(), ExtractionError> {
    if document.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    let window = &document.bytes[..document.len().min(SIGNATURE_SEARCH_WINDOW)];
    let has_signature = window
        .windows(PDF_SIGNATURE.len())
        .any(|chunk| chunk == PDF_SIGNATURE);
    if !has_signature {
        return Err(ExtractionError::NotPdf {
            media_type: document.media_type.clone(),
        });
    }

    if document.media_type != "application/pdf" {
        warn!(
            "上传文件声明的类型为 {}，但内容是 PDF，继续处理",
            document.media_type
        );
    }
    Ok(())
}

/// 合并连续空行，只压缩空白，不删除文字
fn normalize_text(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_empty_document_is_rejected() {
        let doc = UploadedDocument::new(Vec::new(), "application/pdf");
        let result = PdfExtractor::new().extract(doc).await;
        assert!(matches!(result, Err(ExtractionError::EmptyDocument)));
    }

    #[tokio::test]
    async fn test_non_pdf_content_is_rejected() {
        let doc = UploadedDocument::new(b"just some text".to_vec(), "text/plain");
        let result = PdfExtractor::new().extract(doc).await;
        match result {
            Err(ExtractionError::NotPdf { media_type }) => assert_eq!(media_type, "text/plain"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_reported_as_malformed() {
        let doc = UploadedDocument::new(
            b"%PDF-1.4\nthis is not really a pdf body\n%%EOF".to_vec(),
            "application/pdf",
        );
        let result = PdfExtractor::new().extract(doc).await;
        assert_err!(&result);
        assert!(matches!(
            result,
            Err(ExtractionError::Malformed { .. }) | Err(ExtractionError::NoText)
        ));
    }

    #[test]
    fn test_signature_may_follow_leading_bytes() {
        let mut bytes = vec![b' '; 16];
        bytes.extend_from_slice(b"%PDF-1.7");
        let doc = UploadedDocument::new(bytes, "application/octet-stream");
        assert!(check_signature(&doc).is_ok());
    }

    #[test]
    fn test_normalize_collapses_blank_lines_only() {
        let text = "第1题\n\n\n\n  \n第2题\n第3题";
        assert_eq!(normalize_text(text), "第1题\n\n第2题\n第3题");
    }
}
