//! 出题流程 - 流程层
//!
//! 核心职责：定义"一次出题请求"的完整处理流程
//!
//! 流程顺序（严格串行，任一步失败即终止）：
//! 1. 提取 PDF 文字
//! 2. 构建提示词
//! 3. 调用模型
//! 4. 解析并校验回复

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{FlowFailure, Stage};
use crate::models::{QuizResult, UploadedDocument, WrongQuestionList};
use crate::services::{
    build_quiz_prompt, parse_quiz_response, DocumentExtractor, LlmService, PdfExtractor,
    TextGenerator,
};
use crate::utils::logging::truncate_text;
use crate::workflow::quiz_ctx::QuizCtx;

/// 出题流程
///
/// - 编排 提取 → 提示词 → 模型 → 解析 四个阶段
/// - 不持有任何请求级状态，可以在多个请求之间共享
/// - 只依赖业务能力（services）
pub struct QuizFlow {
    extractor: Arc<dyn DocumentExtractor>,
    generator: Arc<dyn TextGenerator>,
    verbose_logging: bool,
}

impl QuizFlow {
    /// 使用 PDF 提取器和 LLM 服务创建流程
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: Arc::new(PdfExtractor::new()),
            generator: Arc::new(LlmService::new(config)),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 使用自定义的提取器和生成器创建流程
    pub fn with_components(
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn TextGenerator>,
        verbose_logging: bool,
    ) -> Self {
        Self {
            extractor,
            generator,
            verbose_logging,
        }
    }

    pub async fn run(
        &self,
        document: UploadedDocument,
        wrong_questions: &WrongQuestionList,
        ctx: &QuizCtx,
    ) -> Result<QuizResult, FlowFailure> {
        let result = self.run_stages(document, wrong_questions, ctx).await;

        if let Err(failure) = &result {
            error!(
                "{} ❌ 出题失败 | 阶段: {} | 类型: {} | 原因: {}",
                ctx, failure.stage, failure.kind, failure.error
            );
        }

        result
    }

    async fn run_stages(
        &self,
        document: UploadedDocument,
        wrong_questions: &WrongQuestionList,
        ctx: &QuizCtx,
    ) -> Result<QuizResult, FlowFailure> {
        self.enter(ctx, Stage::Received);

        // ========== 阶段 1: 提取文字 ==========
        self.enter(ctx, Stage::Extracting);
        info!(
            "{} 📄 正在提取试卷文字 ({} 字节)...",
            ctx,
            document.len()
        );
        let document_text = self
            .extractor
            .extract(document)
            .await
            .map_err(|e| FlowFailure::new(Stage::Extracting, e))?;
        info!(
            "{} ✓ 文字提取完成，共 {} 字符",
            ctx,
            document_text.chars().count()
        );

        // ========== 阶段 2: 构建提示词 ==========
        self.enter(ctx, Stage::Prompting);
        let prompt = build_quiz_prompt(&document_text, wrong_questions);
        if self.verbose_logging {
            info!("{} 提示词预览: {}", ctx, truncate_text(&prompt, 200));
        }

        // ========== 阶段 3: 调用模型 ==========
        self.enter(ctx, Stage::Generating);
        info!("{} 🤖 正在请求模型生成变式题...", ctx);
        let raw_response = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| FlowFailure::new(Stage::Generating, e))?;
        if self.verbose_logging {
            info!(
                "{} 模型回复预览: {}",
                ctx,
                truncate_text(&raw_response, 200)
            );
        }

        // ========== 阶段 4: 解析回复 ==========
        self.enter(ctx, Stage::Parsing);
        let quiz = parse_quiz_response(&raw_response)
            .map_err(|e| FlowFailure::new(Stage::Parsing, e))?;

        if quiz.len() != wrong_questions.len() {
            warn!(
                "{} ⚠️ 生成题目数量 {} 与错题数量 {} 不一致",
                ctx,
                quiz.len(),
                wrong_questions.len()
            );
        }

        for item in &quiz {
            debug!("{} {}", ctx, item);
        }

        self.enter(ctx, Stage::Completed);
        info!("{} ✅ 成功生成 {} 道题目", ctx, quiz.len());
        Ok(quiz)
    }

    fn enter(&self, ctx: &QuizCtx, stage: Stage) {
        debug!("{} → {}", ctx, stage);
    }
}
