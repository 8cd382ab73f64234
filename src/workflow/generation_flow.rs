//! 生成流程 - 流程层
//!
//! 核心职责：定义"一次生成"的完整流程
//!
//! 流程顺序：
//! 1. 读取文档（.doc 先转换为 .docx）→ 文本片段
//! 2. 抽题 → 截图配对 → 组页
//! 3. 逐页渲染 → PDF 字节

use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppResult, DocumentError};
use crate::models::{load_docx_fragments, RawFragment, ScreenshotRef};
use crate::services::{render_document, DocConverter, PageAssembler, PdfRenderer, RenderSettings};
use crate::utils::logging;
use crate::workflow::generation_ctx::GenerationCtx;

/// 一次生成的结果
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    /// 抽取到的题目数
    pub question_count: usize,
    /// PDF 页数
    pub page_count: usize,
    /// 成功嵌入的截图数
    pub embedded_images: usize,
    /// 分配到页面但无法嵌入的截图数
    pub skipped_images: usize,
    /// 没有对应题目的截图（题号, 文件名）
    pub unassigned: Vec<(usize, String)>,
    /// 没有题目时为 None
    pub pdf: Option<Vec<u8>>,
}

impl GenerationOutcome {
    pub fn is_empty(&self) -> bool {
        self.question_count == 0
    }
}

/// 生成流程
///
/// - 编排读取、组页、渲染三个步骤
/// - 不持有任何跨请求状态，每次调用都重新组页
/// - 临时文件只存在于单次调用内
pub struct GenerationFlow {
    assembler: PageAssembler,
    render_settings: RenderSettings,
    converter: DocConverter,
}

impl GenerationFlow {
    /// 创建新的生成流程
    pub fn new(config: &Config) -> Self {
        Self {
            assembler: PageAssembler::new(config.assembly_options()),
            render_settings: config.render_settings(),
            converter: DocConverter::new(config.office_binary.clone()),
        }
    }

    pub async fn run(
        &self,
        ctx: &GenerationCtx,
        screenshots: &[ScreenshotRef],
    ) -> AppResult<GenerationOutcome> {
        info!("{} 📋 正在读取题目文档...", ctx);
        let fragments = self.load_fragments(&ctx.document_path).await?;
        info!("{} 读取到 {} 个文本片段", ctx, fragments.len());

        self.generate(&fragments, screenshots)
    }

    /// 读取文档文本片段
    ///
    /// .doc 先转换，转换产生的临时目录在本函数返回前删除。
    pub async fn load_fragments(&self, path: &Path) -> AppResult<Vec<RawFragment>> {
        if DocConverter::needs_conversion(path) {
            let converted = self.converter.convert_to_docx(path).await?;
            return load_docx_fragments(converted.path()).await;
        }

        let is_docx = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if !is_docx {
            return Err(DocumentError::UnsupportedFormat {
                path: path.display().to_string(),
            }
            .into());
        }

        load_docx_fragments(path).await
    }

    /// 组页并渲染
    ///
    /// 没有合格题目时不渲染，返回 `pdf: None`。
    pub fn generate(
        &self,
        fragments: &[RawFragment],
        screenshots: &[ScreenshotRef],
    ) -> AppResult<GenerationOutcome> {
        let assembly = self.assembler.assemble(fragments, screenshots);

        let unassigned = assembly
            .unassigned
            .iter()
            .map(|(key, shot)| (*key, shot.filename.clone()))
            .collect();

        if assembly.is_empty() {
            warn!("⚠️ 文档中没有找到任何题目，不生成 PDF");
            return Ok(GenerationOutcome {
                unassigned,
                ..Default::default()
            });
        }

        let question_texts: Vec<&str> = assembly
            .pages
            .iter()
            .map(|p| p.question_text.as_str())
            .collect();
        logging::log_questions_loaded(&question_texts);
        logging::log_screenshot_assignment(&assembly.pages, &assembly.unassigned);

        info!(
            "✨ 正在生成 PDF ({} 页, {} 张截图)...",
            assembly.pages.len(),
            assembly.embedded_count()
        );
        let mut renderer = PdfRenderer::new(self.render_settings);
        render_document(&mut renderer, &assembly.pages)?;
        let (pdf, stats) = renderer.finish_with_stats()?;

        Ok(GenerationOutcome {
            question_count: assembly.pages.len(),
            page_count: stats.pages,
            embedded_images: stats.embedded_images,
            skipped_images: stats.skipped_images,
            unassigned,
            pdf: Some(pdf),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn flow() -> GenerationFlow {
        GenerationFlow::new(&Config::default())
    }

    #[test]
    fn test_generate_without_questions() {
        let outcome = flow()
            .generate(
                &[RawFragment::paragraph("hi"), RawFragment::paragraph("   ")],
                &[ScreenshotRef::new("1.png", vec![1])],
            )
            .unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.pdf.is_none());
        assert_eq!(outcome.unassigned, vec![(1, "1.png".to_string())]);
    }

    #[test]
    fn test_generate_pages_match_questions() {
        let fragments = vec![
            RawFragment::paragraph("What is 2+2?"),
            RawFragment::paragraph("Name the capital of France."),
            RawFragment::paragraph("Explain photosynthesis briefly."),
        ];
        let outcome = flow()
            .generate(&fragments, &[ScreenshotRef::new("9.png", vec![0])])
            .unwrap();

        assert_eq!(outcome.question_count, 3);
        assert_eq!(outcome.page_count, 3);
        assert_eq!(outcome.embedded_images, 0);
        assert_eq!(outcome.unassigned, vec![(9, "9.png".to_string())]);

        let pdf = outcome.pdf.unwrap();
        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_single_question_counts_one_page() {
        let outcome = flow()
            .generate(&[RawFragment::paragraph("Only one question here")], &[])
            .unwrap();
        assert_eq!(outcome.question_count, 1);
        assert_eq!(outcome.page_count, 1);
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let err = flow()
            .load_fragments(Path::new("questions.txt"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Document(DocumentError::UnsupportedFormat { .. })
        ));
    }
}
