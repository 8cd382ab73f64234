//! PDF 渲染能力
//!
//! 渲染后端逐页接收 [`PageDescriptor`]，并被告知本页之后是否分页。
//! [`render_document`] 对除最后一页以外的每一页都要求分页，
//! 因此一页描述正好对应一页 PDF。

pub mod image_embed;
pub mod layout;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};

use crate::error::{AppResult, RenderError};
use crate::models::{PageDescriptor, PageSize};
use image_embed::{decode_screenshot, image_stream};
use layout::{encode_win_ansi, text_width, wrap_text};

const INCH: f32 = 72.0;
/// 题目与截图之间的间距
const SPACE_AFTER_QUESTION: f32 = 0.3 * INCH;
/// 每张截图前的间距
const IMAGE_SPACER: f32 = 0.2 * INCH;
const MAX_IMAGE_WIDTH: f32 = 5.0 * INCH;
/// 剩余空间低于该值时不再放截图
const MIN_IMAGE_HEIGHT: f32 = 0.5 * INCH;
const PAGE_NUMBER_FONT_SIZE: f32 = 9.0;
const PAGE_NUMBER_Y: f32 = 0.4 * INCH;
/// 题目颜色 #134252
const QUESTION_COLOR: [f32; 3] = [19.0 / 255.0, 66.0 / 255.0, 82.0 / 255.0];
const PAGE_NUMBER_GRAY: f32 = 0.5;

/// 页边距，单位 pt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.5 * INCH,
            right: 0.5 * INCH,
            top: 0.75 * INCH,
            bottom: 0.75 * INCH,
        }
    }
}

/// 渲染设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub page_size: PageSize,
    pub font_size: f32,
    pub margins: Margins,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            font_size: 14.0,
            margins: Margins::default(),
        }
    }
}

/// 渲染后端
pub trait RenderBackend {
    /// 渲染一页内容；`page_break_after` 为 true 时本页结束
    fn render_page(&mut self, page: &PageDescriptor, page_break_after: bool) -> AppResult<()>;

    /// 结束渲染，输出文档字节；未分页的内容在这里写出
    fn finish(self) -> AppResult<Vec<u8>>
    where
        Self: Sized;
}

/// 按顺序把所有页交给后端，最后一页之后不分页
///
/// 页码必须是连续的 `1..=n`。
pub fn render_document<B>(backend: &mut B, pages: &[PageDescriptor]) -> AppResult<()>
where
    B: RenderBackend + ?Sized,
{
    let total = pages.len();
    for (offset, page) in pages.iter().enumerate() {
        let expected = offset + 1;
        if page.index != expected {
            return Err(RenderError::PageOutOfOrder {
                expected,
                actual: page.index,
            }
            .into());
        }
        backend.render_page(page, expected < total)?;
    }
    Ok(())
}

/// 渲染统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub pages: usize,
    pub embedded_images: usize,
    pub skipped_images: usize,
    pub truncated_questions: usize,
}

/// 尚未写入文档的当前页
struct PageCanvas {
    operations: Vec<Operation>,
    xobjects: Dictionary,
    cursor_y: f32,
    show_page_number: bool,
}

impl PageCanvas {
    fn new(top: f32) -> Self {
        Self {
            operations: Vec::new(),
            xobjects: Dictionary::new(),
            cursor_y: top,
            show_page_number: false,
        }
    }
}

/// 基于 lopdf 的 PDF 后端
pub struct PdfRenderer {
    settings: RenderSettings,
    doc: Document,
    pages_id: ObjectId,
    regular_font: ObjectId,
    bold_font: ObjectId,
    page_ids: Vec<ObjectId>,
    canvas: Option<PageCanvas>,
    image_seq: usize,
    stats: RenderStats,
}

fn font_dictionary(base_font: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(base_font.as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

fn text_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)
}

impl PdfRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_font = doc.add_object(font_dictionary("Helvetica"));
        let bold_font = doc.add_object(font_dictionary("Helvetica-Bold"));

        Self {
            settings,
            doc,
            pages_id,
            regular_font,
            bold_font,
            page_ids: Vec::new(),
            canvas: None,
            image_seq: 0,
            stats: RenderStats::default(),
        }
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    fn page_top(&self) -> f32 {
        self.settings.page_size.dimensions().1 - self.settings.margins.top
    }

    fn content_width(&self) -> f32 {
        let margins = &self.settings.margins;
        self.settings.page_size.dimensions().0 - margins.left - margins.right
    }

    /// 绘制 "Q{n}: 题干"，超出页面底部的行被截断
    fn draw_question(&mut self, canvas: &mut PageCanvas, page: &PageDescriptor) {
        let font_size = self.settings.font_size;
        let leading = font_size * 1.4;
        let bottom = self.settings.margins.bottom;

        let heading = format!("Q{}: {}", page.index, page.question_text);
        let lines = wrap_text(&heading, font_size, self.content_width());

        let [r, g, b] = QUESTION_COLOR;
        canvas.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F2".to_vec()), Object::Real(font_size)]),
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new("TL", vec![Object::Real(leading)]),
        ]);

        let mut baseline = canvas.cursor_y - font_size;
        let mut drawn = 0;
        for line in &lines {
            if baseline < bottom {
                warn!("⚠️ 第 {} 题题干过长，超出部分已截断", page.index);
                self.stats.truncated_questions += 1;
                break;
            }
            if drawn == 0 {
                canvas.operations.push(Operation::new(
                    "Td",
                    vec![
                        Object::Real(self.settings.margins.left),
                        Object::Real(baseline),
                    ],
                ));
            } else {
                canvas.operations.push(Operation::new("T*", vec![]));
            }
            canvas
                .operations
                .push(Operation::new("Tj", vec![text_string(line)]));
            drawn += 1;
            baseline -= leading;
        }
        canvas.operations.push(Operation::new("ET", vec![]));

        canvas.cursor_y -= drawn as f32 * leading + SPACE_AFTER_QUESTION;
    }

    /// 依次放置截图，宽度不超过 5 英寸，超出剩余高度时等比缩小
    fn draw_images(&mut self, canvas: &mut PageCanvas, page: &PageDescriptor) -> AppResult<()> {
        let bottom = self.settings.margins.bottom;
        let left = self.settings.margins.left;

        for shot in &page.images {
            let decoded = match decode_screenshot(shot) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!("⚠️ 无法嵌入第 {} 题的截图: {}", page.index, e);
                    self.stats.skipped_images += 1;
                    continue;
                }
            };

            let top = canvas.cursor_y - IMAGE_SPACER;
            let available = top - bottom;
            let mut width = self.content_width().min(MAX_IMAGE_WIDTH);
            let mut height = width * decoded.aspect_ratio();

            if height > available {
                if available < MIN_IMAGE_HEIGHT {
                    warn!(
                        "⚠️ 第 {} 页剩余空间不足，截图 {} 未放入",
                        page.index, shot.filename
                    );
                    self.stats.skipped_images += 1;
                    continue;
                }
                let scale = available / height;
                width *= scale;
                height = available;
            }

            let image_id = self.doc.add_object(image_stream(&decoded)?);
            self.image_seq += 1;
            let name = format!("Im{}", self.image_seq);
            canvas
                .xobjects
                .set(name.as_bytes().to_vec(), Object::Reference(image_id));

            canvas.operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(width),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(height),
                        Object::Real(left),
                        Object::Real(top - height),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ]);

            debug!(
                "第 {} 题放入截图 {} ({:.0}x{:.0} pt)",
                page.index, shot.filename, width, height
            );
            canvas.cursor_y = top - height;
            self.stats.embedded_images += 1;
        }

        Ok(())
    }

    /// 把当前页写入文档
    fn flush_page(&mut self, canvas: PageCanvas) -> AppResult<()> {
        let page_number = self.page_ids.len() + 1;
        let (page_width, page_height) = self.settings.page_size.dimensions();

        let mut operations = canvas.operations;
        if canvas.show_page_number {
            let label = format!("Page {}", page_number);
            let x = (page_width - text_width(&label, PAGE_NUMBER_FONT_SIZE)) / 2.0;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(b"F1".to_vec()),
                        Object::Real(PAGE_NUMBER_FONT_SIZE),
                    ],
                ),
                Operation::new("g", vec![Object::Real(PAGE_NUMBER_GRAY)]),
                Operation::new("Td", vec![Object::Real(x), Object::Real(PAGE_NUMBER_Y)]),
                Operation::new("Tj", vec![text_string(&label)]),
                Operation::new("ET", vec![]),
            ]);
        }

        let encoded = Content { operations }
            .encode()
            .map_err(|e| RenderError::ContentEncodeFailed {
                page: page_number,
                source: Box::new(e),
            })?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        let fonts = Dictionary::from_iter(vec![
            ("F1", Object::Reference(self.regular_font)),
            ("F2", Object::Reference(self.bold_font)),
        ]);
        let resources = Dictionary::from_iter(vec![
            ("Font", Object::Dictionary(fonts)),
            ("XObject", Object::Dictionary(canvas.xobjects)),
        ]);
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_width),
                    Object::Real(page_height),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);

        let page_id = self.doc.add_object(page);
        self.page_ids.push(page_id);
        self.stats.pages = self.page_ids.len();
        Ok(())
    }

    /// 结束渲染，返回 PDF 字节和包含最后一页在内的统计
    pub fn finish_with_stats(mut self) -> AppResult<(Vec<u8>, RenderStats)> {
        if let Some(canvas) = self.canvas.take() {
            self.flush_page(canvas)?;
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(self.page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);

        let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let info = Dictionary::from_iter(vec![
            ("Title", text_string("Questions with screenshots")),
            ("Producer", text_string("question_pdf")),
            ("CreationDate", Object::string_literal(created)),
        ]);
        let info_id = self.doc.add_object(info);

        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok((buffer, self.stats))
    }
}

impl RenderBackend for PdfRenderer {
    fn render_page(&mut self, page: &PageDescriptor, page_break_after: bool) -> AppResult<()> {
        let top = self.page_top();
        let mut canvas = self.canvas.take().unwrap_or_else(|| PageCanvas::new(top));

        self.draw_question(&mut canvas, page);
        self.draw_images(&mut canvas, page)?;
        canvas.show_page_number = page.show_page_number;

        if page_break_after {
            self.flush_page(canvas)
        } else {
            self.canvas = Some(canvas);
            Ok(())
        }
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        self.finish_with_stats().map(|(bytes, _)| bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScreenshotRef;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 100, 50]),
        ));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    fn page(index: usize, text: &str, images: Vec<ScreenshotRef>) -> PageDescriptor {
        PageDescriptor {
            index,
            question_text: text.to_string(),
            images,
            show_page_number: true,
        }
    }

    /// 记录调用的测试后端
    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<(usize, bool)>,
    }

    impl RenderBackend for RecordingBackend {
        fn render_page(&mut self, page: &PageDescriptor, page_break_after: bool) -> AppResult<()> {
            self.calls.push((page.index, page_break_after));
            Ok(())
        }

        fn finish(self) -> AppResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_break_after_every_page_but_last() {
        let pages = vec![page(1, "one", vec![]), page(2, "two", vec![]), page(3, "three", vec![])];
        let mut backend = RecordingBackend::default();
        render_document(&mut backend, &pages).unwrap();
        assert_eq!(backend.calls, vec![(1, true), (2, true), (3, false)]);
    }

    #[test]
    fn test_gap_in_indices_is_rejected() {
        let pages = vec![page(1, "one", vec![]), page(3, "three", vec![])];
        let mut backend = RecordingBackend::default();
        let err = render_document(&mut backend, &pages).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Render(RenderError::PageOutOfOrder {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_one_pdf_page_per_descriptor() {
        let pages = vec![
            page(1, "What is 2+2?", vec![]),
            page(2, "Name the capital of France.", vec![ScreenshotRef::new("2.png", png(64, 32))]),
        ];
        let mut renderer = PdfRenderer::new(RenderSettings::default());
        render_document(&mut renderer, &pages).unwrap();
        // 最后一页还没有分页
        assert_eq!(renderer.stats().pages, 1);

        let (bytes, stats) = renderer.finish_with_stats().unwrap();
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.embedded_images, 1);

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_single_page_is_counted_after_finish() {
        let mut renderer = PdfRenderer::new(RenderSettings::default());
        render_document(&mut renderer, &[page(1, "Only question", vec![])]).unwrap();

        let (bytes, stats) = renderer.finish_with_stats().unwrap();
        assert_eq!(stats.pages, 1);
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn test_no_break_shares_page() {
        let mut renderer = PdfRenderer::new(RenderSettings::default());
        renderer.render_page(&page(1, "first question", vec![]), false).unwrap();
        renderer.render_page(&page(2, "second question", vec![]), false).unwrap();
        let bytes = renderer.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_broken_image_is_skipped() {
        let mut renderer = PdfRenderer::new(RenderSettings {
            page_size: PageSize::Letter,
            ..Default::default()
        });
        let pages = vec![page(
            1,
            "Question with bad image",
            vec![ScreenshotRef::new("1.png", b"garbage".to_vec())],
        )];
        render_document(&mut renderer, &pages).unwrap();

        assert_eq!(renderer.stats().skipped_images, 1);
        assert_eq!(renderer.stats().embedded_images, 0);
        let doc = Document::load_mem(&renderer.finish().unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_tall_images_are_scaled_or_skipped() {
        let shots = vec![
            ScreenshotRef::new("1a.png", png(10, 400)),
            ScreenshotRef::new("1b.png", png(10, 400)),
        ];
        let mut renderer = PdfRenderer::new(RenderSettings::default());
        render_document(&mut renderer, &[page(1, "Tall screenshots", shots)]).unwrap();

        // 第一张缩放到剩余高度，第二张已没有空间
        let stats = renderer.stats();
        assert_eq!(stats.embedded_images, 1);
        assert_eq!(stats.skipped_images, 1);
    }

    #[test]
    fn test_empty_document_still_serializes() {
        let renderer = PdfRenderer::new(RenderSettings::default());
        let bytes = renderer.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
