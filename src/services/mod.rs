pub mod doc_converter;
pub mod page_assembler;
pub mod pdf_renderer;
pub mod question_extractor;
pub mod screenshot_matcher;

pub use doc_converter::{ConvertedDocument, DocConverter};
pub use page_assembler::{build_pages, unassigned_screenshots, Assembly, PageAssembler};
pub use pdf_renderer::{
    render_document, Margins, PdfRenderer, RenderBackend, RenderSettings, RenderStats,
};
pub use question_extractor::extract_questions;
pub use screenshot_matcher::{assign_screenshots, first_integer_run};
