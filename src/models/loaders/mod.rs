pub mod docx_loader;
pub mod screenshot_loader;

pub use docx_loader::{load_docx_fragments, parse_docx_fragments};
pub use screenshot_loader::{load_screenshot_dir, load_screenshot_files};
