pub mod fragment;
pub mod loaders;
pub mod options;
pub mod page;
pub mod question;
pub mod screenshot;

pub use fragment::{FragmentKind, RawFragment};
pub use loaders::{
    load_docx_fragments, load_screenshot_dir, load_screenshot_files, parse_docx_fragments,
};
pub use options::{AssemblyOptions, ExtractOptions, PageSize, PairingPolicy};
pub use page::PageDescriptor;
pub use question::Question;
pub use screenshot::{ScreenshotMap, ScreenshotRef};
