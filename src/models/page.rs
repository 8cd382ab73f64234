use crate::models::screenshot::ScreenshotRef;

/// 单页内容描述，配对逻辑与渲染后端之间的约定
///
/// 每次生成时重新构建，渲染完即丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    /// 页码（从1开始，与题号一致）
    pub index: usize,
    pub question_text: String,
    /// 本页截图，可能为空
    pub images: Vec<ScreenshotRef>,
    pub show_page_number: bool,
}

impl PageDescriptor {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}
