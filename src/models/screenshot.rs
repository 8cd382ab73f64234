use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 一张截图：原始文件名 + 图片字节
///
/// 字节用 `Arc` 共享，复制引用不会复制图片数据。
#[derive(Clone, PartialEq, Eq)]
pub struct ScreenshotRef {
    pub filename: String,
    pub data: Arc<[u8]>,
}

impl ScreenshotRef {
    pub fn new(filename: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

impl fmt::Debug for ScreenshotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenshotRef")
            .field("filename", &self.filename)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// 题号（从1开始）→ 截图列表
///
/// 有序 map，遍历顺序只取决于题号；同一题号下保持上传顺序。
pub type ScreenshotMap = BTreeMap<usize, Vec<ScreenshotRef>>;
