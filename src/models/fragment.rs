//! 文档原始文本片段
//!
//! 文档加载器按文档顺序产出片段：先是全部正文段落，再是表格单元格文本。

/// 片段来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// 正文段落（不在表格内）
    Paragraph,
    /// 表格单元格
    TableCell,
}

/// 一个尚未清洗的文本片段
///
/// 内容保存为原始字节，无法按 UTF-8 解析的片段在抽题时直接跳过。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub kind: FragmentKind,
    pub data: Vec<u8>,
}

impl RawFragment {
    pub fn new(kind: FragmentKind, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// 正文段落片段
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::Paragraph, text.into().into_bytes())
    }

    /// 表格单元格片段
    pub fn table_cell(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::TableCell, text.into().into_bytes())
    }

    /// 按 UTF-8 解析内容
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}
