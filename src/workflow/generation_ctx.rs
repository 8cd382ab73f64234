//! 生成上下文
//!
//! 封装"这一次生成读的是哪份文档、写到哪里"这一信息

use std::fmt::Display;
use std::path::PathBuf;

/// 单次生成的上下文
#[derive(Debug, Clone)]
pub struct GenerationCtx {
    /// 题目文档路径
    pub document_path: PathBuf,

    /// 输出 PDF 路径
    pub output_path: PathBuf,
}

impl GenerationCtx {
    /// 创建新的生成上下文
    pub fn new(document_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            output_path: output_path.into(),
        }
    }

    /// 文档文件名（仅用于日志显示）
    pub fn document_name(&self) -> String {
        self.document_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

impl Display for GenerationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {}]", self.document_name())
    }
}
