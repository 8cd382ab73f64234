//! .doc → .docx 转换能力
//!
//! 旧版 .doc 不直接解析，而是交给外部办公套件（LibreOffice 的 `soffice`）
//! 转成 .docx。转换结果放在临时目录里，[`ConvertedDocument`] 被 drop 时目录随之删除，
//! 无论后续步骤成功还是出错。

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ConvertError};

/// 转换后的文档，持有临时目录
#[derive(Debug)]
pub struct ConvertedDocument {
    _dir: TempDir,
    path: PathBuf,
}

impl ConvertedDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 外部转换器
#[derive(Debug, Clone)]
pub struct DocConverter {
    office_binary: String,
}

impl DocConverter {
    pub fn new(office_binary: impl Into<String>) -> Self {
        Self {
            office_binary: office_binary.into(),
        }
    }

    /// 是否需要先转换
    pub fn needs_conversion(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("doc"))
    }

    /// 调用外部程序把 .doc 转成 .docx
    pub async fn convert_to_docx(&self, source: &Path) -> AppResult<ConvertedDocument> {
        let dir = tempfile::tempdir()
            .map_err(|e| AppError::file_write_failed("临时目录", e))?;

        info!("🔄 正在转换 {} → .docx", source.display());
        debug!("转换命令: {} --headless --convert-to docx", self.office_binary);

        let output = Command::new(&self.office_binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("docx")
            .arg("--outdir")
            .arg(dir.path())
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ConvertError::SpawnFailed {
                program: self.office_binary.clone(),
                source: Box::new(e),
            })?;

        if !output.status.success() {
            return Err(ConvertError::ExitFailure {
                program: self.office_binary.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let mut name = source.file_stem().unwrap_or_default().to_os_string();
        name.push(".docx");
        let path = dir.path().join(name);
        if !path.exists() {
            return Err(ConvertError::OutputMissing {
                path: path.display().to_string(),
            }
            .into());
        }

        info!("✓ 转换完成");
        Ok(ConvertedDocument { _dir: dir, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_conversion() {
        assert!(DocConverter::needs_conversion(Path::new("paper.doc")));
        assert!(DocConverter::needs_conversion(Path::new("PAPER.DOC")));
        assert!(!DocConverter::needs_conversion(Path::new("paper.docx")));
        assert!(!DocConverter::needs_conversion(Path::new("doc")));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let converter = DocConverter::new("definitely-not-an-office-suite-binary");
        let err = converter
            .convert_to_docx(Path::new("paper.doc"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Convert(ConvertError::SpawnFailed { .. })
        ));
    }

    /// 需要本机安装 LibreOffice
    #[tokio::test]
    #[ignore]
    async fn test_convert_with_soffice() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sample.doc");
        std::fs::write(&source, b"Plain text saved as .doc").unwrap();

        let converter = DocConverter::new("soffice");
        let converted = converter.convert_to_docx(&source).await.unwrap();
        let kept = converted.path().to_path_buf();
        assert!(kept.exists());

        drop(converted);
        assert!(!kept.exists());
    }
}
