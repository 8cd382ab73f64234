//! 截图加载
//!
//! 截图顺序就是"上传顺序"：显式列表保持给定顺序，目录模式按文件名排序，
//! 不依赖文件系统返回的遍历顺序。

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::screenshot::ScreenshotRef;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// 判断是否为支持的截图文件
pub fn is_screenshot_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// 按给定顺序读取截图
///
/// 读取失败的文件只记录警告并跳过。
pub async fn load_screenshot_files(paths: &[PathBuf]) -> Vec<ScreenshotRef> {
    let mut screenshots = Vec::with_capacity(paths.len());

    for path in paths {
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        match fs::read(path).await {
            Ok(bytes) => {
                debug!("读取截图: {} ({} 字节)", filename, bytes.len());
                screenshots.push(ScreenshotRef::new(filename, bytes));
            }
            Err(e) => {
                warn!("⚠️ 无法读取截图 {}: {}", path.display(), e);
            }
        }
    }

    screenshots
}

/// 读取目录中的全部截图，按文件名排序
pub async fn load_screenshot_dir(dir: &Path) -> AppResult<Vec<ScreenshotRef>> {
    if !dir.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: dir.display().to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && is_screenshot_file(&path) {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    info!("📸 在 {} 中找到 {} 张截图", dir.display(), paths.len());

    Ok(load_screenshot_files(&paths).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_screenshot_file() {
        assert!(is_screenshot_file(Path::new("1.png")));
        assert!(is_screenshot_file(Path::new("shots/Q2.JPG")));
        assert!(is_screenshot_file(Path::new("q3.jpeg")));
        assert!(!is_screenshot_file(Path::new("notes.txt")));
        assert!(!is_screenshot_file(Path::new("png")));
    }

    #[tokio::test]
    async fn test_load_dir_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "readme.txt", "c.jpg"] {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }

        let shots = load_screenshot_dir(dir.path()).await.unwrap();
        let names: Vec<&str> = shots.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.jpg"]);
        assert_eq!(&*shots[0].data, b"a.png");
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("2.png");
        std::fs::write(&present, b"img").unwrap();

        let shots =
            load_screenshot_files(&[dir.path().join("missing.png"), present]).await;
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].filename, "2.png");
    }

    #[test]
    fn test_missing_dir_is_error() {
        let result = tokio_test::block_on(load_screenshot_dir(Path::new("/no/such/dir")));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }
}
