use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档读取 / 解析错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 截图相关错误
    #[error("图片错误: {0}")]
    Image(#[from] ImageError),
    /// PDF 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 外部格式转换错误（.doc → .docx）
    #[error("转换错误: {0}")]
    Convert(#[from] ConvertError),
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 文档读取 / 解析错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 不支持的文件格式
    #[error("不支持的文档格式: {path}")]
    UnsupportedFormat { path: String },
    /// 无法作为 zip 打开
    #[error("无法打开 docx 压缩包: {source}")]
    ArchiveFailed {
        #[source]
        source: BoxedSource,
    },
    /// 压缩包中缺少正文
    #[error("docx 中缺少 {entry}")]
    MissingEntry { entry: String },
    /// XML 解析失败
    #[error("XML 解析失败 (位置 {position}): {source}")]
    XmlParseFailed {
        position: usize,
        #[source]
        source: BoxedSource,
    },
}

/// 截图相关错误
#[derive(Debug, Error)]
pub enum ImageError {
    /// 图片解码失败
    #[error("无法解码图片 {filename}: {source}")]
    DecodeFailed {
        filename: String,
        #[source]
        source: BoxedSource,
    },
    /// 图片尺寸为 0
    #[error("图片 {filename} 尺寸无效 ({width}x{height})")]
    InvalidDimensions {
        filename: String,
        width: u32,
        height: u32,
    },
}

/// PDF 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 内容流编码失败
    #[error("第 {page} 页内容流编码失败: {source}")]
    ContentEncodeFailed {
        page: usize,
        #[source]
        source: BoxedSource,
    },
    /// 压缩失败
    #[error("图片数据压缩失败: {source}")]
    CompressFailed {
        #[source]
        source: BoxedSource,
    },
    /// 序列化 PDF 失败
    #[error("保存 PDF 失败: {source}")]
    SaveFailed {
        #[source]
        source: BoxedSource,
    },
    /// 页码不连续
    #[error("页码不连续: 期望第 {expected} 页, 实际第 {actual} 页")]
    PageOutOfOrder { expected: usize, actual: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 取值无法识别
    #[error("配置项 {key} 的值 '{value}' 无法识别")]
    InvalidValue { key: String, value: String },
}

/// 外部格式转换错误
#[derive(Debug, Error)]
pub enum ConvertError {
    /// 无法启动外部程序
    #[error("无法启动 {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: BoxedSource,
    },
    /// 外部程序返回非零状态
    #[error("{program} 转换失败 (退出码 {code:?}): {stderr}")]
    ExitFailure {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    /// 转换后没有生成目标文件
    #[error("转换完成但未找到输出文件: {path}")]
    OutputMissing { path: String },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Document(DocumentError::ArchiveFailed {
            source: Box::new(err),
        })
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::Document(DocumentError::XmlParseFailed {
            position: 0, // 位置未知时用 xml_parse_failed
            source: Box::new(err),
        })
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(ImageError::DecodeFailed {
            filename: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Render(RenderError::SaveFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 XML 解析错误
    pub fn xml_parse_failed(
        position: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Document(DocumentError::XmlParseFailed {
            position,
            source: Box::new(source),
        })
    }

    /// 创建图片解码错误
    pub fn image_decode_failed(
        filename: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Image(ImageError::DecodeFailed {
            filename: filename.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_display() {
        let err = AppError::from(DocumentError::UnsupportedFormat {
            path: "a.txt".to_string(),
        });
        assert_eq!(err.to_string(), "文档错误: 不支持的文档格式: a.txt");
    }

    #[test]
    fn test_source_chain_is_kept() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::file_read_failed("q.docx", io);
        let inner = err.source().expect("应有内层错误");
        assert!(inner.source().is_some());
    }

    #[test]
    fn test_xml_error_is_document_error() {
        let mut reader = quick_xml::Reader::from_str("<w:p></w:r>");
        let xml_err = loop {
            match reader.read_event() {
                Err(e) => break e,
                Ok(quick_xml::events::Event::Eof) => panic!("应当解析失败"),
                Ok(_) => {}
            }
        };
        assert!(matches!(
            AppError::from(xml_err),
            AppError::Document(DocumentError::XmlParseFailed { .. })
        ));
    }

    #[test]
    fn test_image_error_is_decode_failure() {
        let img_err = image::load_from_memory(b"not an image").unwrap_err();
        assert!(matches!(
            AppError::from(img_err),
            AppError::Image(ImageError::DecodeFailed { .. })
        ));
    }
}
