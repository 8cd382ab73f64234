use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppResult, ConfigError};
use crate::models::{AssemblyOptions, ExtractOptions, PageSize, PairingPolicy};
use crate::services::{Margins, RenderSettings};

const MIN_FONT_SIZE: f32 = 10.0;
const MAX_FONT_SIZE: f32 = 18.0;

/// 程序配置
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// 题目文档（.docx / .doc）
    pub document_path: PathBuf,
    /// 截图目录，未显式指定截图列表时使用
    pub screenshot_dir: PathBuf,
    /// 显式截图列表，顺序即上传顺序
    pub screenshot_files: Vec<PathBuf>,
    /// 输出 PDF
    pub output_path: PathBuf,
    // --- 版面 ---
    pub page_size: PageSize,
    pub font_size: f32,
    pub include_page_numbers: bool,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    // --- 抽题与配对 ---
    pub pairing_policy: PairingPolicy,
    pub multi_image: bool,
    pub include_tables: bool,
    pub min_question_chars: usize,
    /// 外部办公套件，用于 .doc 转换
    pub office_binary: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from("questions.docx"),
            screenshot_dir: PathBuf::from("screenshots"),
            screenshot_files: Vec::new(),
            output_path: PathBuf::from("questions_with_screenshots.pdf"),
            page_size: PageSize::A4,
            font_size: 14.0,
            include_page_numbers: true,
            margin_left: 36.0,
            margin_right: 36.0,
            margin_top: 54.0,
            margin_bottom: 54.0,
            pairing_policy: PairingPolicy::ByFilenameNumber,
            multi_image: false,
            include_tables: false,
            min_question_chars: 5,
            office_binary: "soffice".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    document_path: Option<PathBuf>,
    screenshot_dir: Option<PathBuf>,
    screenshot_files: Option<Vec<PathBuf>>,
    output_path: Option<PathBuf>,
    page_size: Option<PageSize>,
    font_size: Option<f32>,
    include_page_numbers: Option<bool>,
    margin_left: Option<f32>,
    margin_right: Option<f32>,
    margin_top: Option<f32>,
    margin_bottom: Option<f32>,
    pairing_policy: Option<PairingPolicy>,
    multi_image: Option<bool>,
    include_tables: Option<bool>,
    min_question_chars: Option<usize>,
    office_binary: Option<String>,
    verbose_logging: Option<bool>,
    output_log_file: Option<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 默认值 → 配置文件（`QUESTION_PDF_CONFIG`，默认 `question_pdf.toml`，不存在则跳过）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("QUESTION_PDF_CONFIG")
            .unwrap_or_else(|_| "question_pdf.toml".to_string());
        let path = Path::new(&path);

        if !path.exists() {
            debug!("配置文件 {} 不存在，使用默认配置", path.display());
            return Ok(Self::from_env());
        }

        info!("📝 读取配置文件: {}", path.display());
        Ok(Self::from_toml_file(path)?.with_env())
    }

    /// 读取 TOML 配置文件，未出现的字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into(),
            other => other.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: String::new(),
            source: Box::new(e),
        })?;
        Ok(Self::default().merge(file).normalized())
    }

    fn merge(self, file: ConfigFile) -> Self {
        Self {
            document_path: file.document_path.unwrap_or(self.document_path),
            screenshot_dir: file.screenshot_dir.unwrap_or(self.screenshot_dir),
            screenshot_files: file.screenshot_files.unwrap_or(self.screenshot_files),
            output_path: file.output_path.unwrap_or(self.output_path),
            page_size: file.page_size.unwrap_or(self.page_size),
            font_size: file.font_size.unwrap_or(self.font_size),
            include_page_numbers: file.include_page_numbers.unwrap_or(self.include_page_numbers),
            margin_left: file.margin_left.unwrap_or(self.margin_left),
            margin_right: file.margin_right.unwrap_or(self.margin_right),
            margin_top: file.margin_top.unwrap_or(self.margin_top),
            margin_bottom: file.margin_bottom.unwrap_or(self.margin_bottom),
            pairing_policy: file.pairing_policy.unwrap_or(self.pairing_policy),
            multi_image: file.multi_image.unwrap_or(self.multi_image),
            include_tables: file.include_tables.unwrap_or(self.include_tables),
            min_question_chars: file.min_question_chars.unwrap_or(self.min_question_chars),
            office_binary: file.office_binary.unwrap_or(self.office_binary),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
            output_log_file: file.output_log_file.unwrap_or(self.output_log_file),
        }
    }

    /// 环境变量覆盖；无法解析的值保持原值
    fn with_env(self) -> Self {
        let screenshot_files = std::env::var("SCREENSHOT_FILES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or(self.screenshot_files);

        Self {
            document_path: env_parse("DOCUMENT_PATH").unwrap_or(self.document_path),
            screenshot_dir: env_parse("SCREENSHOT_DIR").unwrap_or(self.screenshot_dir),
            screenshot_files,
            output_path: env_parse("OUTPUT_PATH").unwrap_or(self.output_path),
            page_size: env_parse("PAGE_SIZE").unwrap_or(self.page_size),
            font_size: env_parse("FONT_SIZE").unwrap_or(self.font_size),
            include_page_numbers: env_parse("INCLUDE_PAGE_NUMBERS")
                .unwrap_or(self.include_page_numbers),
            margin_left: env_parse("MARGIN_LEFT").unwrap_or(self.margin_left),
            margin_right: env_parse("MARGIN_RIGHT").unwrap_or(self.margin_right),
            margin_top: env_parse("MARGIN_TOP").unwrap_or(self.margin_top),
            margin_bottom: env_parse("MARGIN_BOTTOM").unwrap_or(self.margin_bottom),
            pairing_policy: env_parse("PAIRING_POLICY").unwrap_or(self.pairing_policy),
            multi_image: env_parse("MULTI_IMAGE").unwrap_or(self.multi_image),
            include_tables: env_parse("INCLUDE_TABLES").unwrap_or(self.include_tables),
            min_question_chars: env_parse("MIN_QUESTION_CHARS").unwrap_or(self.min_question_chars),
            office_binary: std::env::var("OFFICE_BINARY").unwrap_or(self.office_binary),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
        .normalized()
    }

    /// 字号限制在 10–18，页边距不能为负
    fn normalized(mut self) -> Self {
        self.font_size = if self.font_size.is_finite() {
            self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        } else {
            Self::default().font_size
        };
        for margin in [
            &mut self.margin_left,
            &mut self.margin_right,
            &mut self.margin_top,
            &mut self.margin_bottom,
        ] {
            if !margin.is_finite() || *margin < 0.0 {
                *margin = 0.0;
            }
        }
        self
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            extract: ExtractOptions {
                min_question_chars: self.min_question_chars,
                include_tables: self.include_tables,
            },
            policy: self.pairing_policy,
            multi_image: self.multi_image,
            show_page_numbers: self.include_page_numbers,
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            page_size: self.page_size,
            font_size: self.font_size,
            margins: Margins {
                left: self.margin_left,
                right: self.margin_right,
                top: self.margin_top,
                bottom: self.margin_bottom,
            },
        }
    }
}
