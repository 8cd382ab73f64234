//! 生成选项
//!
//! 所有选项都是不可变记录，显式传入各个步骤，不存在全局状态。

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 截图与题目的配对方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingPolicy {
    /// 第 N 张截图对应第 N 题
    ByOrder,
    /// 文件名中第一个数字即题号，没有数字时退回上传顺序
    #[default]
    ByFilenameNumber,
}

impl FromStr for PairingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "by-order" | "order" => Ok(Self::ByOrder),
            "by-filename-number" | "filename" | "by-filename" => Ok(Self::ByFilenameNumber),
            other => Err(ConfigError::InvalidValue {
                key: "pairing_policy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByOrder => write!(f, "按上传顺序"),
            Self::ByFilenameNumber => write!(f, "按文件名数字"),
        }
    }
}

/// 纸张尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// 宽高，单位 pt
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A4 => (595.28, 841.89),
            Self::Letter => (612.0, 792.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            other => Err(ConfigError::InvalidValue {
                key: "page_size".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A4 => write!(f, "A4"),
            Self::Letter => write!(f, "Letter"),
        }
    }
}

/// 抽题选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// 题目字符数必须严格大于该值
    pub min_question_chars: usize,
    /// 是否追加表格单元格文本
    pub include_tables: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_question_chars: 5,
            include_tables: false,
        }
    }
}

/// 组页选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub extract: ExtractOptions,
    pub policy: PairingPolicy,
    /// true: 同一题号收集多张截图; false: 后上传的覆盖先上传的
    pub multi_image: bool,
    pub show_page_numbers: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            policy: PairingPolicy::default(),
            multi_image: false,
            show_page_numbers: true,
        }
    }
}
