use std::fmt;

use crate::models::fragment::RawFragment;

/// 一道题目：清洗后的非空文本，位置决定页码
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question(String);

impl Question {
    /// 只接受去掉首尾空白后非空的文本
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Question {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&Question> for RawFragment {
    fn from(question: &Question) -> Self {
        RawFragment::paragraph(question.as_str())
    }
}
