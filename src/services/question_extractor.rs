//! 抽题能力
//!
//! 把文档片段清洗成有序题目列表。这一步对坏输入从不报错：
//! 无法解析的片段直接跳过，没有合格片段时返回空列表。

use std::collections::HashSet;

use tracing::debug;

use crate::models::{ExtractOptions, FragmentKind, Question, RawFragment};

/// 从文档片段中抽取题目
///
/// - 去掉首尾空白，字符数不超过 `min_question_chars` 的片段丢弃
/// - 不包含表格时，表格单元格片段全部忽略
/// - 包含表格时，与已保留题目完全相同（区分大小写）的单元格文本丢弃
pub fn extract_questions<'a, I>(fragments: I, options: &ExtractOptions) -> Vec<Question>
where
    I: IntoIterator<Item = &'a RawFragment>,
{
    let mut questions: Vec<Question> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for fragment in fragments {
        if fragment.kind == FragmentKind::TableCell && !options.include_tables {
            continue;
        }

        let Some(text) = fragment.text() else {
            debug!("跳过无法解析为文本的片段 ({} 字节)", fragment.data.len());
            continue;
        };

        let Some(question) = Question::new(text) else {
            continue;
        };

        if question.as_str().chars().count() <= options.min_question_chars {
            continue;
        }

        if fragment.kind == FragmentKind::TableCell && seen.contains(question.as_str()) {
            debug!("表格文本与已有题目重复，跳过");
            continue;
        }

        seen.insert(question.as_str().to_string());
        questions.push(question);
    }

    questions
}
