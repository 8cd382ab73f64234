//! 组页能力
//!
//! 一题一页：页数永远等于题目数，页码正好是 `1..=题目数`。
//! 题号超出范围（包括 0）的截图不会出现在任何一页中，
//! 通过 [`unassigned_screenshots`] 报告给调用方，由调用方决定是否提示。

use tracing::debug;

use crate::models::{
    AssemblyOptions, PageDescriptor, Question, RawFragment, ScreenshotMap, ScreenshotRef,
};
use crate::services::question_extractor::extract_questions;
use crate::services::screenshot_matcher::assign_screenshots;

/// 为每道题构建一页
pub fn build_pages(
    questions: &[Question],
    screenshot_map: &ScreenshotMap,
    show_page_numbers: bool,
) -> Vec<PageDescriptor> {
    questions
        .iter()
        .enumerate()
        .map(|(offset, question)| {
            let index = offset + 1;
            PageDescriptor {
                index,
                question_text: question.as_str().to_string(),
                images: screenshot_map.get(&index).cloned().unwrap_or_default(),
                show_page_number: show_page_numbers,
            }
        })
        .collect()
}

/// 没有对应题目的截图，按题号排序
pub fn unassigned_screenshots(
    screenshot_map: &ScreenshotMap,
    question_count: usize,
) -> Vec<(usize, ScreenshotRef)> {
    screenshot_map
        .iter()
        .filter(|(key, _)| **key == 0 || **key > question_count)
        .flat_map(|(key, shots)| shots.iter().map(move |s| (*key, s.clone())))
        .collect()
}

/// 一次组页的结果
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub pages: Vec<PageDescriptor>,
    /// 被丢弃的截图（题号, 截图）
    pub unassigned: Vec<(usize, ScreenshotRef)>,
}

impl Assembly {
    /// 文档中没有任何合格题目
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// 实际嵌入到页面中的截图数
    pub fn embedded_count(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }
}

/// 组页器：抽题 → 配对 → 组页
#[derive(Debug, Clone, Copy, Default)]
pub struct PageAssembler {
    options: AssemblyOptions,
}

impl PageAssembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    pub fn assemble(&self, fragments: &[RawFragment], screenshots: &[ScreenshotRef]) -> Assembly {
        let questions = extract_questions(fragments, &self.options.extract);
        self.assemble_questions(&questions, screenshots)
    }

    /// 题目已经抽取好时直接配对组页
    pub fn assemble_questions(
        &self,
        questions: &[Question],
        screenshots: &[ScreenshotRef],
    ) -> Assembly {
        let map = assign_screenshots(screenshots, self.options.policy, self.options.multi_image);
        let pages = build_pages(questions, &map, self.options.show_page_numbers);
        let unassigned = unassigned_screenshots(&map, questions.len());

        debug!(
            "组页完成: {} 页, {} 张截图未分配",
            pages.len(),
            unassigned.len()
        );

        Assembly { pages, unassigned }
    }
}
