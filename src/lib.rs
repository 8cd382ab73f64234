//! # Question PDF
//!
//! 把 Word 文档中的题目与截图配对，生成"一题一页"的 PDF
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 题目、截图、页面描述与生成选项
//! - `models/loaders` - 读取 .docx 文本片段、读取截图文件
//!
//! ### ② 业务能力层（Services）
//! - `QuestionExtractor` - 文本片段 → 题目
//! - `ScreenshotMatcher` - 截图 → 题号（按顺序 / 按文件名数字）
//! - `PageAssembler` - 题目 + 截图 → 页面描述（页数恒等于题目数）
//! - `PdfRenderer` - 页面描述 → PDF
//! - `DocConverter` - .doc → .docx（外部办公套件）
//!
//! ### ③ 流程层（Workflow）
//! - `GenerationFlow` - 读取 → 组页 → 渲染
//!
//! ### ④ 编排层（Orchestration）
//! - `App` - 配置、日志、截图加载、写出 PDF 与统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    PageDescriptor, PairingPolicy, Question, RawFragment, ScreenshotMap, ScreenshotRef,
};
pub use orchestrator::App;
pub use services::{
    assign_screenshots, build_pages, extract_questions, first_integer_run, PageAssembler,
};
pub use workflow::{GenerationCtx, GenerationFlow, GenerationOutcome};
