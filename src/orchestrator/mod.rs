//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次生成请求的调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (配置、日志、文件读写)
//!     ↓
//! workflow::GenerationFlow (读取 → 组页 → 渲染)
//!     ↓
//! services (能力层：抽题 / 配对 / 组页 / 渲染 / 转换)
//!     ↓
//! models (数据与加载器)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层读写输入输出文件
//! 2. **向下依赖**：编排层 → workflow → services → models
//! 3. **无业务逻辑**：只做调度和统计，不做配对判断

pub mod app;

// 重新导出主要类型
pub use app::App;
