//! 应用处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次生成请求的资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、输出启动信息
//! 2. **加载截图**：显式列表或截图目录（按文件名排序）
//! 3. **向下委托**：交给 `GenerationFlow` 完成读取、组页、渲染
//! 4. **写出结果**：保存 PDF、追加日志、输出统计

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{load_screenshot_dir, load_screenshot_files, ScreenshotRef};
use crate::utils::logging;
use crate::workflow::{GenerationCtx, GenerationFlow, GenerationOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    flow: GenerationFlow,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        logging::log_startup(&startup_settings(&config));

        let flow = GenerationFlow::new(&config);
        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<GenerationOutcome> {
        let screenshots = self.load_screenshots().await?;
        let ctx = GenerationCtx::new(&self.config.document_path, &self.config.output_path);

        let outcome = self
            .flow
            .run(&ctx, &screenshots)
            .await
            .with_context(|| format!("{} 生成失败", ctx))?;

        let Some(pdf) = outcome.pdf.as_ref() else {
            warn!("⚠️ 请上传包含题目的 Word 文档，程序结束");
            logging::append_log(&self.config.output_log_file, "未找到题目，未生成 PDF")?;
            return Ok(outcome);
        };

        fs::write(&ctx.output_path, pdf)
            .await
            .with_context(|| format!("无法写入 PDF: {}", ctx.output_path.display()))?;

        self.write_summary(&outcome)?;
        logging::print_final_stats(
            outcome.question_count,
            outcome.embedded_images,
            outcome.page_count,
            &ctx.output_path.display().to_string(),
            &self.config.output_log_file,
        );

        Ok(outcome)
    }

    /// 加载截图
    ///
    /// 截图是可选的：没有显式列表且目录不存在时按"无截图"处理。
    async fn load_screenshots(&self) -> Result<Vec<ScreenshotRef>> {
        if !self.config.screenshot_files.is_empty() {
            info!("📸 使用指定的 {} 张截图", self.config.screenshot_files.len());
            return Ok(load_screenshot_files(&self.config.screenshot_files).await);
        }

        let dir: &PathBuf = &self.config.screenshot_dir;
        if !dir.is_dir() {
            info!("📸 截图目录 {} 不存在，不附加截图", dir.display());
            return Ok(Vec::new());
        }

        Ok(load_screenshot_dir(dir).await?)
    }

    /// 把本次结果追加到日志文件
    fn write_summary(&self, outcome: &GenerationOutcome) -> Result<()> {
        let mut lines = vec![
            format!("文档: {}", self.config.document_path.display()),
            format!("输出: {}", self.config.output_path.display()),
            format!("题目总数: {}", outcome.question_count),
            format!("嵌入截图: {}", outcome.embedded_images),
            format!("总页数: {}", outcome.page_count),
        ];
        if outcome.skipped_images > 0 {
            lines.push(format!("无法嵌入的截图: {}", outcome.skipped_images));
        }
        for (key, filename) in &outcome.unassigned {
            lines.push(format!("未分配截图: {} (第 {} 题不存在)", filename, key));
        }

        logging::append_log(&self.config.output_log_file, &lines.join("\n"))
    }
}

fn startup_settings(config: &Config) -> Vec<(&'static str, String)> {
    vec![
        ("题目文档", config.document_path.display().to_string()),
        ("纸张", config.page_size.to_string()),
        ("字号", config.font_size.to_string()),
        ("页码", if config.include_page_numbers { "显示" } else { "不显示" }.to_string()),
        ("配对方式", config.pairing_policy.to_string()),
        ("一题多图", config.multi_image.to_string()),
        ("包含表格文本", config.include_tables.to_string()),
    ]
}
