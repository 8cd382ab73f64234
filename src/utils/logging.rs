use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::{PageDescriptor, ScreenshotRef};

/// 预览的题目数量
const PREVIEW_QUESTIONS: usize = 5;
/// 预览时每道题最多显示的字符数
const PREVIEW_CHARS: usize = 100;

/// 初始化日志系统
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_file(false)
        .with_line_number(false)
        .with_target(false);

    // 重复初始化（例如测试中）直接忽略
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题目 PDF 生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加一段文本到日志文件
pub fn append_log(log_file_path: &str, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", text)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `settings`: 已格式化的设置摘要（键, 值）
pub fn log_startup(settings: &[(&str, String)]) {
    info!("{}", "=".repeat(60));
    info!("📄 程序启动 - 题目 PDF 生成（一题一页）");
    for (key, value) in settings {
        info!("⚙️ {}: {}", key, value);
    }
    info!("{}", "=".repeat(60));
}

/// 记录抽题结果，并预览前几道题
///
/// # 参数
/// - `questions`: 题目文本
pub fn log_questions_loaded<S: AsRef<str>>(questions: &[S]) {
    info!("✅ 在文档中找到 {} 道题目", questions.len());
    for (i, q) in questions.iter().take(PREVIEW_QUESTIONS).enumerate() {
        info!("  Q{}: {}", i + 1, truncate_text(q.as_ref(), PREVIEW_CHARS));
    }
    if questions.len() > PREVIEW_QUESTIONS {
        info!("  ... 以及另外 {} 道题目", questions.len() - PREVIEW_QUESTIONS);
    }
}

/// 记录截图分配结果
///
/// # 参数
/// - `pages`: 组好的页面
/// - `unassigned`: 没有对应题目的截图
pub fn log_screenshot_assignment(pages: &[PageDescriptor], unassigned: &[(usize, ScreenshotRef)]) {
    for page in pages.iter().filter(|p| p.has_images()) {
        for shot in &page.images {
            info!("🖼️ 第 {} 题截图: {}", page.index, shot.filename);
        }
    }
    for (key, shot) in unassigned {
        warn!(
            "⚠️ 截图 {} 对应第 {} 题，但文档只有 {} 道题，已忽略",
            shot.filename,
            key,
            pages.len()
        );
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `questions`: 题目总数
/// - `embedded`: 嵌入的截图数
/// - `pages`: PDF 页数
/// - `output_path`: 输出文件
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    questions: usize,
    embedded: usize,
    pages: usize,
    output_path: &str,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📋 题目总数: {}", questions);
    info!("📸 嵌入截图: {}", embedded);
    info!("📄 总页数: {}", pages);
    info!("{}", "=".repeat(60));
    info!("📥 PDF 已保存至: {}", output_path);
    info!("日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
