//! 截图配对能力
//!
//! 决定每张截图属于第几题。这里不检查题号是否越界，
//! 越界的截图留在映射里，由组页时统一丢弃。

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::{PairingPolicy, ScreenshotMap, ScreenshotRef};

fn digit_run_regex() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    // 只认 ASCII 数字，`\d` 会匹配全角等 Unicode 数字
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("数字正则无效"))
}

/// 文件名中最左边的一段连续 ASCII 数字
///
/// 数字过长无法放入 `usize` 时视为没有数字。
pub fn first_integer_run(name: &str) -> Option<usize> {
    digit_run_regex()
        .find(name)
        .and_then(|m| m.as_str().parse::<usize>().ok())
}

/// 计算单张截图的题号（从1开始）
///
/// `position` 为截图在上传序列中的位置（从0开始）。
pub fn screenshot_key(filename: &str, position: usize, policy: PairingPolicy) -> usize {
    let fallback = position + 1;
    match policy {
        PairingPolicy::ByOrder => fallback,
        PairingPolicy::ByFilenameNumber => match first_integer_run(filename) {
            Some(number) => number,
            None => {
                debug!("文件名 {} 中没有数字，按上传顺序配对为第 {} 题", filename, fallback);
                fallback
            }
        },
    }
}

/// 把截图分配到题号
///
/// - `multi == false`：同一题号后出现的截图覆盖之前的
/// - `multi == true`：同一题号的截图按上传顺序全部保留
pub fn assign_screenshots(
    files: &[ScreenshotRef],
    policy: PairingPolicy,
    multi: bool,
) -> ScreenshotMap {
    let mut map = ScreenshotMap::new();

    for (position, file) in files.iter().enumerate() {
        let key = screenshot_key(&file.filename, position, policy);
        let slot = map.entry(key).or_default();
        if !multi {
            slot.clear();
        }
        slot.push(file.clone());
    }

    map
}
