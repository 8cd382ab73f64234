//! 文本排版辅助
//!
//! 标准 14 字体不嵌入字形，这里用 Helvetica 的近似字宽做贪心折行，
//! 并把文本编码为 WinAnsi 字节。

/// 近似字宽，单位 1/1000 em（Helvetica-Bold）
fn glyph_width(c: char) -> u16 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 278,
        'i' | 'j' | 'l' => 278,
        'f' | 't' | '(' | ')' | '[' | ']' | '-' | '/' | '"' => 333,
        'r' => 389,
        'I' => 278,
        'J' | 's' | 'c' | 'z' | 'y' | 'v' | 'x' | 'k' | 'a' | 'e' => 556,
        'm' => 889,
        'w' => 778,
        'M' => 833,
        'W' => 944,
        '0'..='9' => 556,
        'A'..='Z' => 722,
        'a'..='z' => 611,
        '?' => 611,
        '+' | '=' | '<' | '>' => 584,
        _ if c.is_ascii() => 556,
        // 非 ASCII 会被替换成 '?'
        _ => 611,
    }
}

/// 一行文字在给定字号下的宽度（pt）
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c) as u32).sum();
    units as f32 * font_size / 1000.0
}

/// 贪心折行
///
/// 显式换行保留；单词本身超过行宽时按字符硬切。
pub fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();

        for word in raw_line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width(word, font_size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }
        }

        lines.push(current);
    }

    // 去掉结尾的空行
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// 编码为 WinAnsi 字节，无法表示的字符替换为 '?'
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            0x09 => b' ',
            0x2018 | 0x2019 => b'\'',
            0x201c | 0x201d => b'"',
            0x2013 | 0x2014 => b'-',
            _ => b'?',
        })
        .collect()
}
