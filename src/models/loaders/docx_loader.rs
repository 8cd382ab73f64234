//! .docx 文本加载
//!
//! .docx 是 zip 压缩包，正文位于 `word/document.xml`。
//! 这里只取纯文本：表格外的段落按顺序产出，表格单元格文本统一追加在所有段落之后。

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, DocumentError, FileError};
use crate::models::fragment::RawFragment;

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// 从磁盘读取 .docx 并抽取文本片段
pub async fn load_docx_fragments(path: &Path) -> AppResult<Vec<RawFragment>> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    parse_docx_fragments(&bytes)
}

/// 从 .docx 字节中抽取文本片段
pub fn parse_docx_fragments(bytes: &[u8]) -> AppResult<Vec<RawFragment>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let xml = match archive.by_name(DOCUMENT_ENTRY) {
        Ok(mut entry) => {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| AppError::file_read_failed(DOCUMENT_ENTRY, e))?;
            content
        }
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(DocumentError::MissingEntry {
                entry: DOCUMENT_ENTRY.to_string(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    parse_document_xml(&xml)
}

/// 正在收集的表格单元格
#[derive(Default)]
struct CellState {
    paragraphs: Vec<String>,
}

/// 不属于段落正文的子树：文本框内容，以及兼容性替代内容的回退副本
const SKIPPED_SUBTREES: [&[u8]; 2] = [b"txbxContent", b"Fallback"];

/// 解析 document.xml
///
/// 嵌套表格内的段落归入最内层单元格。
/// 文本框不计入所在段落，也不单独产出段落。
fn parse_document_xml(xml: &str) -> AppResult<Vec<RawFragment>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<RawFragment> = Vec::new();
    let mut cells: Vec<RawFragment> = Vec::new();

    let mut open_cells: Vec<CellState> = Vec::new();
    let mut current: Option<String> = None;
    let mut broken = false;
    let mut in_run = false;
    let mut in_text = false;
    // 处于跳过的子树内时的嵌套深度
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) if skip_depth > 0 => skip_depth += 1,
            Ok(Event::End(_)) if skip_depth > 0 => skip_depth -= 1,
            Ok(Event::Empty(_)) | Ok(Event::Text(_)) if skip_depth > 0 => {}
            Ok(Event::Start(ref e)) if SKIPPED_SUBTREES.contains(&e.local_name().as_ref()) => {
                skip_depth = 1;
            }
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tc" => open_cells.push(CellState::default()),
                b"p" => {
                    current = Some(String::new());
                    broken = false;
                }
                b"r" => in_run = true,
                b"t" => in_text = in_run,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if let (true, Some(text)) = (in_run, current.as_mut()) {
                    match e.local_name().as_ref() {
                        b"tab" => text.push('\t'),
                        b"br" | b"cr" => text.push('\n'),
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(ref e)) if in_text => match (e.unescape(), current.as_mut()) {
                (Ok(piece), Some(text)) => text.push_str(&piece),
                (Err(err), _) => {
                    warn!("段落文本无法解析，已跳过: {}", err);
                    broken = true;
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" => {
                    if let Some(text) = current.take().filter(|_| !broken) {
                        match open_cells.last_mut() {
                            Some(cell) => cell.paragraphs.push(text),
                            None => paragraphs.push(RawFragment::paragraph(text)),
                        }
                    }
                }
                b"tc" => {
                    if let Some(cell) = open_cells.pop() {
                        cells.push(RawFragment::table_cell(cell.paragraphs.join("\n")));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::xml_parse_failed(reader.buffer_position(), e)),
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "docx 解析完成: {} 个段落, {} 个表格单元格",
        paragraphs.len(),
        cells.len()
    );

    paragraphs.extend(cells);
    Ok(paragraphs)
}
