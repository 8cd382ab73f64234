use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageOutputFormat, Rgb, RgbImage};
use lopdf::Document;
use question_pdf::config::Config;
use question_pdf::models::PairingPolicy;
use question_pdf::workflow::{GenerationCtx, GenerationFlow};
use question_pdf::{App, ScreenshotRef};

const BODY_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// 用段落文本拼出一个最小的 .docx
fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        BODY_NS, body
    );

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    std::fs::write(path, buffer.into_inner()).unwrap();
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(40, 30)).unwrap();
    path
}

fn test_config(dir: &Path) -> Config {
    Config {
        document_path: dir.join("questions.docx"),
        screenshot_dir: dir.join("screenshots"),
        output_path: dir.join("out.pdf"),
        output_log_file: dir.join("output.txt").display().to_string(),
        ..Config::default()
    }
}

/// 每页内容流里 `Do` 操作的次数，即该页嵌入的图片数
fn images_per_page(pdf: &[u8]) -> Vec<usize> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let content = doc.get_and_decode_page_content(*id).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .count()
        })
        .collect()
}

#[tokio::test]
async fn test_app_generates_one_page_per_question() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    write_docx(
        &config.document_path,
        &["What is 2+2?", "ok", "Name the capital of France.", "Explain photosynthesis briefly."],
    );
    std::fs::create_dir(&config.screenshot_dir).unwrap();
    write_png(&config.screenshot_dir, "Screenshot 3.png");
    write_png(&config.screenshot_dir, "Screenshot 1.png");
    write_png(&config.screenshot_dir, "Screenshot 7.png");

    let output_path = config.output_path.clone();
    let log_path = config.output_log_file.clone();

    let outcome = App::initialize(config).unwrap().run().await.unwrap();

    assert_eq!(outcome.question_count, 3);
    assert_eq!(outcome.page_count, 3);
    assert_eq!(outcome.embedded_images, 2);
    assert_eq!(outcome.unassigned, vec![(7, "Screenshot 7.png".to_string())]);

    let pdf = std::fs::read(&output_path).unwrap();
    assert_eq!(images_per_page(&pdf), vec![1, 0, 1]);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("题目总数: 3"));
    assert!(log.contains("Screenshot 7.png"));
}

#[tokio::test]
async fn test_app_without_questions_writes_no_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_docx(&config.document_path, &["hi", "   ", "abc"]);

    let output_path = config.output_path.clone();
    let outcome = App::initialize(config).unwrap().run().await.unwrap();

    assert!(outcome.is_empty());
    assert!(outcome.pdf.is_none());
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_app_missing_document_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let result = App::initialize(config).unwrap().run().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_explicit_screenshot_list_by_order() {
    let dir = tempfile::tempdir().unwrap();
    let shots = dir.path().join("uploads");
    std::fs::create_dir(&shots).unwrap();

    let config = Config {
        pairing_policy: PairingPolicy::ByOrder,
        screenshot_files: vec![write_png(&shots, "b.png"), write_png(&shots, "a.png")],
        ..test_config(dir.path())
    };
    write_docx(&config.document_path, &["First question here", "Second question here"]);

    let output_path = config.output_path.clone();
    let outcome = App::initialize(config).unwrap().run().await.unwrap();

    assert_eq!(outcome.embedded_images, 2);
    assert!(outcome.unassigned.is_empty());
    let pdf = std::fs::read(&output_path).unwrap();
    assert_eq!(images_per_page(&pdf), vec![1, 1]);
}

#[test]
fn test_flow_multi_image_mode() {
    let config = Config {
        multi_image: true,
        ..Config::default()
    };
    let flow = GenerationFlow::new(&config);

    let fragments = vec![
        question_pdf::RawFragment::paragraph("Question number one"),
        question_pdf::RawFragment::paragraph("Question number two"),
    ];
    let screenshots = vec![
        ScreenshotRef::new("q2_a.png", png_bytes(20, 20)),
        ScreenshotRef::new("q2_b.png", png_bytes(20, 20)),
        ScreenshotRef::new("q1.png", png_bytes(20, 20)),
    ];

    let outcome = flow.generate(&fragments, &screenshots).unwrap();
    assert_eq!(outcome.page_count, 2);
    assert_eq!(outcome.embedded_images, 3);
    assert_eq!(images_per_page(&outcome.pdf.unwrap()), vec![1, 2]);
}

#[test]
fn test_flow_single_image_last_write_wins() {
    let flow = GenerationFlow::new(&Config::default());
    let fragments = vec![question_pdf::RawFragment::paragraph("Only one question")];
    let screenshots = vec![
        ScreenshotRef::new("1.png", png_bytes(20, 20)),
        ScreenshotRef::new("q1 retake.png", png_bytes(20, 20)),
    ];

    let outcome = flow.generate(&fragments, &screenshots).unwrap();
    assert_eq!(outcome.embedded_images, 1);
    assert_eq!(images_per_page(&outcome.pdf.unwrap()), vec![1]);
}

#[tokio::test]
#[ignore] // 需要本机安装 LibreOffice：cargo test -- --ignored
async fn test_doc_conversion_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let docx = dir.path().join("source.docx");
    write_docx(&docx, &["Converted question one", "Converted question two"]);

    // 先用 soffice 生成 .doc，再走 .doc → .docx 的完整流程
    let status = tokio::process::Command::new("soffice")
        .args(["--headless", "--convert-to", "doc", "--outdir"])
        .arg(dir.path())
        .arg(&docx)
        .status()
        .await
        .unwrap();
    assert!(status.success());

    let flow = GenerationFlow::new(&Config::default());
    let ctx = GenerationCtx::new(dir.path().join("source.doc"), dir.path().join("out.pdf"));
    let outcome = flow.run(&ctx, &[]).await.unwrap();
    assert_eq!(outcome.question_count, 2);
}
