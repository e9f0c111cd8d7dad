mod common;

use common::*;
use image::{ImageFormat, Rgb, RgbImage};
use pdf_appendix::*;
use std::io::Cursor;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_load_pdf_source() {
    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), pdf_bytes(create_test_pdf(5))).unwrap();

    let source = load_source(temp.path()).await.unwrap();
    assert_eq!(source.page_count, 5);
    assert_eq!(source.document.get_pages().len(), 5);
    assert_eq!(
        source.name,
        temp.path().file_name().unwrap().to_string_lossy()
    );
}

#[tokio::test]
async fn test_load_image_source() {
    let img = RgbImage::from_pixel(30, 60, Rgb([0, 120, 255]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();

    let temp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    std::fs::write(temp.path(), png.into_inner()).unwrap();

    let source = load_source(temp.path()).await.unwrap();
    assert_eq!(source.page_count, 1);
    assert!(source.pdf_bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_load_sources_keeps_order() {
    let first = NamedTempFile::new().unwrap();
    let second = NamedTempFile::new().unwrap();
    std::fs::write(first.path(), pdf_bytes(create_test_pdf(2))).unwrap();
    std::fs::write(second.path(), pdf_bytes(create_test_pdf(7))).unwrap();

    let sources = load_sources(&[first.path(), second.path()]).await.unwrap();
    let counts: Vec<_> = sources.iter().map(|s| s.page_count).collect();
    assert_eq!(counts, vec![2, 7]);
}

#[tokio::test]
async fn test_unreadable_source_is_named() {
    let temp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    std::fs::write(temp.path(), b"%PDF-1.7 truncated").unwrap();

    match load_source(temp.path()).await {
        Err(AppendixError::UnreadableDocument { name, .. }) => assert!(name.ends_with(".pdf")),
        other => panic!("unexpected result: {:?}", other.map(|s| s.name)),
    }
}

#[test]
fn test_pdf_without_pages_is_rejected() {
    match SourceDocument::from_bytes("empty.pdf", pdf_bytes(create_test_pdf(0))) {
        Err(AppendixError::UnreadableDocument { name, reason }) => {
            assert_eq!(name, "empty.pdf");
            assert_eq!(reason, "document has no pages");
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.page_count)),
    }
}

#[tokio::test]
async fn test_save_pdf() {
    let temp = NamedTempFile::new().unwrap();
    let bytes = pdf_bytes(create_test_pdf(1));
    save_pdf(bytes.clone(), temp.path()).await.unwrap();
    assert_eq!(std::fs::read(temp.path()).unwrap(), bytes);
}
