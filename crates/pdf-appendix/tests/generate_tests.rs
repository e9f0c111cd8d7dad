mod common;

use common::*;
use lopdf::Document;
use pdf_appendix::*;

fn source(name: &str, doc: Document) -> SourceDocument {
    SourceDocument::from_bytes(name, pdf_bytes(doc)).unwrap()
}

fn job(settings: LayoutSettings) -> GenerationJob {
    GenerationJob {
        main: source("claim.pdf", create_test_pdf(2)),
        appendices: vec![
            Appendix::new("Contract", source("contract.pdf", create_rotated_pdf(&[90]))),
            Appendix::new("", source("letters.pdf", create_test_pdf(3))),
        ],
        settings,
    }
}

fn streams_with(doc: &Document, page: u32, marker: &str) -> Vec<String> {
    let page_id = doc.get_pages()[&page];
    page_streams(doc, page_id)
        .into_iter()
        .filter(|s| s.contains(marker))
        .collect()
}

#[test]
fn test_bundle_page_layout() {
    let fonts = FontSet::builtin();
    let (bundle, plan) = build_bundle(&job(LayoutSettings::default()), &fonts, &Shaper::default()).unwrap();

    // main 2 + TOC 1 + (cover + 1) + (cover + 3)
    assert_eq!(plan.total_pages, 9);
    assert_eq!(bundle.get_pages().len(), 9);

    assert_eq!(plan.toc_pages, 1);
    assert_eq!(plan.entries[0].label, "א");
    assert_eq!((plan.entries[0].start_page, plan.entries[0].end_page), (4, 5));
    assert_eq!(plan.entries[1].label, "ב");
    assert_eq!((plan.entries[1].start_page, plan.entries[1].end_page), (6, 9));
}

#[test]
fn test_every_page_is_numbered() {
    let fonts = FontSet::builtin();
    let (bundle, _) = build_bundle(&job(LayoutSettings::default()), &fonts, &Shaper::default()).unwrap();

    for page in 1..=9u32 {
        let numbers = streams_with(&bundle, page, "/PgNoR");
        assert_eq!(numbers.len(), 1, "page {page}");
        let digits: String = page
            .to_string()
            .bytes()
            .map(|b| format!("{:02X}", b))
            .collect();
        assert!(numbers[0].contains(&format!("<{}> Tj", digits)), "page {page}");
    }
}

#[test]
fn test_stamp_follows_page_rotation() {
    let fonts = FontSet::builtin();
    let (bundle, _) = build_bundle(&job(LayoutSettings::default()), &fonts, &Shaper::default()).unwrap();

    // First content page of appendix א is rotated a quarter turn
    let stamps = streams_with(&bundle, 5, "/StampB");
    assert_eq!(stamps.len(), 1);
    assert!(stamps[0].contains("0 1 -1 0 "));

    // First content page of appendix ב is upright
    let stamps = streams_with(&bundle, 7, "/StampB");
    assert_eq!(stamps.len(), 1);
    assert!(stamps[0].contains("1 0 0 1 "));

    // Covers, the main document and later appendix pages are not stamped
    for page in [1, 2, 3, 4, 6, 8, 9] {
        assert!(streams_with(&bundle, page, "/StampB").is_empty(), "page {page}");
    }
}

#[test]
fn test_stamping_can_be_disabled() {
    let fonts = FontSet::builtin();
    let settings = LayoutSettings {
        stamp_appendices: false,
        ..Default::default()
    };
    let (bundle, _) = build_bundle(&job(settings), &fonts, &Shaper::default()).unwrap();
    for page in 1..=9u32 {
        assert!(streams_with(&bundle, page, "/StampB").is_empty());
    }
}

#[test]
fn test_original_content_is_preserved() {
    let fonts = FontSet::builtin();
    let (bundle, _) = build_bundle(&job(LayoutSettings::default()), &fonts, &Shaper::default()).unwrap();
    assert_eq!(streams_with(&bundle, 1, "(page 1)").len(), 1);
    assert_eq!(streams_with(&bundle, 9, "(page 3)").len(), 1);
}

#[test]
fn test_roman_numbering_reaches_labels() {
    let fonts = FontSet::builtin();
    let settings = LayoutSettings {
        numbering: NumberingSystem::Roman,
        template: Template::Modern,
        stamp_appendices: true,
    };
    let (_, plan) = build_bundle(&job(settings), &fonts, &Shaper::default()).unwrap();
    let labels: Vec<_> = plan.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["I", "II"]);
}

#[test]
fn test_bundle_without_appendices() {
    let fonts = FontSet::builtin();
    let job = GenerationJob {
        main: source("claim.pdf", create_test_pdf(4)),
        appendices: Vec::new(),
        settings: LayoutSettings::default(),
    };
    let (bundle, plan) = build_bundle(&job, &fonts, &Shaper::default()).unwrap();
    assert!(plan.entries.is_empty());
    assert_eq!(bundle.get_pages().len(), 5);
}

#[tokio::test]
async fn test_generate_writes_loadable_pdf() {
    let bytes = generate(job(LayoutSettings::default()), FontSet::builtin())
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let reloaded = Document::load_mem(&bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 9);
}
