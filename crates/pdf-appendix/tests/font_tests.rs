mod common;

use common::*;
use lopdf::{Dictionary, Document, Object};
use pdf_appendix::canvas::{build_document, Canvas};
use pdf_appendix::cover::{cover_document, CoverSpec};
use pdf_appendix::*;

fn cover_spec(title: &str) -> CoverSpec {
    CoverSpec {
        label: "א".to_string(),
        title: title.to_string(),
        start_page: 4,
        end_page: 9,
    }
}

fn dict<'a>(doc: &'a Document, obj: &'a Object) -> &'a Dictionary {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
        other => other.as_dict().unwrap(),
    }
}

fn type0_fonts(doc: &Document) -> Vec<&Dictionary> {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|d| {
            d.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice())
        })
        .collect()
}

fn source(name: &str, doc: Document) -> SourceDocument {
    SourceDocument::from_bytes(name, pdf_bytes(doc)).unwrap()
}

#[test]
fn test_cover_embeds_composite_hebrew_font() {
    let fonts = hebrew_fonts();
    let doc = cover_document(
        &cover_spec("חוזה שכירות"),
        Template::Classic,
        &fonts,
        &Shaper::default(),
    )
    .unwrap();

    let type0 = type0_fonts(&doc);
    // Label in bold, title and page range in regular
    assert_eq!(type0.len(), 2);
    for font in type0 {
        assert_eq!(font.get(b"Encoding").unwrap().as_name().unwrap(), b"Identity-H");
        let base = font.get(b"BaseFont").unwrap().as_name().unwrap();
        let base = String::from_utf8_lossy(base);
        assert_eq!(base.find('+'), Some(6), "{base}");
        assert!(base.ends_with("+DejaVuSans"), "{base}");

        let descendants = font.get(b"DescendantFonts").unwrap().as_array().unwrap();
        assert_eq!(descendants.len(), 1);
        let cid_font = dict(&doc, &descendants[0]);
        assert_eq!(
            cid_font.get(b"Subtype").unwrap().as_name().unwrap(),
            b"CIDFontType2"
        );
        // Subset glyphs are reached through a map stream, not Identity
        let map_id = cid_font.get(b"CIDToGIDMap").unwrap().as_reference().unwrap();
        assert!(doc.get_object(map_id).unwrap().as_stream().is_ok());
        assert!(!cid_font.get(b"W").unwrap().as_array().unwrap().is_empty());
    }

    let programs = font_programs(&doc);
    assert_eq!(programs.len(), 2);
    let full_size = std::fs::read(fixture("DejaVuSans.ttf")).unwrap().len();
    for id in programs {
        let program = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(program.content.len() < full_size / 4, "{} bytes", program.content.len());
        assert_eq!(
            program.dict.get(b"Length1").unwrap().as_i64().unwrap(),
            program.content.len() as i64
        );
    }
}

#[test]
fn test_to_unicode_maps_glyphs_back_to_hebrew() {
    let fonts = hebrew_fonts();
    let doc = cover_document(
        &cover_spec("חוזה"),
        Template::Minimal,
        &fonts,
        &Shaper::default(),
    )
    .unwrap();

    let data = std::fs::read(fixture("DejaVuSans.ttf")).unwrap();
    let face = ttf_parser::Face::parse(&data, 0).unwrap();
    let cid = |ch: char| face.glyph_index(ch).unwrap().0;

    let cmaps: Vec<String> = type0_fonts(&doc)
        .iter()
        .map(|font| {
            let id = font.get(b"ToUnicode").unwrap().as_reference().unwrap();
            stream_text(&doc, id)
        })
        .collect();
    let all = cmaps.concat();
    // Title letters (regular) and the label word (bold)
    for ch in ['ח', 'ו', 'ז', 'ה', 'נ', 'ס', 'פ', 'ע', 'מ', 'ד', 'י', 'ם'] {
        let entry = format!("<{:04X}> <{:04X}>", cid(ch), ch as u32);
        assert!(all.contains(&entry), "missing {entry} for {ch}");
    }

    // Text operands carry the same CIDs
    let page_id = doc.get_pages()[&1];
    let content = page_streams(&doc, page_id).concat();
    assert!(content.contains(&format!("{:04X}", cid('ח'))));
}

#[test]
fn test_character_missing_from_face_is_fatal() {
    let fonts = hebrew_fonts();
    let result = cover_document(
        &cover_spec("合同"),
        Template::Classic,
        &fonts,
        &Shaper::default(),
    );
    match result {
        Err(AppendixError::Font(message)) => {
            assert!(message.contains("DejaVuSans"), "{message}");
            assert!(message.contains('合'), "{message}");
        }
        other => panic!("expected a font error, got {:?}", other.map(|d| d.get_pages().len())),
    }
}

#[test]
fn test_builtin_fallback_only_substitutes() {
    // The same title through Helvetica degrades instead of failing
    let doc = cover_document(
        &cover_spec("合同"),
        Template::Classic,
        &FontSet::builtin(),
        &Shaper::default(),
    )
    .unwrap();
    assert!(font_programs(&doc).is_empty());
}

#[test]
fn test_pages_of_one_document_share_a_program() {
    let fonts = hebrew_fonts();
    let pages: Vec<Canvas> = ["אחת", "שתיים", "שלוש"]
        .iter()
        .map(|text| {
            let mut canvas = Canvas::new(300.0, 300.0, &fonts);
            canvas.set_font(FontStyle::Regular, 14.0);
            canvas.draw_string(20.0, 20.0, text);
            canvas
        })
        .collect();
    let doc = build_document(&pages, &fonts).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert_eq!(font_programs(&doc).len(), 1);
}

#[test]
fn test_bundle_embeds_each_style_once() {
    let fonts = hebrew_fonts();
    let job = GenerationJob {
        main: source("claim.pdf", create_test_pdf(1)),
        appendices: (1..=10)
            .map(|i| {
                Appendix::new(
                    format!("מסמך {i}"),
                    source(&format!("doc{i}.pdf"), create_rotated_pdf(&[(i % 4) * 90])),
                )
            })
            .collect(),
        settings: LayoutSettings::default(),
    };

    let bytes = generate_sync(&job, &fonts).unwrap();
    let bundle = Document::load_mem(&bytes).unwrap();
    assert_eq!(bundle.get_pages().len(), 22);
    // Regular and bold, whatever the number of covers, stamps and numbers
    assert_eq!(font_programs(&bundle).len(), 2);

    let full_size = std::fs::read(fixture("DejaVuSans.ttf")).unwrap().len();
    assert!(bytes.len() < full_size / 2, "{} bytes", bytes.len());
}
