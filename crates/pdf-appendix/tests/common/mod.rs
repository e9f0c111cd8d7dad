#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_appendix::FontSet;

pub const A4: (i64, i64) = (595, 842);

/// Build an A4 test PDF whose pages carry the given `/Rotate` values
pub fn create_rotated_pdf(rotations: &[i64]) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for (i, &rotate) in rotations.iter().enumerate() {
        let content = format!("BT /F1 12 Tf 72 720 Td (page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(A4.0),
                    Object::Integer(A4.1),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]);
        if rotate != 0 {
            page.set("Rotate", Object::Integer(rotate));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(rotations.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Build an unrotated A4 test PDF
pub fn create_test_pdf(num_pages: usize) -> Document {
    create_rotated_pdf(&vec![0; num_pages])
}

pub fn pdf_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

/// Decoded content streams of a page, in drawing order
pub fn page_streams(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let page = doc.get_dictionary(page_id).unwrap();
    let refs = match page.get(b"Contents").unwrap() {
        Object::Array(refs) => refs.clone(),
        other => vec![other.clone()],
    };
    refs.iter()
        .map(|r| {
            let stream = doc.get_object(r.as_reference().unwrap()).unwrap().as_stream().unwrap();
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            String::from_utf8_lossy(&content).into_owned()
        })
        .collect()
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// DejaVu Sans for both styles: covers Hebrew, has no CJK ideographs
pub fn hebrew_fonts() -> FontSet {
    FontSet::from_files(&fixture("DejaVuSans.ttf"), None).unwrap()
}

/// Embedded TrueType programs (FontFile2 streams) in `doc`
pub fn font_programs(doc: &Document) -> Vec<ObjectId> {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|dict| {
            dict.get(b"Type").and_then(Object::as_name).ok() == Some(b"FontDescriptor".as_slice())
        })
        .filter_map(|dict| dict.get(b"FontFile2").and_then(Object::as_reference).ok())
        .collect()
}

/// Decoded bytes of the stream at `id`
pub fn stream_text(doc: &Document, id: ObjectId) -> String {
    let stream = doc.get_object(id).unwrap().as_stream().unwrap();
    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&content).into_owned()
}
