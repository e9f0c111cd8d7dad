//! Concatenation, appendix stamps and page numbers

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::bidi::Shaper;
use crate::canvas::{
    add_page, apply_overlays, inherited_attribute, overlay_page, page_frame, Canvas, FontSlots,
};
use crate::constants::{
    APPENDIX_WORD, PAGE_NUMBER_FONT_SIZE, PAGE_NUMBER_INSET, STAMP_BASELINE, STAMP_BOX,
    STAMP_CORNER_RADIUS, STAMP_FILL_COLOR, STAMP_FONT_SIZE, STAMP_INSET,
};
use crate::fonts::{FontSet, FontStyle};
use crate::overlay::{place, Corner};
use crate::types::{AppendixError, Result, Rgb};

/// Page attributes a page may inherit from its ancestors
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Rotate", b"Resources"];

/// Font resource prefixes for overlays
const PAGE_NUMBER_PREFIX: &str = "PgNo";
const STAMP_PREFIX: &str = "Stamp";

// =============================================================================
// Merging
// =============================================================================

/// Page dictionary with inherited attributes copied in, so it can be moved
/// under a different page tree
fn flattened_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut dict = doc.get_dictionary(page_id)?.clone();
    for key in INHERITABLE_KEYS {
        if dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(doc, page_id, key)? {
            dict.set(key.to_vec(), value.clone());
        }
    }
    Ok(dict)
}

/// A run of consecutive bundle pages
pub enum Section {
    /// Pages taken over from an existing document
    Document(Document),
    /// Pages drawn fresh into the bundle
    Drawn(Vec<Canvas>),
}

impl Section {
    pub fn page_count(&self) -> usize {
        match self {
            Section::Document(doc) => doc.get_pages().len(),
            Section::Drawn(pages) => pages.len(),
        }
    }
}

enum PageSource {
    Imported(ObjectId, Dictionary),
    Drawn(Canvas),
}

/// Concatenate `sections` into one document, keeping every page in order.
/// Drawn pages take their fonts from the returned slots, which the caller
/// embeds once all overlays are in place.
pub fn merge_sections(
    sections: Vec<Section>,
    fonts: &FontSet,
) -> Result<(Document, FontSlots)> {
    let mut merged = Document::with_version("1.7");
    let mut max_id: u32 = 1;
    let mut pages: Vec<PageSource> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for section in sections {
        let mut doc = match section {
            Section::Document(doc) => doc,
            Section::Drawn(canvases) => {
                pages.extend(canvases.into_iter().map(PageSource::Drawn));
                continue;
            }
        };
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            pages.push(PageSource::Imported(page_id, flattened_page(&doc, page_id)?));
        }

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline" => {}
                _ => {
                    objects.insert(object_id, object);
                }
            }
        }
    }

    merged.objects.extend(objects);
    merged.max_id = max_id;
    let pages_id = merged.new_object_id();
    let mut slots = FontSlots::reserve(&mut merged, fonts);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = match page {
            PageSource::Imported(page_id, mut dict) => {
                dict.set("Parent", Object::Reference(pages_id));
                merged.objects.insert(page_id, Object::Dictionary(dict));
                page_id
            }
            PageSource::Drawn(canvas) => add_page(&mut merged, pages_id, &canvas, &mut slots)?,
        };
        kids.push(Object::Reference(page_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = merged.add_object(catalog);
    merged.trailer.set("Root", Object::Reference(catalog_id));

    Ok((merged, slots))
}

/// Concatenate `documents` into one, keeping every page in its original order
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    let sections = documents.into_iter().map(Section::Document).collect();
    let (mut merged, slots) = merge_sections(sections, &FontSet::builtin())?;
    slots.embed(&mut merged)?;
    Ok(merged)
}

// =============================================================================
// Overlays
// =============================================================================

/// Boxed "appendix <label>" for the visual top-right corner of the first
/// page of `doc`, or `None` when it has no pages
pub fn appendix_stamp(
    doc: &Document,
    name: &str,
    label: &str,
    fonts: &FontSet,
    shaper: &Shaper,
) -> Result<Option<Canvas>> {
    let Some(&first_page) = doc.get_pages().values().next() else {
        log::debug!("'{}' has no pages, nothing to stamp", name);
        return Ok(None);
    };

    let frame = page_frame(doc, first_page)?;
    let placement = place(&frame, STAMP_BOX, Corner::TopRight, (STAMP_INSET, STAMP_INSET));
    log::debug!(
        "Stamping '{}' ({}° page) at {:.1},{:.1}",
        name,
        frame.rotation.degrees(),
        placement.draw_x,
        placement.draw_y
    );

    let (box_w, box_h) = STAMP_BOX;
    let mut canvas = Canvas::with_prefix(frame.width, frame.height, fonts, STAMP_PREFIX);
    canvas.transform(placement.matrix);
    canvas.set_fill_color(Rgb::from_hex(STAMP_FILL_COLOR));
    canvas.set_stroke_color(Rgb::BLACK);
    canvas.set_line_width(1.0);
    canvas.round_rect(0.0, 0.0, box_w, box_h, STAMP_CORNER_RADIUS, true, true);
    canvas.set_fill_color(Rgb::BLACK);
    canvas.set_font(FontStyle::Bold, STAMP_FONT_SIZE);
    let text = shaper.shape(&format!("{} {}", APPENDIX_WORD, label));
    canvas.draw_centred_string(box_w / 2.0, STAMP_BASELINE, &text);
    Ok(Some(canvas))
}

/// Mark the first page of an appendix with a boxed "appendix <label>" in its
/// visual top-right corner
pub fn stamp_appendix(
    doc: &mut Document,
    name: &str,
    label: &str,
    fonts: &FontSet,
    shaper: &Shaper,
) -> Result<()> {
    let before = doc.get_pages().len();
    let Some(&first_page) = doc.get_pages().values().next() else {
        log::debug!("'{}' has no pages, nothing to stamp", name);
        return Ok(());
    };
    let Some(canvas) = appendix_stamp(doc, name, label, fonts, shaper)? else {
        return Ok(());
    };
    apply_overlays(doc, &[(first_page, canvas)], fonts)?;
    ensure_page_count(doc, name, before)
}

/// Page number overlay for every page of `doc`
fn page_number_overlays(doc: &Document, fonts: &FontSet) -> Result<Vec<(ObjectId, Canvas)>> {
    let mut overlays = Vec::new();
    for (number, page_id) in doc.get_pages() {
        let frame = page_frame(doc, page_id)?;
        let text = number.to_string();
        let width = fonts.regular.string_width(&text, PAGE_NUMBER_FONT_SIZE);
        let placement = place(
            &frame,
            (width, PAGE_NUMBER_FONT_SIZE),
            Corner::BottomLeft,
            PAGE_NUMBER_INSET,
        );

        let mut canvas =
            Canvas::with_prefix(frame.width, frame.height, fonts, PAGE_NUMBER_PREFIX);
        canvas.transform(placement.matrix);
        canvas.set_fill_color(Rgb::BLACK);
        canvas.set_font(FontStyle::Regular, PAGE_NUMBER_FONT_SIZE);
        canvas.draw_string(0.0, 0.0, &text);
        overlays.push((page_id, canvas));
    }
    Ok(overlays)
}

/// Print the 1-based page number in the visual bottom-left corner of every page
pub fn number_pages(doc: &mut Document, fonts: &FontSet) -> Result<()> {
    let overlays = page_number_overlays(doc, fonts)?;
    apply_overlays(doc, &overlays, fonts)
}

fn ensure_page_count(doc: &Document, name: &str, expected: usize) -> Result<()> {
    let actual = doc.get_pages().len();
    if actual != expected {
        return Err(AppendixError::PageCountChanged {
            name: name.to_string(),
            before: expected,
            after: actual,
        });
    }
    Ok(())
}

// =============================================================================
// Assembly
// =============================================================================

/// One appendix ready for assembly
pub struct AppendixPart {
    pub cover: Canvas,
    pub content: Document,
    /// Drawn over the first content page
    pub stamp: Option<Canvas>,
}

/// Concatenate main document, table of contents and every appendix with its
/// cover, then stamp and number the pages. Fonts go in once for the bundle.
pub fn assemble(
    main: Document,
    toc: Vec<Canvas>,
    parts: Vec<AppendixPart>,
    fonts: &FontSet,
) -> Result<Document> {
    let mut sections = Vec::with_capacity(2 + parts.len() * 2);
    sections.push(Section::Document(main));
    sections.push(Section::Drawn(toc));

    // Stamps by 1-based bundle page number
    let mut stamps = Vec::new();
    let mut pages_so_far: usize = sections.iter().map(Section::page_count).sum();
    for part in parts {
        sections.push(Section::Drawn(vec![part.cover]));
        let content = Section::Document(part.content);
        let first_content_page = pages_so_far + 2;
        pages_so_far += 1 + content.page_count();
        if let Some(stamp) = part.stamp.filter(|_| content.page_count() > 0) {
            stamps.push((first_content_page as u32, stamp));
        }
        sections.push(content);
    }
    let expected = pages_so_far;

    let (mut merged, mut slots) = merge_sections(sections, fonts)?;
    ensure_page_count(&merged, "merged bundle", expected)?;

    let pages = merged.get_pages();
    for (number, canvas) in &stamps {
        let page_id = pages
            .get(number)
            .copied()
            .ok_or_else(|| AppendixError::PageCountChanged {
                name: "merged bundle".to_string(),
                before: expected,
                after: pages.len(),
            })?;
        overlay_page(&mut merged, page_id, canvas, &mut slots)?;
    }

    for (page_id, canvas) in page_number_overlays(&merged, fonts)? {
        overlay_page(&mut merged, page_id, &canvas, &mut slots)?;
    }
    slots.embed(&mut merged)?;
    ensure_page_count(&merged, "numbered bundle", expected)?;

    log::debug!("Assembled {} page(s)", expected);
    Ok(merged)
}
