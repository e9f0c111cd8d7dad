//! Canvas-style drawing over raw PDF content streams
//!
//! A [`Canvas`] records drawing operators for one page, keeping track of the
//! characters drawn with each font style so embedded fonts only describe the
//! glyphs in use. Canvases become either new pages ([`build_document`],
//! [`add_page`]) or overlays on existing pages ([`apply_overlays`],
//! [`overlay_page`]). Every page and overlay drawn into one document through
//! the same [`FontSlots`] shares a single embedded copy of each font.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::constants::{BEZIER_CIRCLE_FACTOR, DEFAULT_PAGE_DIMENSIONS};
use crate::fonts::{FontSet, FontStyle};
use crate::overlay::{PageFrame, PageRotation};
use crate::types::{AppendixError, Result, Rgb};

/// Font resource prefix for generated pages
pub const PAGE_FONT_PREFIX: &str = "Apx";

/// How deep to follow `/Parent` links for inherited page attributes
const MAX_INHERIT_DEPTH: usize = 32;

/// A string drawn on a canvas, kept for inspection
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Text in visual order as handed to the text operator
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub width: f32,
    pub fill: Rgb,
}

/// Drawing surface for one page or overlay
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f32,
    height: f32,
    fonts: FontSet,
    resource_prefix: String,
    ops: String,
    font: (FontStyle, f32),
    fill: Rgb,
    used: BTreeMap<FontStyle, BTreeSet<char>>,
    missing: BTreeMap<FontStyle, BTreeSet<char>>,
    texts: Vec<TextRun>,
}

impl Canvas {
    pub fn new(width: f32, height: f32, fonts: &FontSet) -> Self {
        Self::with_prefix(width, height, fonts, PAGE_FONT_PREFIX)
    }

    /// Canvas whose font resources are named `<prefix>R` and `<prefix>B`
    pub fn with_prefix(width: f32, height: f32, fonts: &FontSet, prefix: &str) -> Self {
        Self {
            width,
            height,
            fonts: fonts.clone(),
            resource_prefix: prefix.to_string(),
            ops: String::new(),
            font: (FontStyle::Regular, 12.0),
            fill: Rgb::BLACK,
            used: BTreeMap::new(),
            missing: BTreeMap::new(),
            texts: Vec::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.ops
    }

    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    pub fn used_chars(&self, style: FontStyle) -> Option<&BTreeSet<char>> {
        self.used.get(&style)
    }

    pub fn font_resource(&self, style: FontStyle) -> String {
        match style {
            FontStyle::Regular => format!("{}R", self.resource_prefix),
            FontStyle::Bold => format!("{}B", self.resource_prefix),
        }
    }

    // -------------------------------------------------------------------------
    // Graphics state
    // -------------------------------------------------------------------------

    pub fn save_state(&mut self) {
        self.ops.push_str("q\n");
    }

    pub fn restore_state(&mut self) {
        self.ops.push_str("Q\n");
    }

    /// Concatenate `matrix` onto the current transformation
    pub fn transform(&mut self, matrix: [f32; 6]) {
        let [a, b, c, d, e, f] = matrix;
        self.ops
            .push_str(&format!("{} {} {} {} {} {} cm\n", a, b, c, d, e, f));
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.fill = color;
        self.ops
            .push_str(&format!("{} {} {} rg\n", color.r, color.g, color.b));
    }

    pub fn set_fill_gray(&mut self, level: f32) {
        self.set_fill_color(Rgb::new(level, level, level));
    }

    pub fn set_stroke_color(&mut self, color: Rgb) {
        self.ops
            .push_str(&format!("{} {} {} RG\n", color.r, color.g, color.b));
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.ops.push_str(&format!("{} w\n", width));
    }

    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.font = (style, size);
    }

    // -------------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------------

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: bool, stroke: bool) {
        self.ops
            .push_str(&format!("{} {} {} {} re {}\n", x, y, w, h, paint_op(fill, stroke)));
    }

    /// Rectangle with quarter-circle corners of radius `r`
    #[allow(clippy::too_many_arguments)]
    pub fn round_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        r: f32,
        fill: bool,
        stroke: bool,
    ) {
        let r = r.min(w / 2.0).min(h / 2.0);
        let k = r * BEZIER_CIRCLE_FACTOR;
        let (x1, y1) = (x + w, y + h);

        let mut path = String::new();
        path.push_str(&format!("{} {} m\n", x + r, y));
        path.push_str(&format!("{} {} l\n", x1 - r, y));
        path.push_str(&format!(
            "{} {} {} {} {} {} c\n",
            x1 - r + k,
            y,
            x1,
            y + r - k,
            x1,
            y + r
        ));
        path.push_str(&format!("{} {} l\n", x1, y1 - r));
        path.push_str(&format!(
            "{} {} {} {} {} {} c\n",
            x1,
            y1 - r + k,
            x1 - r + k,
            y1,
            x1 - r,
            y1
        ));
        path.push_str(&format!("{} {} l\n", x + r, y1));
        path.push_str(&format!(
            "{} {} {} {} {} {} c\n",
            x + r - k,
            y1,
            x,
            y1 - r + k,
            x,
            y1 - r
        ));
        path.push_str(&format!("{} {} l\n", x, y + r));
        path.push_str(&format!(
            "{} {} {} {} {} {} c\n",
            x,
            y + r - k,
            x + r - k,
            y,
            x + r,
            y
        ));
        path.push_str(&format!("h {}\n", paint_op(fill, stroke)));
        self.ops.push_str(&path);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops
            .push_str(&format!("{} {} m {} {} l S\n", x1, y1, x2, y2));
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    /// Width of `text` in the current font
    pub fn string_width(&self, text: &str) -> f32 {
        let (style, size) = self.font;
        self.fonts.get(style).string_width(text, size)
    }

    /// Draw `text` (already in visual order) with its baseline starting at `(x, y)`
    pub fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        let (style, size) = self.font;
        let face = self.fonts.get(style);

        let missing = face.missing_chars(text);
        if !missing.is_empty() {
            if face.is_builtin() {
                log::warn!(
                    "Font {} has no glyph for {:?}; substituting",
                    face.name(),
                    missing
                );
            }
            self.missing.entry(style).or_default().extend(missing);
        }

        let encoded = face.encode(text);
        let width = face.string_width(text, size);
        self.used.entry(style).or_default().extend(text.chars());

        self.ops.push_str(&format!(
            "BT /{} {} Tf {} {} Td <{}> Tj ET\n",
            self.font_resource(style),
            size,
            x,
            y,
            hex_string(&encoded)
        ));
        self.texts.push(TextRun {
            text: text.to_string(),
            x,
            y,
            size,
            style,
            width,
            fill: self.fill,
        });
    }

    /// Draw `text` centred horizontally on `cx`
    pub fn draw_centred_string(&mut self, cx: f32, y: f32, text: &str) {
        let width = self.string_width(text);
        self.draw_string(cx - width / 2.0, y, text);
    }

    /// Draw `text` so that it ends at `right`
    pub fn draw_right_string(&mut self, right: f32, y: f32, text: &str) {
        let width = self.string_width(text);
        self.draw_string(right - width, y, text);
    }
}

fn paint_op(fill: bool, stroke: bool) -> &'static str {
    match (fill, stroke) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        (false, false) => "n",
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

// =============================================================================
// Document Building
// =============================================================================

/// Embedded fonts must cover every drawn character. The builtin fallback is
/// already known to be lossy and only warns.
fn check_glyphs(canvas: &Canvas, fonts: &FontSet) -> Result<()> {
    for (style, chars) in &canvas.missing {
        let face = fonts.get(*style);
        if !face.is_builtin() && !chars.is_empty() {
            return Err(AppendixError::Font(format!(
                "font {} cannot render {:?}",
                face.name(),
                chars
            )));
        }
    }
    Ok(())
}

/// Font dictionaries reserved in one document and written once every page
/// and overlay using them has been drawn
#[derive(Debug)]
pub struct FontSlots {
    fonts: FontSet,
    ids: BTreeMap<FontStyle, ObjectId>,
    used: BTreeMap<FontStyle, BTreeSet<char>>,
}

impl FontSlots {
    pub fn reserve(doc: &mut Document, fonts: &FontSet) -> Self {
        let ids = [FontStyle::Regular, FontStyle::Bold]
            .into_iter()
            .map(|style| (style, doc.new_object_id()))
            .collect();
        Self {
            fonts: fonts.clone(),
            ids,
            used: BTreeMap::new(),
        }
    }

    /// Font resources `canvas` needs, as references to the reserved slots
    fn register(&mut self, canvas: &Canvas) -> Result<Vec<(FontStyle, ObjectId)>> {
        check_glyphs(canvas, &self.fonts)?;
        let mut refs = Vec::new();
        for (style, chars) in &canvas.used {
            if chars.is_empty() {
                continue;
            }
            self.used.entry(*style).or_default().extend(chars.iter().copied());
            if let Some(&id) = self.ids.get(style) {
                refs.push((*style, id));
            }
        }
        Ok(refs)
    }

    /// Embed each style that was drawn with, once, into its slot
    pub fn embed(self, doc: &mut Document) -> Result<()> {
        for (style, id) in &self.ids {
            match self.used.get(style) {
                Some(chars) if !chars.is_empty() => {
                    self.fonts.get(*style).embed(doc, *id, chars)?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Add `canvas` to `doc` as a page under `pages_id`. The caller links the
/// returned page into the `Kids` array.
pub fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    canvas: &Canvas,
    slots: &mut FontSlots,
) -> Result<ObjectId> {
    let mut font_dict = Dictionary::new();
    for (style, id) in slots.register(canvas)? {
        font_dict.set(canvas.font_resource(style), Object::Reference(id));
    }
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(font_dict));

    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        canvas.ops.clone().into_bytes(),
    ));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(canvas.width),
            Object::Real(canvas.height),
        ]),
    );
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("Contents", Object::Reference(content_id));
    Ok(doc.add_object(page_dict))
}

/// Build a new document with one page per canvas
pub fn build_document(pages: &[Canvas], fonts: &FontSet) -> Result<Document> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut slots = FontSlots::reserve(&mut doc, fonts);

    let mut kids = Vec::with_capacity(pages.len());
    for canvas in pages {
        kids.push(Object::Reference(add_page(&mut doc, pages_id, canvas, &mut slots)?));
    }
    slots.embed(&mut doc)?;

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    Ok(doc)
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Look up a page attribute, following `/Parent` for inheritable keys
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut dict = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => dict = doc.get_dictionary(parent)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Raw geometry of a page: MediaBox (inherited if needed) and `/Rotate`
pub fn page_frame(doc: &Document, page_id: ObjectId) -> Result<PageFrame> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .filter(|arr| arr.len() == 4)
        .map(|arr| {
            let n: Vec<Option<f32>> = arr.iter().map(|o| extract_number(resolve(doc, o))).collect();
            n
        });

    let (llx, lly, urx, ury) = match media_box.as_deref() {
        Some([Some(a), Some(b), Some(c), Some(d)]) => (*a, *b, *c, *d),
        _ => (0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1),
    };

    let rotate = inherited_attribute(doc, page_id, b"Rotate")?
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| match obj {
            Object::Integer(i) => Some(*i),
            Object::Real(r) if r.fract() == 0.0 => Some(*r as i64),
            _ => None,
        });

    Ok(PageFrame::new(
        (urx - llx).abs(),
        (ury - lly).abs(),
        PageRotation::from_raw(rotate),
    )
    .with_origin(llx.min(urx), lly.min(ury)))
}

// =============================================================================
// Overlays
// =============================================================================

/// Draw each canvas on top of its page. Fonts are embedded once for the
/// whole batch; existing page content is isolated in its own `q ... Q`.
pub fn apply_overlays(
    doc: &mut Document,
    overlays: &[(ObjectId, Canvas)],
    fonts: &FontSet,
) -> Result<()> {
    if overlays.is_empty() {
        return Ok(());
    }
    let mut slots = FontSlots::reserve(doc, fonts);
    for (page_id, canvas) in overlays {
        overlay_page(doc, *page_id, canvas, &mut slots)?;
    }
    slots.embed(doc)
}

/// Draw `canvas` over one page, taking its fonts from `slots`
pub fn overlay_page(
    doc: &mut Document,
    page_id: ObjectId,
    canvas: &Canvas,
    slots: &mut FontSlots,
) -> Result<()> {
    let font_refs = slots.register(canvas)?;

    // Effective resources, copied so shared dictionaries stay untouched
    let mut resources = match inherited_attribute(doc, page_id, b"Resources")? {
        Some(obj) => resolve(doc, obj).as_dict().cloned().unwrap_or_default(),
        None => Dictionary::new(),
    };
    let mut font_dict = match resources.get(b"Font") {
        Ok(obj) => resolve(doc, obj).as_dict().cloned().unwrap_or_default(),
        Err(_) => Dictionary::new(),
    };

    let mut ops = canvas.ops.clone();
    for (style, id) in font_refs {
        let wanted = canvas.font_resource(style);
        let mut name = wanted.clone();
        let mut suffix = 1;
        while font_dict.has(name.as_bytes()) {
            name = format!("{}{}", wanted, suffix);
            suffix += 1;
        }
        if name != wanted {
            ops = ops.replace(&format!("/{} ", wanted), &format!("/{} ", name));
        }
        font_dict.set(name, Object::Reference(id));
    }
    resources.set("Font", Object::Dictionary(font_dict));

    let existing = existing_content_refs(doc, page_id)?;
    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(
        Dictionary::new(),
        format!("\nQ\nq\n{}Q\n", ops).into_bytes(),
    ));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| AppendixError::UnreadableDocument {
            name: format!("page {:?}", page_id),
            reason: e.to_string(),
        })?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// Current content streams of a page as a flat list of references
fn existing_content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let refs = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    };
    Ok(refs)
}
