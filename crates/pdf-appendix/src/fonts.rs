//! Font handles for generated pages and overlays
//!
//! Fonts are passed around explicitly as a [`FontSet`]; nothing is registered
//! globally. A TrueType face is embedded as a Type0 composite font with
//! Identity-H encoding so right-to-left scripts survive, subset down to the
//! glyphs actually drawn. Without one, the standard Helvetica faces are used,
//! which cannot show Hebrew.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use ttf_parser::Face;

use crate::types::{AppendixError, Result};

/// Weight of a face within a [`FontSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// Glyph id and advance for every character a face maps, read once at load
#[derive(Debug)]
pub struct GlyphMetrics {
    units_per_em: f32,
    glyphs: HashMap<char, (u16, u16)>,
}

impl GlyphMetrics {
    fn read(face: &Face<'_>) -> Self {
        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(gid) = face.glyph_index(ch) {
                        let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                        glyphs.entry(ch).or_insert((gid.0, advance));
                    }
                });
            }
        }
        Self {
            units_per_em: face.units_per_em() as f32,
            glyphs,
        }
    }

    fn glyph(&self, ch: char) -> Option<(u16, u16)> {
        self.glyphs.get(&ch).copied()
    }
}

/// A single loaded face
#[derive(Clone)]
pub enum FontFace {
    /// TrueType/OpenType outline data, subset and embedded on use
    TrueType {
        name: String,
        data: Arc<Vec<u8>>,
        metrics: Arc<GlyphMetrics>,
    },
    /// One of the standard 14 fonts, never embedded
    Builtin { base_font: &'static str },
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFace::TrueType { name, data, .. } => f
                .debug_struct("TrueType")
                .field("name", name)
                .field("bytes", &data.len())
                .finish(),
            FontFace::Builtin { base_font } => {
                f.debug_struct("Builtin").field("base_font", base_font).finish()
            }
        }
    }
}

impl FontFace {
    /// Load and validate a TrueType file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Embedded")
            .to_string();
        Self::from_bytes(name, data)
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let face = Face::parse(&data, 0)
            .map_err(|e| AppendixError::Font(format!("cannot parse font '{name}': {e}")))?;
        let metrics = GlyphMetrics::read(&face);
        log::debug!("Loaded font '{}' with {} mapped characters", name, metrics.glyphs.len());
        Ok(FontFace::TrueType {
            name,
            data: Arc::new(data),
            metrics: Arc::new(metrics),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            FontFace::TrueType { name, .. } => name,
            FontFace::Builtin { base_font } => base_font,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin { .. })
    }

    fn metrics(&self) -> Option<&GlyphMetrics> {
        match self {
            FontFace::TrueType { metrics, .. } => Some(metrics.as_ref()),
            FontFace::Builtin { .. } => None,
        }
    }

    /// Advance width of `text` at `size` points
    pub fn string_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = match self.metrics() {
            Some(metrics) => text
                .chars()
                .map(|ch| {
                    let advance = metrics.glyph(ch).map(|(_, adv)| adv).unwrap_or(0);
                    advance as f32 / metrics.units_per_em * 1000.0
                })
                .sum(),
            None => text
                .chars()
                .map(|ch| helvetica_width(char_to_winansi(ch).unwrap_or(b'?')))
                .sum(),
        };
        units * size / 1000.0
    }

    /// Characters in `text` the face has no glyph for
    pub fn missing_chars(&self, text: &str) -> Vec<char> {
        match self.metrics() {
            Some(metrics) => text
                .chars()
                .filter(|&ch| metrics.glyph(ch).is_none())
                .collect(),
            None => text
                .chars()
                .filter(|&ch| char_to_winansi(ch).is_none())
                .collect(),
        }
    }

    /// Bytes for a PDF string operand drawn with this face.
    ///
    /// Embedded faces take big-endian glyph ids of the full face, which the
    /// embedded font maps onto its subset; builtin faces take WinAnsi bytes
    /// with `?` for anything outside that code page.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self.metrics() {
            Some(metrics) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = metrics.glyph(ch).map(|(gid, _)| gid).unwrap_or(0);
                    out.extend_from_slice(&gid.to_be_bytes());
                }
                out
            }
            None => text
                .chars()
                .map(|ch| char_to_winansi(ch).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Write this face's font dictionary at `id`, a slot reserved earlier in
    /// `doc`, covering the glyphs for `used`
    pub fn embed(&self, doc: &mut Document, id: ObjectId, used: &BTreeSet<char>) -> Result<()> {
        let font = match self {
            FontFace::Builtin { base_font } => {
                let mut font = Dictionary::new();
                font.set("Type", Object::Name(b"Font".to_vec()));
                font.set("Subtype", Object::Name(b"Type1".to_vec()));
                font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
                font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                font
            }
            FontFace::TrueType { name, data, .. } => embed_truetype(doc, name, data, used)?,
        };
        doc.objects.insert(id, Object::Dictionary(font));
        Ok(())
    }
}

/// Regular and bold faces used for one generation run
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
}

/// File-name pairs searched by [`FontSet::discover`], in priority order
const FONT_CANDIDATES: &[(&str, &str)] = &[
    ("David-Regular.ttf", "David-Bold.ttf"),
    ("NotoSansHebrew-Regular.ttf", "NotoSansHebrew-Bold.ttf"),
    ("david.ttf", "davidbd.ttf"),
];

impl FontSet {
    pub fn get(&self, style: FontStyle) -> &FontFace {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }

    /// Standard Helvetica faces. Hebrew text cannot be shown with these.
    pub fn builtin() -> Self {
        Self {
            regular: FontFace::Builtin {
                base_font: "Helvetica",
            },
            bold: FontFace::Builtin {
                base_font: "Helvetica-Bold",
            },
        }
    }

    /// Load a regular face and, optionally, a bold one.
    /// Without a bold file the regular face doubles as bold.
    pub fn from_files(regular: &Path, bold: Option<&Path>) -> Result<Self> {
        let regular = FontFace::from_file(regular)?;
        let bold = match bold {
            Some(path) => FontFace::from_file(path)?,
            None => regular.clone(),
        };
        Ok(Self { regular, bold })
    }

    /// Search `dirs` (then the Windows font folder) for a Hebrew-capable
    /// family. Falls back to [`FontSet::builtin`] with a warning.
    pub fn discover(dirs: &[PathBuf]) -> Self {
        let mut search: Vec<PathBuf> = dirs.to_vec();
        search.push(PathBuf::from(r"C:\Windows\Fonts"));

        for (regular_name, bold_name) in FONT_CANDIDATES {
            for dir in &search {
                let regular = dir.join(regular_name);
                if !regular.is_file() {
                    continue;
                }
                let bold = dir.join(bold_name);
                let bold = bold.is_file().then_some(bold);
                if bold.is_none() {
                    log::warn!(
                        "No bold face next to {}, using regular for bold text",
                        regular.display()
                    );
                }
                match Self::from_files(&regular, bold.as_deref()) {
                    Ok(set) => {
                        log::info!("Using fonts from {}", regular.display());
                        return set;
                    }
                    Err(e) => log::warn!("Skipping {}: {e}", regular.display()),
                }
            }
        }

        log::warn!("No Hebrew font found, falling back to Helvetica; Hebrew text will not render");
        Self::builtin()
    }

    pub fn is_builtin(&self) -> bool {
        self.regular.is_builtin()
    }
}

/// Build a Type0 font over a CIDFontType2 descendant holding a subset of the
/// face. Content streams keep the full face's glyph ids as CIDs; the
/// CIDToGIDMap stream points each of them at its glyph in the subset.
fn embed_truetype(
    doc: &mut Document,
    name: &str,
    data: &Arc<Vec<u8>>,
    used: &BTreeSet<char>,
) -> Result<Dictionary> {
    let face = Face::parse(data, 0)
        .map_err(|e| AppendixError::Font(format!("cannot parse font '{name}': {e}")))?;

    let units = face.units_per_em() as f32;
    let scale = |v: f32| Object::Integer((v / units * 1000.0).round() as i64);
    let bb = face.global_bounding_box();

    // gid -> (width, char) for every used character the face can draw
    let mut glyphs: BTreeMap<u16, (i64, char)> = BTreeMap::new();
    for &ch in used {
        if let Some(gid) = face.glyph_index(ch) {
            let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f32;
            let width = (advance / units * 1000.0).round() as i64;
            glyphs.entry(gid.0).or_insert((width, ch));
        }
    }

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut cid_to_gid: BTreeMap<u16, u16> = BTreeMap::new();
    for &gid in glyphs.keys() {
        cid_to_gid.insert(gid, remapper.remap(gid));
    }

    let (program, cid_map, ps_name) = match subsetter::subset(data, 0, &remapper) {
        Ok(subset) => {
            log::debug!(
                "Subset font '{}' to {} glyph(s), {} of {} bytes",
                name,
                cid_to_gid.len(),
                subset.len(),
                data.len()
            );
            let map_id = doc.add_object(Stream::new(
                Dictionary::new(),
                cid_to_gid_map(&cid_to_gid),
            ));
            let ps_name = format!("{}+{}", subset_tag(&cid_to_gid), postscript_name(name));
            (subset, Object::Reference(map_id), ps_name)
        }
        Err(e) => {
            log::warn!("Font subsetting failed for {name}: {e}; embedding the full font");
            (
                data.as_ref().clone(),
                Object::Name(b"Identity".to_vec()),
                postscript_name(name),
            )
        }
    };

    let mut file_dict = Dictionary::new();
    file_dict.set("Length1", Object::Integer(program.len() as i64));
    let font_file_id = doc.add_object(Stream::new(file_dict, program));

    let mut descriptor = Dictionary::new();
    descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
    descriptor.set("FontName", Object::Name(ps_name.clone().into_bytes()));
    descriptor.set("Flags", Object::Integer(32));
    descriptor.set(
        "FontBBox",
        Object::Array(vec![
            scale(bb.x_min as f32),
            scale(bb.y_min as f32),
            scale(bb.x_max as f32),
            scale(bb.y_max as f32),
        ]),
    );
    descriptor.set("ItalicAngle", Object::Integer(0));
    descriptor.set("Ascent", scale(face.ascender() as f32));
    descriptor.set("Descent", scale(face.descender() as f32));
    descriptor.set(
        "CapHeight",
        scale(face.capital_height().map(|h| h as f32).unwrap_or(0.7 * units)),
    );
    descriptor.set("StemV", Object::Integer(80));
    descriptor.set("FontFile2", Object::Reference(font_file_id));
    let descriptor_id = doc.add_object(descriptor);

    let mut widths: Vec<Object> = Vec::with_capacity(glyphs.len() * 2);
    for (&gid, &(width, _)) in &glyphs {
        widths.push(Object::Integer(gid as i64));
        widths.push(Object::Array(vec![Object::Integer(width)]));
    }

    let mut system_info = Dictionary::new();
    system_info.set("Registry", Object::string_literal("Adobe"));
    system_info.set("Ordering", Object::string_literal("Identity"));
    system_info.set("Supplement", Object::Integer(0));

    let mut cid_font = Dictionary::new();
    cid_font.set("Type", Object::Name(b"Font".to_vec()));
    cid_font.set("Subtype", Object::Name(b"CIDFontType2".to_vec()));
    cid_font.set("BaseFont", Object::Name(ps_name.clone().into_bytes()));
    cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
    cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
    cid_font.set("DW", Object::Integer(1000));
    cid_font.set("W", Object::Array(widths));
    cid_font.set("CIDToGIDMap", cid_map);
    let cid_font_id = doc.add_object(cid_font);

    let cmap = to_unicode_cmap(&postscript_name(name), &glyphs);
    let to_unicode_id = doc.add_object(Stream::new(Dictionary::new(), cmap.into_bytes()));

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type0".to_vec()));
    font.set("BaseFont", Object::Name(ps_name.into_bytes()));
    font.set("Encoding", Object::Name(b"Identity-H".to_vec()));
    font.set(
        "DescendantFonts",
        Object::Array(vec![Object::Reference(cid_font_id)]),
    );
    font.set("ToUnicode", Object::Reference(to_unicode_id));
    Ok(font)
}

fn postscript_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Big-endian subset glyph id for every CID up to the largest one in use
fn cid_to_gid_map(cid_to_gid: &BTreeMap<u16, u16>) -> Vec<u8> {
    let len = cid_to_gid.keys().next_back().map_or(0, |&max| max as usize + 1);
    let mut map = vec![0u8; len * 2];
    for (&cid, &gid) in cid_to_gid {
        let at = cid as usize * 2;
        map[at..at + 2].copy_from_slice(&gid.to_be_bytes());
    }
    map
}

/// Six uppercase letters naming a subset, derived from the glyphs it holds
fn subset_tag(cid_to_gid: &BTreeMap<u16, u16>) -> String {
    let mut hash: u32 = 2166136261;
    for &cid in cid_to_gid.keys() {
        for byte in cid.to_be_bytes() {
            hash = (hash ^ byte as u32).wrapping_mul(16777619);
        }
    }
    (0..6)
        .map(|_| {
            let letter = (b'A' + (hash % 26) as u8) as char;
            hash /= 26;
            letter
        })
        .collect()
}

fn to_unicode_cmap(name: &str, glyphs: &BTreeMap<u16, (i64, char)>) -> String {
    let mut cmap = String::new();
    cmap.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
    cmap.push_str(
        "/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n",
    );
    cmap.push_str(&format!("/CMapName /{name}-UTF16 def\n/CMapType 2 def\n"));
    cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let pairs: Vec<(u16, char)> = glyphs.iter().map(|(&gid, &(_, ch))| (gid, ch)).collect();
    // bfchar sections hold at most 100 entries
    for chunk in pairs.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

/// WinAnsi byte for `ch`, if the code page has one
fn char_to_winansi(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u8),
        0x20AC => Some(0x80),
        0x2026 => Some(0x85),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        _ => None,
    }
}

/// Approximate Helvetica advance widths at 1000 units/em
fn helvetica_width(byte: u8) -> f32 {
    match byte {
        b' ' => 278.0,
        b'.' | b',' | b':' | b';' => 278.0,
        b'-' => 333.0,
        b'(' | b')' | b'[' | b']' => 333.0,
        b'0'..=b'9' => 556.0,
        b'I' | b'J' => 278.0,
        b'M' | b'W' => 833.0,
        b'A'..=b'Z' => 667.0,
        b'f' | b'i' | b'j' | b'l' | b't' | b'r' => 278.0,
        b'm' | b'w' => 833.0,
        b'a'..=b'z' => 556.0,
        _ => 556.0,
    }
}
