//! Bidirectional text shaping
//!
//! PDF text operators lay glyphs out strictly left to right. Hebrew text with
//! embedded Latin words or digit runs has to be handed to them in *visual*
//! order, which is what the Unicode Bidirectional Algorithm produces.

use std::sync::atomic::{AtomicBool, Ordering};
use unicode_bidi::BidiInfo;

/// How logical text is turned into visual order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapingMode {
    /// Full Unicode Bidirectional Algorithm
    #[default]
    Unicode,
    /// Reverse every character. Only correct for text without any
    /// left-to-right runs; digits and Latin words come out backwards.
    NaiveReversal,
}

/// Converts logical-order strings into the visual order a left-to-right
/// drawing primitive needs.
#[derive(Debug, Default)]
pub struct Shaper {
    mode: ShapingMode,
    warned: AtomicBool,
}

impl Shaper {
    pub fn new(mode: ShapingMode) -> Self {
        Self {
            mode,
            warned: AtomicBool::new(false),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.mode == ShapingMode::NaiveReversal
    }

    /// Shape `logical` for left-to-right drawing
    pub fn shape(&self, logical: &str) -> String {
        if self.is_degraded() && !logical.is_empty() && !self.warned.swap(true, Ordering::Relaxed)
        {
            log::warn!(
                "Bidi shaping is running in naive reversal mode; \
                 mixed-direction text will render incorrectly"
            );
        }
        shape_with(logical, self.mode)
    }
}

/// Shape with the full bidirectional algorithm
pub fn shape(logical: &str) -> String {
    shape_with(logical, ShapingMode::Unicode)
}

pub fn shape_with(logical: &str, mode: ShapingMode) -> String {
    if logical.is_empty() {
        return String::new();
    }
    match mode {
        ShapingMode::Unicode => reorder_visual(logical),
        ShapingMode::NaiveReversal => logical.chars().rev().collect(),
    }
}

/// True if the text holds at least one right-to-left character
pub fn has_rtl(text: &str) -> bool {
    let info = BidiInfo::new(text, None);
    info.has_rtl()
}

fn reorder_visual(text: &str) -> String {
    let info = BidiInfo::new(text, None);
    if !info.has_rtl() {
        return text.to_string();
    }

    let mut visual = String::with_capacity(text.len());
    for para in &info.paragraphs {
        let (levels, runs) = info.visual_runs(para, para.range.clone());
        for run in runs {
            let slice = &text[run.clone()];
            if levels[run.start].is_rtl() {
                visual.extend(slice.chars().rev().map(mirror));
            } else {
                visual.push_str(slice);
            }
        }
    }
    visual
}

/// Mirrored glyph for paired punctuation inside right-to-left runs
fn mirror(ch: char) -> char {
    match ch {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        '‹' => '›',
        '›' => '‹',
        _ => ch,
    }
}
