//! Table of contents listing every appendix with its page range
//!
//! Rows are laid out right to left: the appendix label and title sit against
//! the right margin, the numeric page range against the left margin, and a
//! dot leader fills the space between them. Only the first page carries the
//! title and column headers.

use lopdf::Document;

use crate::bidi::Shaper;
use crate::canvas::{build_document, Canvas};
use crate::constants::{
    A4_HEIGHT_PT, A4_WIDTH_PT, APPENDIX_WORD, BANNER_COLOR, LEADER_GAP, LEADER_GRAY, LEADER_STEP,
    PAGES_WORD, TOC_BODY_SIZE, TOC_BOTTOM_RESERVE, TOC_HEADER_SIZE, TOC_LINE_HEIGHT, TOC_MARGIN,
    TOC_NAME_HEADER, TOC_SEPARATOR_WIDTH, TOC_TITLE, TOC_TITLE_SIZE,
};
use crate::fonts::{FontSet, FontStyle};
use crate::types::{Result, Rgb, Template, TocEntry};

/// Rendered table of contents, one canvas per page
#[derive(Debug, Clone)]
pub struct TocLayout {
    pub pages: Vec<Canvas>,
}

impl TocLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn to_document(&self, fonts: &FontSet) -> Result<Document> {
        build_document(&self.pages, fonts)
    }
}

/// Logical text of an entry's right-hand column
pub fn entry_caption(entry: &TocEntry) -> String {
    if entry.title.trim().is_empty() {
        format!("{} {}", APPENDIX_WORD, entry.label)
    } else {
        format!("{} {} - {}", APPENDIX_WORD, entry.label, entry.title)
    }
}

/// Page range shown in the left-hand column
pub fn entry_range(entry: &TocEntry) -> String {
    format!("{}-{}", entry.start_page, entry.end_page)
}

/// X positions of the leader dots on one row.
///
/// Dots start `LEADER_GAP` after the range text and every dot must end at
/// least `LEADER_GAP` before the caption. A row too crowded for that gets none.
pub fn leader_positions(
    page_width: f32,
    margin: f32,
    range_width: f32,
    caption_width: f32,
    dot_width: f32,
) -> Vec<f32> {
    let start = margin + range_width + LEADER_GAP;
    let end = page_width - margin - caption_width - LEADER_GAP;

    let mut positions = Vec::new();
    let mut x = start;
    while x + dot_width <= end {
        positions.push(x);
        x += LEADER_STEP;
    }
    positions
}

/// Lay out the table of contents for `entries`
pub fn render_toc(
    entries: &[TocEntry],
    template: Template,
    fonts: &FontSet,
    shaper: &Shaper,
) -> TocLayout {
    let (width, height) = (A4_WIDTH_PT, A4_HEIGHT_PT);
    let left = TOC_MARGIN;
    let right = width - TOC_MARGIN;
    let bottom = TOC_MARGIN + TOC_BOTTOM_RESERVE;

    let mut pages = Vec::new();
    let mut canvas = Canvas::new(width, height, fonts);
    let mut y = height - TOC_MARGIN;

    let title_color = match template {
        Template::Modern => Rgb::from_hex(BANNER_COLOR),
        Template::Classic | Template::Minimal => Rgb::BLACK,
    };
    canvas.set_fill_color(title_color);
    canvas.set_font(FontStyle::Bold, TOC_TITLE_SIZE);
    canvas.draw_centred_string(width / 2.0, y, &shaper.shape(TOC_TITLE));
    canvas.set_fill_color(Rgb::BLACK);
    y -= 20.0;

    canvas.set_font(FontStyle::Bold, TOC_HEADER_SIZE);
    canvas.draw_right_string(right, y, &shaper.shape(TOC_NAME_HEADER));
    canvas.draw_string(left, y, &shaper.shape(PAGES_WORD));
    y -= 10.0;

    canvas.set_stroke_color(Rgb::BLACK);
    canvas.set_line_width(TOC_SEPARATOR_WIDTH);
    canvas.line(left, y, right, y);
    y -= 25.0;

    canvas.set_font(FontStyle::Regular, TOC_BODY_SIZE);
    let dot_width = canvas.string_width(".");

    for entry in entries {
        if y < bottom {
            pages.push(canvas);
            canvas = Canvas::new(width, height, fonts);
            canvas.set_font(FontStyle::Regular, TOC_BODY_SIZE);
            canvas.set_fill_color(Rgb::BLACK);
            y = height - TOC_MARGIN;
        }

        let caption = shaper.shape(&entry_caption(entry));
        let range = entry_range(entry);

        canvas.draw_right_string(right, y, &caption);
        canvas.draw_string(left, y, &range);

        let dots = leader_positions(
            width,
            TOC_MARGIN,
            canvas.string_width(&range),
            canvas.string_width(&caption),
            dot_width,
        );
        if !dots.is_empty() {
            canvas.set_fill_gray(LEADER_GRAY);
            for x in dots {
                canvas.draw_string(x, y, ".");
            }
            canvas.set_fill_color(Rgb::BLACK);
        }

        y -= TOC_LINE_HEIGHT;
    }
    pages.push(canvas);

    TocLayout { pages }
}
