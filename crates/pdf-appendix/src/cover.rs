//! Cover sheets placed before each appendix

use lopdf::Document;

use crate::bidi::Shaper;
use crate::canvas::{build_document, Canvas};
use crate::constants::{
    A4_HEIGHT_PT, A4_WIDTH_PT, APPENDIX_WORD, BANNER_COLOR, BANNER_HEIGHT, CLASSIC_BORDER_INSET,
    CLASSIC_BORDER_WIDTH, PAGES_WORD,
};
use crate::fonts::{FontSet, FontStyle};
use crate::types::{Result, Rgb, Template, TocEntry};

/// What a cover sheet shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverSpec {
    pub label: String,
    pub title: String,
    pub start_page: usize,
    pub end_page: usize,
}

impl From<&TocEntry> for CoverSpec {
    fn from(entry: &TocEntry) -> Self {
        Self {
            label: entry.label.clone(),
            title: entry.title.clone(),
            start_page: entry.start_page,
            end_page: entry.end_page,
        }
    }
}

/// Font sizes and baselines of the three cover lines for one template
struct CoverLines {
    label: (f32, f32),
    title: (f32, f32),
    pages: (f32, f32),
}

fn lines_for(template: Template) -> CoverLines {
    let cy = A4_HEIGHT_PT / 2.0;
    match template {
        Template::Modern => CoverLines {
            label: (48.0, A4_HEIGHT_PT - 70.0),
            title: (24.0, A4_HEIGHT_PT - 115.0),
            pages: (20.0, A4_HEIGHT_PT - 155.0),
        },
        Template::Minimal => CoverLines {
            label: (48.0, cy + 50.0),
            title: (22.0, cy),
            pages: (18.0, cy - 50.0),
        },
        Template::Classic => CoverLines {
            label: (56.0, cy + 70.0),
            title: (26.0, cy + 10.0),
            pages: (22.0, cy - 50.0),
        },
    }
}

/// Draw the cover sheet for one appendix on a fresh A4 canvas
pub fn render_cover(
    spec: &CoverSpec,
    template: Template,
    fonts: &FontSet,
    shaper: &Shaper,
) -> Canvas {
    let mut canvas = Canvas::new(A4_WIDTH_PT, A4_HEIGHT_PT, fonts);
    let cx = A4_WIDTH_PT / 2.0;

    match template {
        Template::Modern => {
            canvas.set_fill_color(Rgb::from_hex(BANNER_COLOR));
            canvas.rect(
                0.0,
                A4_HEIGHT_PT - BANNER_HEIGHT,
                A4_WIDTH_PT,
                BANNER_HEIGHT,
                true,
                false,
            );
            canvas.set_fill_color(Rgb::WHITE);
        }
        Template::Minimal => {}
        Template::Classic => {
            canvas.set_stroke_color(Rgb::BLACK);
            canvas.set_line_width(CLASSIC_BORDER_WIDTH);
            canvas.rect(
                CLASSIC_BORDER_INSET,
                CLASSIC_BORDER_INSET,
                A4_WIDTH_PT - 2.0 * CLASSIC_BORDER_INSET,
                A4_HEIGHT_PT - 2.0 * CLASSIC_BORDER_INSET,
                false,
                true,
            );
        }
    }

    let lines = lines_for(template);

    canvas.set_font(FontStyle::Bold, lines.label.0);
    let label = shaper.shape(&format!("{} {}", APPENDIX_WORD, spec.label));
    canvas.draw_centred_string(cx, lines.label.1, &label);

    // No title, no line; the other two keep their places
    if !spec.title.trim().is_empty() {
        canvas.set_font(FontStyle::Regular, lines.title.0);
        canvas.draw_centred_string(cx, lines.title.1, &shaper.shape(&spec.title));
    }

    canvas.set_font(FontStyle::Regular, lines.pages.0);
    let pages = shaper.shape(&format!(
        "{}: {} - {}",
        PAGES_WORD, spec.start_page, spec.end_page
    ));
    canvas.draw_centred_string(cx, lines.pages.1, &pages);

    canvas
}

/// Single-page document holding the cover sheet
pub fn cover_document(
    spec: &CoverSpec,
    template: Template,
    fonts: &FontSet,
    shaper: &Shaper,
) -> Result<Document> {
    build_document(&[render_cover(spec, template, fonts, shaper)], fonts)
}
