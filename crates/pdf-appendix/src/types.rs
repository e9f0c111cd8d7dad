use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppendixError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unreadable document '{name}': {reason}")]
    UnreadableDocument { name: String, reason: String },
    #[error("Font error: {0}")]
    Font(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error(
        "Table of contents did not settle after {passes} passes \
         (laid out for {last_assumed} pages, rendered {last_measured})"
    )]
    PaginationDiverged {
        passes: usize,
        last_assumed: usize,
        last_measured: usize,
    },
    #[error("Page count of '{name}' changed from {before} to {after}")]
    PageCountChanged {
        name: String,
        before: usize,
        after: usize,
    },
    #[error("Project error: {0}")]
    Project(String),
    #[error("No main document")]
    NoMainDocument,
}

pub type Result<T> = std::result::Result<T, AppendixError>;

/// Labelling scheme for appendices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NumberingSystem {
    /// Hebrew letters: א, ב, ג ...
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "אבג (Hebrew)"))]
    Hebrew,
    /// Roman numerals: I, II, III ...
    #[cfg_attr(feature = "serde", serde(alias = "I II III (Roman)"))]
    Roman,
    /// Plain decimal: 1, 2, 3 ...
    #[cfg_attr(feature = "serde", serde(alias = "123 (Arabic)"))]
    Arabic,
}

/// Visual template for cover sheets and the table of contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Template {
    /// Bordered page with large centred text
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "קלאסי (Classic)"))]
    Classic,
    /// Dark banner across the top of the page
    #[cfg_attr(feature = "serde", serde(alias = "מודרני (Modern)"))]
    Modern,
    /// Bare centred text, no decoration
    #[cfg_attr(feature = "serde", serde(alias = "מינימלי (Minimal)"))]
    Minimal,
}

/// Settings that stay fixed for one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutSettings {
    pub numbering: NumberingSystem,
    pub template: Template,
    /// Stamp the appendix label on the first page of every appendix
    pub stamp_appendices: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            numbering: NumberingSystem::Hebrew,
            template: Template::Classic,
            stamp_appendices: true,
        }
    }
}

/// One row of the table of contents.
///
/// `start_page` is the page holding the appendix's cover sheet; the appendix
/// content runs from `start_page + 1` through `end_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub label: String,
    pub title: String,
    pub start_page: usize,
    pub end_page: usize,
}

impl TocEntry {
    /// Page of the generated cover sheet
    pub fn cover_page(&self) -> usize {
        self.start_page
    }

    /// First page of the appendix's own content, if it has any
    pub fn first_content_page(&self) -> Option<usize> {
        (self.end_page > self.start_page).then_some(self.start_page + 1)
    }
}

/// Title and page count of an appendix, all the pagination engine needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendixSummary {
    pub title: String,
    pub page_count: usize,
}

impl AppendixSummary {
    pub fn new(title: impl Into<String>, page_count: usize) -> Self {
        Self {
            title: title.into(),
            page_count,
        }
    }
}

/// RGB colour with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }
}
