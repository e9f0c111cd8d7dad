//! Shared constants for bundle generation
//!
//! This module centralizes page geometry, font sizes, colours and the fixed
//! captions printed on generated pages.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

// =============================================================================
// Page Dimensions
// =============================================================================

/// A4 width in points (210mm)
pub const A4_WIDTH_PT: f32 = 210.0 * POINTS_PER_MM;

/// A4 height in points (297mm)
pub const A4_HEIGHT_PT: f32 = 297.0 * POINTS_PER_MM;

/// MediaBox used when a page carries none (US Letter)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

/// Margin around raster images placed on a page
pub const IMAGE_MARGIN_PT: f32 = 0.5 * POINTS_PER_INCH;

// =============================================================================
// Table of Contents
// =============================================================================

pub const TOC_MARGIN: f32 = POINTS_PER_INCH;
pub const TOC_TITLE_SIZE: f32 = 22.0;
pub const TOC_HEADER_SIZE: f32 = 14.0;
pub const TOC_BODY_SIZE: f32 = 14.0;
pub const TOC_LINE_HEIGHT: f32 = 35.0;
pub const TOC_SEPARATOR_WIDTH: f32 = 0.5;

/// A row starting below `TOC_MARGIN + TOC_BOTTOM_RESERVE` moves to a new page
pub const TOC_BOTTOM_RESERVE: f32 = 50.0;

/// Minimum clear space between the dot leader and either text field
pub const LEADER_GAP: f32 = 15.0;

/// Horizontal distance between consecutive leader dots
pub const LEADER_STEP: f32 = 6.0;

// =============================================================================
// Cover Sheets
// =============================================================================

/// Height of the banner on modern cover sheets
pub const BANNER_HEIGHT: f32 = 180.0;

/// Inset of the border on classic cover sheets
pub const CLASSIC_BORDER_INSET: f32 = 50.0;
pub const CLASSIC_BORDER_WIDTH: f32 = 2.0;

// =============================================================================
// Overlays
// =============================================================================

/// Appendix stamp box (width, height) in points
pub const STAMP_BOX: (f32, f32) = (70.0, 30.0);
pub const STAMP_INSET: f32 = 15.0;
pub const STAMP_CORNER_RADIUS: f32 = 4.0;
pub const STAMP_FONT_SIZE: f32 = 12.0;
pub const STAMP_BASELINE: f32 = 10.0;

/// Page number placement from the visual bottom-left corner
pub const PAGE_NUMBER_INSET: (f32, f32) = (30.0, 25.0);
pub const PAGE_NUMBER_FONT_SIZE: f32 = 14.0;

// =============================================================================
// Colours
// =============================================================================

pub const BANNER_COLOR: u32 = 0x2C3E50;
pub const STAMP_FILL_COLOR: u32 = 0xF5F5F5;
pub const LEADER_GRAY: f32 = 0.5;

// =============================================================================
// Bezier Curve Constants
// =============================================================================

/// Control point factor for approximating quarter circles with Bezier curves:
/// 4 * (sqrt(2) - 1) / 3
pub const BEZIER_CIRCLE_FACTOR: f32 = 0.552284749831;

// =============================================================================
// Captions
// =============================================================================

/// "Appendix"
pub const APPENDIX_WORD: &str = "נספח";

/// "Pages"
pub const PAGES_WORD: &str = "עמודים";

/// "List of appendices to the claim"
pub const TOC_TITLE: &str = "רשימת נספחים לתביעה";

/// "Document name"
pub const TOC_NAME_HEADER: &str = "שם מסמך";

// =============================================================================
// Pagination
// =============================================================================

/// Table of contents length assumed by the draft pass
pub const DRAFT_TOC_PAGES: usize = 1;

/// Upper bound on layout passes after the draft
pub const MAX_PAGINATION_PASSES: usize = 4;
