//! Appendix bundles for legal filings
//!
//! A bundle is a main document followed by a table of contents and a series
//! of appendices, each introduced by a generated cover sheet and optionally
//! stamped with its label. Every page of the result carries a running page
//! number, and the table of contents lists the exact pages each appendix
//! occupies.

pub mod assemble;
pub mod bidi;
pub mod canvas;
pub mod constants;
pub mod cover;
pub mod fonts;
mod generate;
pub mod io;
pub mod numbering;
pub mod overlay;
pub mod paginate;
#[cfg(feature = "serde")]
pub mod project;
pub mod raster;
pub mod toc;
mod types;

pub use bidi::{shape, Shaper, ShapingMode};
pub use fonts::{FontFace, FontSet, FontStyle};
pub use generate::{build_bundle, generate, generate_sync, generate_with, Appendix, GenerationJob};
pub use io::{load_source, load_sources, save_pdf, SourceDocument};
pub use numbering::format_label;
pub use overlay::{place, Corner, OverlayPlacement, PageFrame, PageRotation};
pub use paginate::{compute_entries, plan, PaginationPlan};
#[cfg(feature = "serde")]
pub use project::ProjectFile;
pub use types::*;
