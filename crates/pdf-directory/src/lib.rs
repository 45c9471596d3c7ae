//! Printable directory booklets from spreadsheet rows.
//!
//! Each row becomes a card (text fields on one half, a photo on the other),
//! tiled several to a page, grouped into titled sections with an optional
//! contents listing.

mod document;
mod filter;
mod images;
mod layout;
mod navigation;
mod options;
mod plan;
mod records;
mod stats;
mod template;
mod text;
mod toc;
mod types;

pub use document::{generate_pdf, load_sections, render_pdf_bytes};
pub use filter::{FilterMode, RecordFilter};
pub use images::{ImageStore, LoadedImage, image_size, resolve_image};
pub use layout::*;
pub use navigation::{PageLink, add_navigation};
pub use options::*;
pub use plan::{DirectoryDocument, PageKind, PagePlan, PlannedItem, build_document};
pub use records::{InputKind, cell_text, load_records, sheet_names};
pub use stats::{calculate_statistics, item_page, section_start_pages};
pub use template::*;
pub use text::{FontBook, PlacedLine, ResolvedFont, TextBox, layout_text_box, trim_to_width, wrap_text};
pub use toc::*;
pub use types::*;
