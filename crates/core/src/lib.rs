//! Takeoff Core Library
//!
//! Session state for symbol takeoff on PDF drawings: a palette of marker
//! symbols, markers placed on document pages, derived counts and the CSV and
//! PNG exports of those counts. Rasterizing the PDF itself is left to the host.

pub mod annotation;
pub mod config;
pub mod coords;
pub mod csv_export;
pub mod error;
pub mod image_export;
pub mod input;
pub mod loader;
pub mod page_switch;
pub mod store;
pub mod summary;
pub mod symbol;
pub mod view;

pub use annotation::{Annotation, AnnotationCollection, AnnotationId, PageCoordinate, PageSymbolCount};
pub use config::{ConfigError, TakeoffConfig};
pub use coords::{marker_rect, to_document, to_rendered, MarkerRect, PageDimensions, ViewPoint};
pub use csv_export::{
    export_csv, export_file_name, export_page_counts_csv, export_totals_csv, write_csv_export,
    CsvExportError, CsvExportMode, CsvExportResult,
};
pub use error::{TakeoffError, TakeoffResult};
pub use image_export::{
    encode_summary, summary_file_name, write_summary_image, ImageExportError, ImageExportResult,
    SummaryRasterizer, SwatchRasterizer,
};
pub use input::ViewCommand;
pub use loader::{first_upload, validate_upload, DocumentUpload, LoadedDocument};
pub use page_switch::{PageLoadTracker, PageSwitchResult, RenderToken};
pub use store::{PendingRemoval, PlacedMarker, TakeoffSession};
pub use summary::{PageGroup, Summary, SummaryRow};
pub use symbol::{SizeLabel, Symbol, SymbolDraft, SymbolEdit, SymbolId, SymbolShape, DEFAULT_PALETTE};
pub use view::ViewState;
