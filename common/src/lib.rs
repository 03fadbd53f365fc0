//! distmap common library
//!
//! I/O-free domain logic shared by the CLI and the interactive dashboard

pub mod dashboard;
pub mod error;
pub mod filter;
pub mod layout;
pub mod map_view;
pub mod report;
pub mod selection;
pub mod types;

pub use dashboard::{render, RenderOptions, RenderOutcome, RenderPass, ViewState};
pub use error::{Error, Result};
pub use filter::{available_pharmacies, available_zones, filter_by_pharmacies, filter_by_zones, zone_counts};
pub use layout::ReportLayout;
pub use map_view::{center_of, MapView, Marker, MarkerColor, ZonePalette, DEFAULT_ZOOM};
pub use report::{build_report_rows, maps_link, ReportRow};
pub use selection::{SelectionRow, SelectionTable, TableStatus};
pub use types::{ClientRecord, GeoPoint, RawClientRow};
