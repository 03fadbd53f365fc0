//! Map output
//!
//! - `html`: interactive Leaflet page
//! - `raster`: static PNG snapshot embedded in reports

pub mod html;
pub mod raster;

pub use html::{render_html, write_html};
pub use raster::{encode_png, rasterize, write_png, MapSnapshot};
