//! Report rows shared by the PDF and Excel exporters

use crate::layout::{ReportColumn, MAPS_LINK_TEXT, REPORT_COLUMNS};
use crate::selection::SelectionRow;
use crate::types::GeoPoint;
use serde::Serialize;

/// Coordinate lookup URL; `{lat}` and `{lng}` are substituted
pub const DEFAULT_MAPS_URL_TEMPLATE: &str =
    "https://www.google.com/maps/search/?api=1&query={lat},{lng}";

/// Default file name prefix for exported reports
pub const DEFAULT_FILE_PREFIX: &str = "seleccion_clientes";

/// Build the external map link for a coordinate pair.
///
/// Coordinates are written with `f64`'s shortest round-trip form, so the link
/// points at exactly the stored position.
pub fn maps_link(template: &str, position: GeoPoint) -> String {
    template
        .replace("{lat}", &position.lat.to_string())
        .replace("{lng}", &position.lng.to_string())
}

/// One table row of the exported report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub index: usize,
    pub zone_code: String,
    pub zone_name: String,
    pub client_code: String,
    pub client_name: String,
    pub pharmacy: String,
    pub references: String,
    pub address: String,
    pub position: GeoPoint,
    pub maps_link: String,
}

impl ReportRow {
    pub fn from_selection(row: &SelectionRow, url_template: &str) -> Self {
        let record = &row.record;
        Self {
            index: row.index,
            zone_code: record.zone_code.clone(),
            zone_name: record.zone_name.clone(),
            client_code: record.client_code.clone(),
            client_name: record.client_name.clone(),
            pharmacy: record.pharmacy.clone(),
            references: record.references.clone(),
            address: record.address.clone(),
            position: record.position,
            maps_link: maps_link(url_template, record.position),
        }
    }

    /// Display text for a column
    pub fn cell_text(&self, column: ReportColumn) -> String {
        let text = match column {
            ReportColumn::Index => return self.index.to_string(),
            ReportColumn::Zone => &self.zone_code,
            ReportColumn::ClientName => &self.client_name,
            ReportColumn::Pharmacy => &self.pharmacy,
            ReportColumn::References => &self.references,
            ReportColumn::MapsLink => return MAPS_LINK_TEXT.to_string(),
        };
        if text.trim().is_empty() {
            "-".to_string()
        } else {
            text.trim().to_string()
        }
    }

    /// Cells in `REPORT_COLUMNS` order
    pub fn cells(&self) -> Vec<String> {
        REPORT_COLUMNS.iter().map(|c| self.cell_text(c.column)).collect()
    }
}

/// Report rows for the selected sub-collection, in display order
pub fn build_report_rows(selected: &[&SelectionRow], url_template: &str) -> Vec<ReportRow> {
    selected
        .iter()
        .map(|row| ReportRow::from_selection(row, url_template))
        .collect()
}

/// Shorten text to `max_chars`, marking the cut with "..."
pub fn fit_text(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut fitted: String = text.chars().take(max_chars - 3).collect();
    fitted.push_str("...");
    fitted
}

/// `{prefix}_{stamp}.{extension}`, e.g. `seleccion_clientes_20251019_143000.pdf`
pub fn report_file_name(prefix: &str, stamp: &str, extension: &str) -> String {
    format!("{}_{}.{}", prefix, stamp, extension)
}
