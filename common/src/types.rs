//! Client record types
//!
//! - `RawClientRow`: one row of the cleaned dataset exactly as stored
//!   (`CodigoZona,ZonaNombre,...,Lat,Lng`), coordinates optional
//! - `ClientRecord`: a validated row; both coordinates are always present

use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Dataset row as read from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawClientRow {
    #[serde(rename = "CodigoZona", default)]
    pub zone_code: String,

    #[serde(rename = "ZonaNombre", default)]
    pub zone_name: String,

    #[serde(rename = "CodigoCliente", default)]
    pub client_code: String,

    #[serde(rename = "NombreCliente", default)]
    pub client_name: String,

    /// Pharmacy ("Botica") name, used as the marker label
    #[serde(rename = "Botica", default)]
    pub pharmacy: String,

    #[serde(rename = "Referencias", default)]
    pub references: String,

    #[serde(rename = "Direccion", default)]
    pub address: String,

    #[serde(rename = "Lat", default)]
    pub lat: Option<f64>,

    #[serde(rename = "Lng", default)]
    pub lng: Option<f64>,
}

impl RawClientRow {
    /// Validate the row. Rows without a usable latitude/longitude pair yield `None`.
    pub fn into_record(self) -> Option<ClientRecord> {
        let lat = self.lat.filter(|v| v.is_finite())?;
        let lng = self.lng.filter(|v| v.is_finite())?;

        Some(ClientRecord {
            zone_code: self.zone_code.trim().to_string(),
            zone_name: self.zone_name,
            client_code: self.client_code,
            client_name: self.client_name,
            pharmacy: self.pharmacy,
            references: self.references,
            address: self.address,
            position: GeoPoint::new(lat, lng),
        })
    }
}

/// Client record (immutable after load)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub zone_code: String,
    pub zone_name: String,
    pub client_code: String,
    pub client_name: String,
    pub pharmacy: String,
    pub references: String,
    pub address: String,
    pub position: GeoPoint,
}
