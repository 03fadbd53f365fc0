//! Map view model
//!
//! Front-end independent description of the map: where it is centered, the
//! zoom it opens at, and one marker per active row. The HTML page and the
//! raster snapshot are both rendered from this.

use crate::error::{Error, Result};
use crate::selection::SelectionRow;
use crate::types::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Zoom level the map opens at
pub const DEFAULT_ZOOM: u8 = 12;

/// Marker colors available for zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Green,
    Blue,
    Purple,
    Orange,
    Gray,
}

impl MarkerColor {
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            MarkerColor::Red => [0xD6, 0x3E, 0x2A],
            MarkerColor::Green => [0x72, 0xAF, 0x26],
            MarkerColor::Blue => [0x38, 0xAA, 0xDD],
            MarkerColor::Purple => [0xD2, 0x52, 0xB9],
            MarkerColor::Orange => [0xF6, 0x97, 0x30],
            MarkerColor::Gray => [0x57, 0x57, 0x57],
        }
    }

    /// CSS hex form, e.g. `#d63e2a`
    pub fn css(&self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for MarkerColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(MarkerColor::Red),
            "green" => Ok(MarkerColor::Green),
            "blue" => Ok(MarkerColor::Blue),
            "purple" => Ok(MarkerColor::Purple),
            "orange" => Ok(MarkerColor::Orange),
            "gray" | "grey" => Ok(MarkerColor::Gray),
            _ => Err(Error::UnknownColor(s.to_string())),
        }
    }
}

impl std::fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MarkerColor::Red => "red",
            MarkerColor::Green => "green",
            MarkerColor::Blue => "blue",
            MarkerColor::Purple => "purple",
            MarkerColor::Orange => "orange",
            MarkerColor::Gray => "gray",
        };
        write!(f, "{}", name)
    }
}

/// Zone code → marker color. Zones without an entry are gray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZonePalette {
    colors: BTreeMap<String, MarkerColor>,
}

impl Default for ZonePalette {
    fn default() -> Self {
        let colors = [
            ("SU01", MarkerColor::Red),
            ("SU02", MarkerColor::Green),
            ("SU03", MarkerColor::Blue),
            ("SU04", MarkerColor::Purple),
            ("SU05", MarkerColor::Orange),
        ]
        .into_iter()
        .map(|(zone, color)| (zone.to_string(), color))
        .collect();

        Self { colors }
    }
}

impl ZonePalette {
    pub fn color_for(&self, zone_code: &str) -> MarkerColor {
        self.colors
            .get(zone_code)
            .copied()
            .unwrap_or(MarkerColor::Gray)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, MarkerColor)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Details shown when a marker is opened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPopup {
    pub pharmacy: String,
    pub zone_name: String,
    pub zone_code: String,
    pub client_code: String,
    pub client_name: String,
    pub references: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Display index shown inside the badge
    pub index: usize,
    pub position: GeoPoint,
    /// Tooltip text (pharmacy name)
    pub label: String,
    pub color: MarkerColor,
    pub popup: MarkerPopup,
}

impl Marker {
    fn from_row(row: &SelectionRow, palette: &ZonePalette) -> Self {
        let record = &row.record;
        Self {
            index: row.index,
            position: record.position,
            label: record.pharmacy.clone(),
            color: palette.color_for(&record.zone_code),
            popup: MarkerPopup {
                pharmacy: record.pharmacy.clone(),
                zone_name: record.zone_name.clone(),
                zone_code: record.zone_code.clone(),
                client_code: record.client_code.clone(),
                client_name: record.client_name.clone(),
                references: record.references.clone(),
                address: record.address.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

/// Arithmetic mean of latitudes and of longitudes. `None` for an empty set.
pub fn center_of<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let (count, lat_sum, lng_sum) = points
        .into_iter()
        .fold((0usize, 0.0f64, 0.0f64), |(n, lat, lng), p| {
            (n + 1, lat + p.lat, lng + p.lng)
        });

    if count == 0 {
        return None;
    }
    Some(GeoPoint::new(lat_sum / count as f64, lng_sum / count as f64))
}

impl MapView {
    /// Build the map for the active rows (selection, or the whole view as fallback).
    pub fn build(active_rows: &[&SelectionRow], zoom: u8, palette: &ZonePalette) -> Result<Self> {
        let center = center_of(active_rows.iter().map(|r| &r.record.position))
            .ok_or(Error::EmptyActiveSet)?;

        let markers = active_rows
            .iter()
            .map(|row| Marker::from_row(row, palette))
            .collect();

        Ok(Self {
            center,
            zoom,
            markers,
        })
    }

    /// South-west and north-east corners of the marker bounding box
    pub fn bounds(&self) -> Option<(GeoPoint, GeoPoint)> {
        let first = self.markers.first()?.position;
        let (sw, ne) = self.markers.iter().skip(1).fold((first, first), |(sw, ne), m| {
            (
                GeoPoint::new(sw.lat.min(m.position.lat), sw.lng.min(m.position.lng)),
                GeoPoint::new(ne.lat.max(m.position.lat), ne.lng.max(m.position.lng)),
            )
        });
        Some((sw, ne))
    }
}
