//! MyMaps export conversion
//!
//! Turns a Google MyMaps CSV export (`WKT, nombre, descripción`) into the
//! cleaned dataset read by the loader. The original file is backed up first.

use crate::error::{DistMapError, Result};
use chrono::{Local, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fields carried by a standardized description, in order
pub const DESCRIPTION_FIELDS: usize = 5;
/// Filler for description fields that are absent
pub const MISSING_FIELD: &str = "x";
/// Backup folder created next to the cleaned dataset
pub const BACKUP_DIR_NAME: &str = "data_originales";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const WKT_SAMPLE_SIZE: usize = 5;

lazy_static! {
    static ref WKT_POINT: Regex =
        Regex::new(r"POINT\s*\(\s*([\-0-9]+(?:\.[0-9]+)?)\s+([\-0-9]+(?:\.[0-9]+)?)\s*\)")
            .expect("valid regex");
    static ref DASH_SEPARATOR: Regex = Regex::new(r"\s*[-–—]\s*").expect("valid regex");
}

/// One row of the cleaned dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRow {
    #[serde(rename = "CodigoZona")]
    pub zone_code: String,
    #[serde(rename = "ZonaNombre")]
    pub zone_name: String,
    #[serde(rename = "CodigoCliente")]
    pub client_code: String,
    #[serde(rename = "NombreCliente")]
    pub client_name: String,
    #[serde(rename = "Botica")]
    pub pharmacy: String,
    #[serde(rename = "Referencias")]
    pub references: String,
    #[serde(rename = "Direccion")]
    pub address: String,
    #[serde(rename = "Lat")]
    pub lat: Option<f64>,
    #[serde(rename = "Lng")]
    pub lng: Option<f64>,
    #[serde(rename = "DescripcionOriginal")]
    pub original_description: String,
}

/// Columns found in the export header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    pub wkt: usize,
    pub name: Option<usize>,
    pub description: Option<usize>,
    pub address: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub rows: usize,
    pub missing_coordinates: usize,
    pub output: PathBuf,
    pub backup: PathBuf,
}

/// Decode file bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Repair UTF-8 text that was decoded as Latin-1 (`descripciÃ³n` → `descripción`).
///
/// Text without the telltale `Ã`/`Â`, or that does not round-trip, is returned unchanged.
pub fn fix_mojibake(text: &str) -> String {
    if !text.contains('Ã') && !text.contains('Â') {
        return text.to_string();
    }

    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if code > 0xFF {
            return text.to_string();
        }
        bytes.push(code as u8);
    }

    String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
}

/// `POINT (lon lat)` → (lat, lng)
pub fn parse_wkt_point(value: &str) -> Option<(f64, f64)> {
    let value = value.trim().trim_matches('"').trim_matches('\'');
    let caps = WKT_POINT.captures(value)?;
    let lng: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lat: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some((lat, lng))
}

/// Split `Zone - ZoneName - ClientCode - ClientName - References`.
///
/// Any dash variant works as separator. Extra parts are folded into the last
/// field; missing ones become `x`.
pub fn split_description(description: &str) -> [String; DESCRIPTION_FIELDS] {
    let mut fields: [String; DESCRIPTION_FIELDS] = Default::default();

    let description = fix_mojibake(description);
    if description.trim().is_empty() {
        fields.iter_mut().for_each(|f| *f = MISSING_FIELD.to_string());
        return fields;
    }

    let normalized = DASH_SEPARATOR.replace_all(description.trim(), " - ");
    let mut parts: Vec<String> = normalized.split(" - ").map(|p| p.trim().to_string()).collect();
    if parts.len() > DESCRIPTION_FIELDS {
        let rest = parts.split_off(DESCRIPTION_FIELDS - 1);
        parts.push(rest.join(" - "));
    }

    for (i, field) in fields.iter_mut().enumerate() {
        *field = parts.get(i).cloned().unwrap_or_else(|| MISSING_FIELD.to_string());
    }
    fields
}

/// Locate the WKT, name, description and address columns
pub fn detect_columns(headers: &[String], records: &[csv::StringRecord]) -> Result<SourceColumns> {
    let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let wkt = lower
        .iter()
        .position(|h| h.contains("wkt") || h.contains("point") || h.contains("geometry"))
        .or_else(|| {
            (0..headers.len()).find(|&col| {
                records
                    .iter()
                    .filter_map(|r| r.get(col))
                    .filter(|v| !v.trim().is_empty())
                    .take(WKT_SAMPLE_SIZE)
                    .any(|v| v.trim().to_uppercase().starts_with("POINT"))
            })
        })
        .ok_or_else(|| {
            DistMapError::Conversion(format!(
                "no se encontró una columna WKT/POINT. Columnas: {}",
                headers.join(", ")
            ))
        })?;

    let name = lower
        .iter()
        .position(|h| matches!(h.as_str(), "nombre" | "name" | "title" | "placename"))
        .or_else(|| (0..headers.len()).find(|&col| col != wkt));

    let description = lower.iter().position(|h| h.contains("desc"));

    let address = lower
        .iter()
        .position(|h| matches!(h.as_str(), "direccion" | "dirección" | "address" | "addr" | "street"));

    Ok(SourceColumns {
        wkt,
        name,
        description,
        address,
    })
}

/// Convert export text into cleaned rows
pub fn convert_text(content: &str) -> Result<Vec<CleanRow>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let columns = detect_columns(&headers, &records)?;
    if columns.description.is_none() {
        tracing::warn!("No se encontró la columna de descripción, los campos del cliente se llenarán con 'x'");
    }

    let progress = ProgressBar::new(records.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} filas")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let cell = |record: &csv::StringRecord, col: Option<usize>| -> String {
        col.and_then(|c| record.get(c)).unwrap_or_default().to_string()
    };

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let (lat, lng) = match parse_wkt_point(&cell(record, Some(columns.wkt))) {
            Some((lat, lng)) => (Some(lat), Some(lng)),
            None => (None, None),
        };

        let description = fix_mojibake(&cell(record, columns.description));
        let [zone_code, zone_name, client_code, client_name, references] =
            split_description(&description);

        rows.push(CleanRow {
            zone_code,
            zone_name,
            client_code,
            client_name,
            pharmacy: fix_mojibake(&cell(record, columns.name)).trim().to_string(),
            references,
            address: cell(record, columns.address),
            lat,
            lng,
            original_description: description,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(rows)
}

/// Write rows as UTF-8 CSV with a BOM
pub fn write_clean_csv(path: &Path, rows: &[CleanRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Copy the export to `backup_dir/clientes_original_<stamp>.csv`
pub fn backup_input(input: &Path, backup_dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    std::fs::create_dir_all(backup_dir)?;
    let backup = backup_dir.join(format!(
        "clientes_original_{}.csv",
        now.format("%Y%m%d_%H%M%S")
    ));
    std::fs::copy(input, &backup)?;
    Ok(backup)
}

/// Back up `input`, convert it and write the cleaned dataset to `output`.
///
/// `backup_dir` defaults to `data_originales/` next to `output`.
pub fn convert_file(input: &Path, output: &Path, backup_dir: Option<&Path>) -> Result<ConversionSummary> {
    if !input.exists() {
        return Err(DistMapError::FileNotFound(input.display().to_string()));
    }

    let backup_dir = match backup_dir {
        Some(dir) => dir.to_path_buf(),
        None => output
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(BACKUP_DIR_NAME),
    };
    let backup = backup_input(input, &backup_dir, Local::now().naive_local())?;
    tracing::info!(backup = %backup.display(), "Respaldo de la exportación de MyMaps creado");

    let bytes = std::fs::read(input)?;
    let rows = convert_text(&decode_text(&bytes))?;
    write_clean_csv(output, &rows)?;

    let missing_coordinates = rows.iter().filter(|r| r.lat.is_none()).count();
    tracing::info!(
        rows = rows.len(),
        missing_coordinates,
        output = %output.display(),
        "Dataset limpio escrito"
    );

    Ok(ConversionSummary {
        rows: rows.len(),
        missing_coordinates,
        output: output.to_path_buf(),
        backup,
    })
}
