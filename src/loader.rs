//! Dataset loading
//!
//! Reads the cleaned client dataset (CSV, or the first sheet of a
//! spreadsheet), drops rows without coordinates, and keeps a process-wide
//! read-only copy for the rest of the run.

use crate::convert::decode_text;
use crate::error::{DistMapError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use distmap_common::{ClientRecord, RawClientRow};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static DATASET: OnceLock<Dataset> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ClientRecord>,
    /// Rows removed because a coordinate was missing
    pub dropped: usize,
    pub source: PathBuf,
}

impl Dataset {
    pub fn from_rows(rows: Vec<RawClientRow>, source: &Path) -> Self {
        let total = rows.len();
        let records: Vec<ClientRecord> = rows
            .into_iter()
            .filter_map(RawClientRow::into_record)
            .collect();
        let dropped = total - records.len();

        tracing::info!(
            source = %source.display(),
            records = records.len(),
            dropped,
            "Dataset de clientes cargado"
        );

        Self {
            records,
            dropped,
            source: source.to_path_buf(),
        }
    }
}

/// Dataset shared for the lifetime of the process.
///
/// The first call loads `path`; later calls return that same dataset.
pub fn cached_dataset(path: &Path) -> Result<&'static Dataset> {
    if let Some(dataset) = DATASET.get() {
        if dataset.source != path {
            tracing::warn!(
                cached = %dataset.source.display(),
                requested = %path.display(),
                "El dataset ya está cargado, se ignora la nueva ruta"
            );
        }
        return Ok(dataset);
    }

    let dataset = load_dataset(path)?;
    Ok(DATASET.get_or_init(|| dataset))
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(DistMapError::DatasetNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" | "txt" => {
            let bytes = std::fs::read(path)?;
            parse_csv(&decode_text(&bytes))?
        }
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path)?,
        other => return Err(DistMapError::UnsupportedFormat(other.to_string())),
    };

    Ok(Dataset::from_rows(rows, path))
}

/// Parse CSV text with a header row. A leading BOM is ignored.
pub fn parse_csv(content: &str) -> Result<Vec<RawClientRow>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .deserialize::<RawClientRow>()
        .enumerate()
        .map(|(i, row)| {
            // +2: header line and 1-based numbering
            row.map_err(|e| DistMapError::DatasetParse(format!("fila {}: {}", i + 2, e)))
        })
        .collect()
}

/// Header positions of the known columns in a worksheet
struct SheetColumns {
    zone_code: Option<usize>,
    zone_name: Option<usize>,
    client_code: Option<usize>,
    client_name: Option<usize>,
    pharmacy: Option<usize>,
    references: Option<usize>,
    address: Option<usize>,
    lat: Option<usize>,
    lng: Option<usize>,
}

impl SheetColumns {
    fn from_header(header: &[Data]) -> Self {
        let names: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();
        let find = |name: &str| names.iter().position(|n| n == name);

        Self {
            zone_code: find("CodigoZona"),
            zone_name: find("ZonaNombre"),
            client_code: find("CodigoCliente"),
            client_name: find("NombreCliente"),
            pharmacy: find("Botica"),
            references: find("Referencias"),
            address: find("Direccion"),
            lat: find("Lat"),
            lng: find("Lng"),
        }
    }
}

fn read_spreadsheet(path: &Path) -> Result<Vec<RawClientRow>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DistMapError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DistMapError::Spreadsheet("el libro no tiene hojas".into()))?
        .map_err(|e| DistMapError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = SheetColumns::from_header(header);

    rows.enumerate()
        .map(|(i, row)| sheet_row(row, &columns, i + 2))
        .collect()
}

fn sheet_row(row: &[Data], columns: &SheetColumns, line: usize) -> Result<RawClientRow> {
    let text = |col: Option<usize>| -> String {
        match col.and_then(|c| row.get(c)) {
            None | Some(Data::Empty) => String::new(),
            Some(cell) => cell.to_string().trim().to_string(),
        }
    };

    Ok(RawClientRow {
        zone_code: text(columns.zone_code),
        zone_name: text(columns.zone_name),
        client_code: text(columns.client_code),
        client_name: text(columns.client_name),
        pharmacy: text(columns.pharmacy),
        references: text(columns.references),
        address: text(columns.address),
        lat: coordinate(columns.lat.and_then(|c| row.get(c)), "Lat", line)?,
        lng: coordinate(columns.lng.and_then(|c| row.get(c)), "Lng", line)?,
    })
}

fn coordinate(cell: Option<&Data>, column: &str, line: usize) -> Result<Option<f64>> {
    match cell {
        None | Some(Data::Empty) => Ok(None),
        Some(Data::Float(v)) => Ok(Some(*v)),
        Some(Data::Int(v)) => Ok(Some(*v as f64)),
        Some(Data::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Data::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            DistMapError::DatasetParse(format!("fila {}: {} no es un número: {:?}", line, column, s))
        }),
        Some(other) => Err(DistMapError::DatasetParse(format!(
            "fila {}: {} no es un número: {}",
            line, column, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}CodigoZona,ZonaNombre,CodigoCliente,NombreCliente,Botica,Referencias,Direccion,Lat,Lng,DescripcionOriginal
SU01,Norte,C001,Juan Perez,Botica San Jose,Frente al mercado,Av. Peru 123,-12.046374,-77.042793,x
SU02,Sur,C002,Maria Lopez,Botica Salud,,,,-77.01,x
SU01,Norte,C003,Ana Diaz,Botica Vida,Esquina,, -12.05 , -77.05 ,x
";

    #[test]
    fn test_parse_csv_with_bom_and_blanks() {
        let rows = parse_csv(SAMPLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].zone_code, "SU01");
        assert_eq!(rows[0].lat, Some(-12.046374));
        assert_eq!(rows[1].lat, None);
        assert_eq!(rows[1].references, "");
        assert_eq!(rows[2].lng, Some(-77.05));
    }

    #[test]
    fn test_from_rows_drops_missing_coordinates() {
        let rows = parse_csv(SAMPLE).unwrap();
        let dataset = Dataset::from_rows(rows, Path::new("clientes.csv"));
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.dropped, 1);
        assert!(dataset.records.iter().all(|r| r.zone_code == "SU01"));
    }

    #[test]
    fn test_non_numeric_coordinate_is_error() {
        let csv = "CodigoZona,Botica,Lat,Lng\nSU01,Botica A,abc,-77.0\n";
        let err = parse_csv(csv).unwrap_err();
        match err {
            DistMapError::DatasetParse(msg) => assert!(msg.contains("fila 2")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_default_to_empty() {
        let csv = "CodigoZona,Lat,Lng\nSU03,-12.0,-77.0\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows[0].pharmacy, "");
        assert!(rows[0].clone().into_record().is_some());
    }

    #[test]
    fn test_spreadsheet_coordinates() {
        assert_eq!(coordinate(Some(&Data::Float(-12.5)), "Lat", 2).unwrap(), Some(-12.5));
        assert_eq!(coordinate(Some(&Data::Int(-77)), "Lng", 2).unwrap(), Some(-77.0));
        assert_eq!(coordinate(Some(&Data::String(" ".into())), "Lat", 2).unwrap(), None);
        assert_eq!(coordinate(None, "Lat", 2).unwrap(), None);
        assert!(coordinate(Some(&Data::String("n/a".into())), "Lat", 3).is_err());
    }
}
