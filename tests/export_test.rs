//! PDF/Excel report integration tests

use chrono::NaiveDate;
use distmap::cli::ExportFormat;
use distmap::export::{self, ReportOptions, PDF_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use distmap_common::{render, ClientRecord, GeoPoint, RenderOptions, RenderOutcome, RenderPass, ViewState};
use tempfile::tempdir;

fn create_record(index: usize, zone: &str) -> ClientRecord {
    ClientRecord {
        zone_code: zone.to_string(),
        zone_name: format!("Zona {}", zone),
        client_code: format!("C{:03}", index),
        client_name: format!("Cliente {}", index),
        pharmacy: format!("Botica {}", index),
        references: if index % 2 == 0 { "Frente al mercado".into() } else { String::new() },
        address: format!("Av. Principal {}", index * 10),
        position: GeoPoint::new(-12.0 - index as f64 * 0.002, -77.0 - index as f64 * 0.001),
    }
}

fn pass_with(count: usize, selected: &[usize]) -> RenderPass {
    let records: Vec<ClientRecord> = (1..=count).map(|i| create_record(i, "SU01")).collect();
    let mut state = ViewState::with_zones(["SU01"]);
    state.selected = selected.iter().copied().collect();

    match render(&records, &state, &RenderOptions::default()).expect("render failed") {
        RenderOutcome::Ready(pass) => pass,
        RenderOutcome::NoZoneSelected => panic!("expected a rendered pass"),
    }
}

fn options() -> ReportOptions {
    ReportOptions {
        title: "Ruta SU01".to_string(),
        map_title: "Mapa SU01".to_string(),
        maps_url_template: "https://www.google.com/maps/search/?api=1&query={lat},{lng}".into(),
        file_prefix: "seleccion_clientes".to_string(),
        map_width_px: 240,
        map_height_px: 120,
        generated_at: NaiveDate::from_ymd_opt(2025, 10, 19)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap(),
    }
}

#[test]
fn test_pdf_artifact() {
    let pass = pass_with(5, &[1, 3]);
    let artifacts = export::build_artifacts(&pass, &ExportFormat::Pdf, &options()).unwrap();

    assert_eq!(artifacts.len(), 1);
    let pdf = &artifacts[0];
    assert_eq!(pdf.file_name, "seleccion_clientes_20251019_143000.pdf");
    assert_eq!(pdf.content_type, PDF_CONTENT_TYPE);
    assert!(pdf.bytes.starts_with(b"%PDF"));
    assert_eq!(
        pdf.content_disposition(),
        "attachment; filename=\"seleccion_clientes_20251019_143000.pdf\""
    );
}

#[test]
fn test_pdf_links_match_selection() {
    let records: Vec<ClientRecord> = (1..=5)
        .map(|i| create_record(i, if i % 2 == 0 { "SU02" } else { "SU01" }))
        .collect();
    let mut state = ViewState::with_zones(["SU01", "SU02"]);
    state.selected = [2, 5].into_iter().collect();
    let pass = match render(&records, &state, &RenderOptions::default()).unwrap() {
        RenderOutcome::Ready(pass) => pass,
        RenderOutcome::NoZoneSelected => panic!("expected a rendered pass"),
    };

    let artifacts = export::build_artifacts(&pass, &ExportFormat::Pdf, &options()).unwrap();
    let text = String::from_utf8_lossy(&artifacts[0].bytes);

    // one link annotation per selected row
    assert_eq!(text.matches("/URI (").count(), 2);
    for record in [&records[1], &records[4]] {
        let query = format!("query={},{}", record.position.lat, record.position.lng);
        assert!(text.contains(&query), "missing link {}", query);
    }
    let unselected = format!("query={},", records[0].position.lat);
    assert!(!text.contains(&unselected));
}

#[test]
fn test_excel_artifact_is_zip() {
    let pass = pass_with(4, &[2]);
    let artifacts = export::build_artifacts(&pass, &ExportFormat::Excel, &options()).unwrap();

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].content_type, XLSX_CONTENT_TYPE);
    assert!(artifacts[0].file_name.ends_with(".xlsx"));
    assert!(artifacts[0].bytes.starts_with(b"PK"));
}

#[test]
fn test_both_formats_written() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pass = pass_with(3, &[1, 2, 3]);

    let written = export::export_selection(&pass, &ExportFormat::Both, dir.path(), &options()).unwrap();

    assert_eq!(written.len(), 2);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}

#[test]
fn test_empty_selection_still_exports() {
    // nothing selected: empty table, map of the whole view
    let pass = pass_with(3, &[]);
    let artifacts = export::build_artifacts(&pass, &ExportFormat::Pdf, &options()).unwrap();
    assert!(artifacts[0].bytes.starts_with(b"%PDF"));
}

#[test]
fn test_long_selection_spans_pages() {
    let selected: Vec<usize> = (1..=60).collect();
    let long = pass_with(60, &selected);
    let short = pass_with(60, &[1]);

    let long_pdf = export::build_artifacts(&long, &ExportFormat::Pdf, &options()).unwrap();
    let short_pdf = export::build_artifacts(&short, &ExportFormat::Pdf, &options()).unwrap();
    assert!(long_pdf[0].bytes.len() > short_pdf[0].bytes.len());
}

#[test]
fn test_invalid_map_size_fails_export() {
    let pass = pass_with(2, &[1]);
    let mut opts = options();
    opts.map_width_px = 0;

    let result = export::build_artifacts(&pass, &ExportFormat::Both, &opts);
    assert!(matches!(result, Err(distmap::error::DistMapError::MapRender(_))));
}
