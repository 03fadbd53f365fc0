//! MyMaps export → cleaned dataset → dashboard pass → report

use chrono::Local;
use distmap::cli::ExportFormat;
use distmap::export::{self, ReportOptions};
use distmap::{convert, loader, map, view};
use distmap_common::{RenderOptions, RenderOutcome, TableStatus, ViewState};
use tempfile::tempdir;

const MYMAPS_EXPORT: &str = "WKT,nombre,descripción\n\
\"POINT (-77.0428 -12.0464)\",Botica San José,SU01 - Norte - C001 - Juan Pérez - Frente al parque\n\
\"POINT (-77.0300 -12.0500)\",Botica Salud,SU01 – Norte – C002 – María López – Esquina\n\
\"POINT (-77.0100 -12.1000)\",Botica Vida,SU02 - Sur - C003 - Ana Díaz\n\
,Botica Sin Punto,SU02 - Sur - C004 - Luis Rojas - x\n\
\"POINT (-76.9900 -12.1200)\",Botica Central,SU02 - Sur - C005 - Rosa Quispe - Mercado - puesto 4\n";

#[test]
fn test_convert_then_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("MAPA CLIENTES.csv");
    let output = dir.path().join("data").join("clientes.csv");
    std::fs::write(&input, MYMAPS_EXPORT).unwrap();

    let summary = convert::convert_file(&input, &output, None).unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.missing_coordinates, 1);
    assert!(summary.backup.starts_with(dir.path().join("data").join("data_originales")));
    assert!(summary
        .backup
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("clientes_original_")));

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "cleaned CSV should carry a BOM");
    let header = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(header.starts_with(
        "CodigoZona,ZonaNombre,CodigoCliente,NombreCliente,Botica,Referencias,Direccion,Lat,Lng,DescripcionOriginal"
    ));

    let dataset = loader::load_dataset(&output).unwrap();
    assert_eq!(dataset.records.len(), 4);
    assert_eq!(dataset.dropped, 1);

    let central = dataset
        .records
        .iter()
        .find(|r| r.client_code == "C005")
        .unwrap();
    assert_eq!(central.references, "Mercado - puesto 4");
    assert_eq!(central.pharmacy, "Botica Central");
    assert!((central.position.lat - (-12.12)).abs() < 1e-9);
}

#[test]
fn test_dashboard_pass_to_reports() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("export.csv");
    let output = dir.path().join("clientes.csv");
    std::fs::write(&input, MYMAPS_EXPORT).unwrap();
    convert::convert_file(&input, &output, Some(&dir.path().join("backups"))).unwrap();

    let dataset = loader::load_dataset(&output).unwrap();
    let options = RenderOptions::default();

    // nothing selected yet: the map covers the whole view
    let state = ViewState::with_zones(["SU02"]);
    let RenderOutcome::Ready(pass) = view::render_view(&dataset.records, &state, false, &options).unwrap() else {
        panic!("expected SU02 rows");
    };
    assert_eq!(pass.table.len(), 2);
    assert_eq!(pass.status, TableStatus::NoRowsSelected);
    assert_eq!(pass.map.markers.len(), 2);

    // select one row across both zones
    let mut state = ViewState::with_zones(["SU01", "SU02"]);
    state.selected.insert(2);
    let RenderOutcome::Ready(pass) = view::render_view(&dataset.records, &state, false, &options).unwrap() else {
        panic!("expected rows");
    };
    assert_eq!(pass.status, TableStatus::RowsSelected(1));
    assert_eq!(pass.map.markers.len(), 1);
    assert_eq!(pass.map.markers[0].index, 2);

    let html = map::render_html(&pass.map, "Mapa").unwrap();
    assert!(html.contains("Botica Salud"));

    let report_options = ReportOptions {
        title: "Seleccion".into(),
        map_title: "Mapa".into(),
        maps_url_template: "https://www.google.com/maps/search/?api=1&query={lat},{lng}".into(),
        file_prefix: "seleccion_clientes".into(),
        map_width_px: 320,
        map_height_px: 160,
        generated_at: Local::now().naive_local(),
    };
    let reports_dir = dir.path().join("reports");
    let written =
        export::export_selection(&pass, &ExportFormat::Both, &reports_dir, &report_options).unwrap();
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|p| p.starts_with(&reports_dir)));
}

#[test]
fn test_unknown_zone_is_no_zone_selected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("export.csv");
    let output = dir.path().join("clientes.csv");
    std::fs::write(&input, MYMAPS_EXPORT).unwrap();
    convert::convert_file(&input, &output, None).unwrap();

    let dataset = loader::load_dataset(&output).unwrap();
    let state = ViewState::with_zones(["SU09"]);
    let outcome = view::render_view(&dataset.records, &state, true, &RenderOptions::default()).unwrap();
    assert!(matches!(outcome, RenderOutcome::NoZoneSelected));
}
