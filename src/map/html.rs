//! Interactive map page (Leaflet + OpenStreetMap tiles)

use crate::error::Result;
use distmap_common::map_view::MarkerPopup;
use distmap_common::MapView;
use serde::Serialize;
use std::path::Path;

const LEAFLET_VERSION: &str = "1.9.4";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.js"></script>
<style>
  html, body { margin: 0; height: 100%; font-family: sans-serif; }
  #map { height: 100%; }
  .badge {
    display: flex; align-items: center; justify-content: center;
    width: 26px; height: 26px; border-radius: 50%;
    border: 2px solid #fff; box-shadow: 0 0 3px rgba(0, 0, 0, 0.5);
    color: #fff; font-size: 12px; font-weight: bold;
  }
</style>
</head>
<body>
<div id="map"></div>
<script>
  var markers = __MARKERS__;
  var map = L.map('map').setView([__LAT__, __LNG__], __ZOOM__);
  L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
  }).addTo(map);
  markers.forEach(function (m) {
    var icon = L.divIcon({
      className: '',
      html: '<div class="badge" style="background:' + m.color + '">' + m.index + '</div>',
      iconSize: [30, 30],
      iconAnchor: [15, 15]
    });
    L.marker([m.lat, m.lng], { icon: icon })
      .bindTooltip(m.tooltip)
      .bindPopup(m.popup, { maxWidth: 300 })
      .addTo(map);
  });
</script>
</body>
</html>
"#;

#[derive(Serialize)]
struct PageMarker {
    index: usize,
    lat: f64,
    lng: f64,
    color: String,
    tooltip: String,
    popup: String,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Popup body listing the client details
pub fn popup_html(popup: &MarkerPopup) -> String {
    format!(
        "<b>Botica:</b> {}<br><b>Zona:</b> {} ({})<br><b>Cliente:</b> {} - {}<br>\
         <b>Referencias:</b> {}<br><b>Dirección:</b> {}",
        escape_html(&popup.pharmacy),
        escape_html(&popup.zone_name),
        escape_html(&popup.zone_code),
        escape_html(&popup.client_code),
        escape_html(&popup.client_name),
        escape_html(&popup.references),
        escape_html(&popup.address),
    )
}

pub fn render_html(view: &MapView, title: &str) -> Result<String> {
    let markers: Vec<PageMarker> = view
        .markers
        .iter()
        .map(|m| PageMarker {
            index: m.index,
            lat: m.position.lat,
            lng: m.position.lng,
            color: m.color.css(),
            tooltip: escape_html(&m.label),
            popup: popup_html(&m.popup),
        })
        .collect();

    // keep "</script>" in data from closing the script element
    let markers_json = serde_json::to_string(&markers)?.replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace("__TITLE__", &escape_html(title))
        .replace("__LEAFLET__", LEAFLET_VERSION)
        .replace("__LAT__", &view.center.lat.to_string())
        .replace("__LNG__", &view.center.lng.to_string())
        .replace("__ZOOM__", &view.zoom.to_string())
        .replace("__MARKERS__", &markers_json))
}

pub fn write_html(view: &MapView, title: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_html(view, title)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use distmap_common::{ClientRecord, GeoPoint, SelectionTable, ZonePalette};

    fn map_with(pharmacy: &str) -> MapView {
        let record = ClientRecord {
            zone_code: "SU02".into(),
            zone_name: "Sur".into(),
            client_code: "C010".into(),
            client_name: "Rosa Quispe".into(),
            pharmacy: pharmacy.into(),
            references: "Frente al colegio".into(),
            address: "Jr. Lima 450".into(),
            position: GeoPoint::new(-12.1, -77.02),
        };
        let table = SelectionTable::from_view(vec![record]).unwrap();
        MapView::build(&table.active_rows(), 12, &ZonePalette::default()).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & B <b>\"x\"</b>"), "A &amp; B &lt;b&gt;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_page_contains_view_settings() {
        let html = render_html(&map_with("Botica Salud"), "Zona Sur").unwrap();
        assert!(html.contains("<title>Zona Sur</title>"));
        assert!(html.contains("setView([-12.1, -77.02], 12)"));
        assert!(html.contains("Botica Salud"));
        assert!(html.contains("Frente al colegio"));
        assert!(!html.contains("__MARKERS__"));
    }

    #[test]
    fn test_marker_text_cannot_close_script() {
        let html = render_html(&map_with("</script><script>alert(1)</script>"), "t").unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_popup_lists_client() {
        let map = map_with("Botica Salud");
        let popup = popup_html(&map.markers[0].popup);
        assert!(popup.contains("C010 - Rosa Quispe"));
        assert!(popup.contains("Sur (SU02)"));
    }
}
