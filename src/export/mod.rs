pub mod excel;
pub mod pdf;

use crate::cli::ExportFormat;
use crate::config::Config;
use crate::error::Result;
use crate::map::{self, MapSnapshot};
use chrono::{Local, NaiveDateTime};
use distmap_common::report::report_file_name;
use distmap_common::{build_report_rows, RenderPass, ReportRow};
use std::path::{Path, PathBuf};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A finished report held in memory, ready to download or write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// `Content-Disposition` value offering the artifact as a download
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub map_title: String,
    pub maps_url_template: String,
    pub file_prefix: String,
    pub map_width_px: u32,
    pub map_height_px: u32,
    pub generated_at: NaiveDateTime,
}

impl ReportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.report_title.clone(),
            map_title: config.map_title.clone(),
            maps_url_template: config.maps_url_template.clone(),
            file_prefix: config.file_prefix.clone(),
            map_width_px: config.map_width_px,
            map_height_px: config.map_height_px,
            generated_at: Local::now().naive_local(),
        }
    }

    fn file_name(&self, extension: &str) -> String {
        let stamp = self.generated_at.format("%Y%m%d_%H%M%S").to_string();
        report_file_name(&self.file_prefix, &stamp, extension)
    }
}

/// Selected rows plus the rendered map: the input of every report format
pub struct ReportContent {
    pub rows: Vec<ReportRow>,
    pub snapshot: MapSnapshot,
    pub map_png: Vec<u8>,
}

impl ReportContent {
    /// Rows come from the selected sub-collection only; the map is the pass's
    /// current map, so it shows the whole view when nothing is selected.
    pub fn from_pass(pass: &RenderPass, options: &ReportOptions) -> Result<Self> {
        let selected = pass.table.selected();
        if selected.is_empty() {
            tracing::warn!("Ninguna fila seleccionada, la tabla del reporte quedará vacía");
        }

        let rows = build_report_rows(&selected, &options.maps_url_template);
        let snapshot = map::rasterize(&pass.map, options.map_width_px, options.map_height_px)?;
        let map_png = map::encode_png(&snapshot.image)?;

        Ok(Self {
            rows,
            snapshot,
            map_png,
        })
    }
}

/// Build every requested artifact. Nothing is written; a failure in any
/// format fails the whole export.
pub fn build_artifacts(
    pass: &RenderPass,
    format: &ExportFormat,
    options: &ReportOptions,
) -> Result<Vec<ExportArtifact>> {
    let content = ReportContent::from_pass(pass, options)?;
    let mut artifacts = Vec::new();

    if format.includes_pdf() {
        artifacts.push(ExportArtifact {
            file_name: options.file_name("pdf"),
            content_type: PDF_CONTENT_TYPE,
            bytes: pdf::build_pdf(&content, options)?,
        });
    }
    if format.includes_excel() {
        artifacts.push(ExportArtifact {
            file_name: options.file_name("xlsx"),
            content_type: XLSX_CONTENT_TYPE,
            bytes: excel::build_excel(&content, options)?,
        });
    }

    Ok(artifacts)
}

pub fn export_selection(
    pass: &RenderPass,
    format: &ExportFormat,
    output_dir: &Path,
    options: &ReportOptions,
) -> Result<Vec<PathBuf>> {
    println!("- Generando reporte ({})...", format);
    let artifacts = build_artifacts(pass, format, options)?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = artifact.write_to(output_dir)?;
        tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "Reporte escrito");
        println!("✔ {}", path.display());
        written.push(path);
    }

    Ok(written)
}
