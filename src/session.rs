//! Interactive dashboard session
//!
//! Every command changes the view state and the whole pass is rendered again:
//! zones → pharmacies → table → map.

use crate::cli::ExportFormat;
use crate::config::Config;
use crate::error::{DistMapError, Result};
use crate::export::{self, ReportOptions};
use crate::loader::Dataset;
use crate::map;
use crate::view::{format_table, status_line};
use dialoguer::{Input, MultiSelect};
use distmap_common::{
    available_pharmacies, filter_by_zones, render, zone_counts, RenderOutcome, RenderPass,
    ViewState,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    /// Choose zones
    Zones,
    /// Narrow to pharmacies
    Pharmacies,
    /// Pick rows from the grid
    Rows,
    /// Flip the selection of these display indices
    Toggle(Vec<usize>),
    SelectAll,
    Clear,
    /// Write the map as HTML and PNG
    Map,
    Export(ExportFormat),
    /// Print the table again
    Show,
    Quit,
}

const HELP: &str = "Comandos: [z]onas [b]oticas filas [r] [1,3,5] marcar filas [a] todas [c] limpiar [m]apa [e]xportar (pdf/excel/both) [q] salir";

/// Parse one command line. `None` for anything unrecognised.
pub fn parse_action(input: &str) -> Option<DashboardAction> {
    let input = input.trim();
    let (command, argument) = match input.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (input, ""),
    };

    match command {
        "" | "v" => Some(DashboardAction::Show),
        "z" => Some(DashboardAction::Zones),
        "b" => Some(DashboardAction::Pharmacies),
        "r" => Some(DashboardAction::Rows),
        "a" => Some(DashboardAction::SelectAll),
        "c" => Some(DashboardAction::Clear),
        "m" => Some(DashboardAction::Map),
        "q" | "Q" => Some(DashboardAction::Quit),
        "e" if argument.is_empty() => Some(DashboardAction::Export(ExportFormat::default())),
        "e" => argument.parse().ok().map(DashboardAction::Export),
        "t" => parse_indices(argument).map(DashboardAction::Toggle),
        _ => parse_indices(input).map(DashboardAction::Toggle),
    }
}

fn parse_indices(text: &str) -> Option<Vec<usize>> {
    let indices: Option<Vec<usize>> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect();
    indices.filter(|v| !v.is_empty())
}

/// Flip each index in the selection. All indices are checked against the
/// table size before anything changes.
pub fn toggle_indices(state: &mut ViewState, table_len: usize, indices: &[usize]) -> Result<()> {
    if let Some(&bad) = indices.iter().find(|&&i| i == 0 || i > table_len) {
        return Err(distmap_common::Error::UnknownIndex {
            index: bad,
            len: table_len,
        }
        .into());
    }

    for &index in indices {
        if !state.selected.remove(&index) {
            state.selected.insert(index);
        }
    }
    Ok(())
}

pub fn run_dashboard(dataset: &Dataset, config: &Config, output_dir: &Path) -> Result<()> {
    let options = config.render_options();
    let counts = zone_counts(&dataset.records);
    if counts.is_empty() {
        println!("No hay clientes con coordenadas en {}", dataset.source.display());
        return Ok(());
    }
    let zones: Vec<String> = counts.keys().cloned().collect();

    println!("🗺  distmap - dashboard\n");
    println!(
        "✔ {} clientes en {} zonas ({} filas sin coordenadas omitidas)\n",
        dataset.records.len(),
        zones.len(),
        dataset.dropped
    );

    let mut state = ViewState::default();
    state.set_zones(prompt_zones(&zones, &state.zones)?);

    loop {
        let pass = match render(&dataset.records, &state, &options)? {
            RenderOutcome::Ready(pass) => Some(pass),
            RenderOutcome::NoZoneSelected => None,
        };
        show(pass.as_ref());

        println!("{}", HELP);
        let input: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| DistMapError::Prompt(e.to_string()))?;

        let Some(action) = parse_action(&input) else {
            println!("Comando desconocido: {}", input.trim());
            continue;
        };

        match (action, pass) {
            (DashboardAction::Quit, _) => break,
            (DashboardAction::Show, _) => {}
            (DashboardAction::Zones, _) => {
                let chosen = prompt_zones(&zones, &state.zones)?;
                state.set_zones(chosen);
            }
            (_, None) => println!("Seleccione al menos una zona primero ([z])"),
            (DashboardAction::Pharmacies, Some(_)) => {
                let pharmacies = available_pharmacies(&filter_by_zones(&dataset.records, &state.zones));
                let chosen = prompt_pharmacies(&pharmacies, &state.pharmacies)?;
                state.set_pharmacies(chosen);
            }
            (DashboardAction::Rows, Some(pass)) => {
                state.selected = prompt_rows(&pass)?;
            }
            (DashboardAction::Toggle(indices), Some(pass)) => {
                if let Err(e) = toggle_indices(&mut state, pass.table.len(), &indices) {
                    println!("⚠ {}", e);
                }
            }
            (DashboardAction::SelectAll, Some(pass)) => {
                state.selected = (1..=pass.table.len()).collect();
            }
            (DashboardAction::Clear, Some(_)) => state.selected.clear(),
            (DashboardAction::Map, Some(pass)) => {
                for path in write_map_files(&pass, config, output_dir)? {
                    println!("✔ {}", path.display());
                }
            }
            (DashboardAction::Export(format), Some(pass)) => {
                export::export_selection(&pass, &format, output_dir, &ReportOptions::from_config(config))?;
            }
        }
    }

    Ok(())
}

fn show(pass: Option<&RenderPass>) {
    match pass {
        Some(pass) => {
            println!("\n{}", format_table(&pass.table));
            println!(
                "{} | mapa: {} marcador(es) alrededor de ({:.5}, {:.5})\n",
                status_line(pass.status),
                pass.map.markers.len(),
                pass.map.center.lat,
                pass.map.center.lng
            );
        }
        None => println!("\nNinguna zona seleccionada.\n"),
    }
}

/// HTML and PNG of the current map in `output_dir`
pub fn write_map_files(pass: &RenderPass, config: &Config, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let html = output_dir.join(format!("{}_map.html", config.file_prefix));
    let png = output_dir.join(format!("{}_map.png", config.file_prefix));

    map::write_html(&pass.map, &config.map_title, &html)?;
    let snapshot = map::rasterize(&pass.map, config.map_width_px, config.map_height_px)?;
    map::write_png(&snapshot, &png)?;

    Ok(vec![html, png])
}

fn prompt_zones(zones: &[String], current: &BTreeSet<String>) -> Result<BTreeSet<String>> {
    let defaults: Vec<bool> = zones.iter().map(|z| current.contains(z)).collect();
    let chosen = MultiSelect::new()
        .with_prompt("Zonas (espacio para marcar, enter para confirmar)")
        .items(zones)
        .defaults(&defaults)
        .interact()
        .map_err(|e| DistMapError::Prompt(e.to_string()))?;

    Ok(chosen.into_iter().map(|i| zones[i].clone()).collect())
}

fn prompt_rows(pass: &RenderPass) -> Result<BTreeSet<usize>> {
    let items: Vec<String> = pass
        .table
        .rows()
        .iter()
        .map(|row| {
            format!(
                "{:>3}  {:<6} {} | {}",
                row.index, row.record.zone_code, row.record.client_name, row.record.pharmacy
            )
        })
        .collect();
    let defaults: Vec<bool> = pass.table.rows().iter().map(|row| row.selected).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Filas a exportar (espacio para marcar, enter para confirmar)")
        .items(&items)
        .defaults(&defaults)
        .interact()
        .map_err(|e| DistMapError::Prompt(e.to_string()))?;

    Ok(chosen.into_iter().map(|i| i + 1).collect())
}

fn prompt_pharmacies(pharmacies: &[String], current: &BTreeSet<String>) -> Result<BTreeSet<String>> {
    let defaults: Vec<bool> = pharmacies.iter().map(|p| current.contains(p)).collect();
    let chosen = MultiSelect::new()
        .with_prompt("Boticas (ninguna = todas)")
        .items(pharmacies)
        .defaults(&defaults)
        .interact()
        .map_err(|e| DistMapError::Prompt(e.to_string()))?;

    Ok(chosen.into_iter().map(|i| pharmacies[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("q"), Some(DashboardAction::Quit));
        assert_eq!(parse_action("r"), Some(DashboardAction::Rows));
        assert_eq!(parse_action(""), Some(DashboardAction::Show));
        assert_eq!(parse_action("1,3 5"), Some(DashboardAction::Toggle(vec![1, 3, 5])));
        assert_eq!(parse_action("t 2"), Some(DashboardAction::Toggle(vec![2])));
        assert_eq!(parse_action("e"), Some(DashboardAction::Export(ExportFormat::Pdf)));
        assert_eq!(parse_action("e both"), Some(DashboardAction::Export(ExportFormat::Both)));
        assert_eq!(parse_action("e docx"), None);
        assert_eq!(parse_action("hello"), None);
    }

    #[test]
    fn test_toggle_flips_selection() {
        let mut state = ViewState::with_zones(["SU01"]);
        toggle_indices(&mut state, 5, &[1, 3]).unwrap();
        toggle_indices(&mut state, 5, &[3, 4]).unwrap();
        assert_eq!(state.selected, [1, 4].into_iter().collect());
    }

    #[test]
    fn test_toggle_out_of_range_changes_nothing() {
        let mut state = ViewState::with_zones(["SU01"]);
        let err = toggle_indices(&mut state, 3, &[1, 4]).unwrap_err();
        assert!(matches!(
            err,
            DistMapError::Common(distmap_common::Error::UnknownIndex { index: 4, len: 3 })
        ));
        assert!(state.selected.is_empty());
        assert!(toggle_indices(&mut state, 3, &[0]).is_err());
    }
}
