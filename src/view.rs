//! Terminal rendering of a dashboard pass

use crate::error::Result;
use distmap_common::report::fit_text;
use distmap_common::{
    render, ClientRecord, RenderOptions, RenderOutcome, RenderPass, SelectionTable, TableStatus,
    ViewState,
};
use std::collections::BTreeMap;

/// (header, width)
const TABLE_COLUMNS: &[(&str, usize)] = &[
    ("#", 4),
    ("Sel", 3),
    ("Zone", 6),
    ("Client", 28),
    ("Pharmacy", 26),
    ("References", 32),
];

/// Render, optionally marking every row of the view as selected
pub fn render_view(
    records: &[ClientRecord],
    state: &ViewState,
    select_all: bool,
    options: &RenderOptions,
) -> Result<RenderOutcome> {
    let outcome = render(records, state, options)?;
    if !select_all {
        return Ok(outcome);
    }

    match outcome {
        RenderOutcome::Ready(pass) => {
            let mut table = pass.table;
            table.select_all();
            Ok(RenderOutcome::Ready(RenderPass::from_table(table, options)?))
        }
        other => Ok(other),
    }
}

pub fn status_line(status: TableStatus) -> String {
    match status {
        TableStatus::RowsSelected(n) => format!("{} fila(s) seleccionada(s)", n),
        TableStatus::NoRowsSelected => {
            "Ninguna fila seleccionada: el mapa muestra todos los clientes de la vista".to_string()
        }
    }
}

pub fn format_table(table: &SelectionTable) -> String {
    let mut out = String::new();

    let header: Vec<String> = TABLE_COLUMNS
        .iter()
        .map(|(label, width)| format!("{:<width$}", label, width = *width))
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    let total: usize = TABLE_COLUMNS.iter().map(|(_, w)| w + 1).sum::<usize>() - 1;
    out.push_str(&"-".repeat(total));
    out.push('\n');

    for row in table.rows() {
        let record = &row.record;
        let cells = [
            row.index.to_string(),
            if row.selected { "x".to_string() } else { String::new() },
            record.zone_code.clone(),
            record.client_name.clone(),
            record.pharmacy.clone(),
            record.references.clone(),
        ];
        let line: Vec<String> = cells
            .iter()
            .zip(TABLE_COLUMNS)
            .map(|(cell, (_, width))| format!("{:<width$}", fit_text(cell, *width), width = *width))
            .collect();
        out.push_str(line.join(" ").trim_end());
        out.push('\n');
    }

    out
}

pub fn format_zone_counts(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(zone, count)| format!("{:<8} {:>5}\n", zone, count))
        .collect()
}
