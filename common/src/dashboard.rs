//! Dashboard render pass
//!
//! `render` recomputes every derived view from the current input state:
//! zone filter → pharmacy filter → selection table → map. Nothing is carried
//! over between calls, so calling it again after any input change is the
//! whole refresh model.

use crate::error::{Error, Result};
use crate::filter::{filter_by_pharmacies, filter_by_zones};
use crate::map_view::{MapView, ZonePalette, DEFAULT_ZOOM};
use crate::selection::{SelectionTable, TableStatus};
use crate::types::ClientRecord;
use std::collections::BTreeSet;

/// User input driving one render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub zones: BTreeSet<String>,
    /// Optional pharmacy narrowing; empty means all pharmacies in the zones
    pub pharmacies: BTreeSet<String>,
    /// Display indices chosen for export
    pub selected: BTreeSet<usize>,
}

impl ViewState {
    pub fn with_zones<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zones: zones.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Replace the zone choice. A different choice invalidates the pharmacy
    /// narrowing and the row selection, since indices belong to the old view.
    pub fn set_zones(&mut self, zones: BTreeSet<String>) {
        if zones != self.zones {
            self.zones = zones;
            self.pharmacies.clear();
            self.selected.clear();
        }
    }

    pub fn set_pharmacies(&mut self, pharmacies: BTreeSet<String>) {
        if pharmacies != self.pharmacies {
            self.pharmacies = pharmacies;
            self.selected.clear();
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub zoom: u8,
    pub palette: ZonePalette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            palette: ZonePalette::default(),
        }
    }
}

/// Everything produced by a successful pass
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub table: SelectionTable,
    pub status: TableStatus,
    pub map: MapView,
}

impl RenderPass {
    /// Derive status and map from a table
    pub fn from_table(table: SelectionTable, options: &RenderOptions) -> Result<Self> {
        let map = MapView::build(&table.active_rows(), options.zoom, &options.palette)?;
        Ok(Self {
            status: table.status(),
            table,
            map,
        })
    }
}

#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Nothing to show: no zone chosen, or the choice matches no record
    NoZoneSelected,
    Ready(RenderPass),
}

pub fn render(
    records: &[ClientRecord],
    state: &ViewState,
    options: &RenderOptions,
) -> Result<RenderOutcome> {
    let view = filter_by_pharmacies(filter_by_zones(records, &state.zones), &state.pharmacies);

    let mut table = match SelectionTable::from_view(view) {
        Ok(table) => table,
        Err(Error::NoZoneSelected) => return Ok(RenderOutcome::NoZoneSelected),
        Err(e) => return Err(e),
    };
    table.select_indices(state.selected.iter().copied())?;

    RenderPass::from_table(table, options).map(RenderOutcome::Ready)
}
