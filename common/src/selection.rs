//! Selection table
//!
//! Wraps a filtered view with a 1-based display index and a selection flag
//! per row. A new table is built whenever the filtered view changes, so
//! indices and flags never outlive the view they were assigned in.

use crate::error::{Error, Result};
use crate::types::ClientRecord;
use serde::Serialize;

/// One grid row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRow {
    /// Display index (1-based, position within the filtered view)
    pub index: usize,
    pub selected: bool,
    #[serde(flatten)]
    pub record: ClientRecord,
}

/// Table state reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    RowsSelected(usize),
    /// Nothing chosen for export; the map falls back to the whole view
    NoRowsSelected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTable {
    rows: Vec<SelectionRow>,
}

impl SelectionTable {
    /// Build a table from a filtered view. An empty view means no zone is selected.
    pub fn from_view(view: Vec<ClientRecord>) -> Result<Self> {
        if view.is_empty() {
            return Err(Error::NoZoneSelected);
        }

        let rows = view
            .into_iter()
            .enumerate()
            .map(|(i, record)| SelectionRow {
                index: i + 1,
                selected: false,
                record,
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SelectionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&SelectionRow> {
        index.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut SelectionRow> {
        let len = self.rows.len();
        index
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i))
            .ok_or(Error::UnknownIndex { index, len })
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<()> {
        self.row_mut(index)?.selected = selected;
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.set_selected(index, true)
    }

    pub fn deselect(&mut self, index: usize) -> Result<()> {
        self.set_selected(index, false)
    }

    /// Flip one row, returning its new state
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let row = self.row_mut(index)?;
        row.selected = !row.selected;
        Ok(row.selected)
    }

    /// Mark the given display indices as selected. Either every index applies or none does.
    pub fn select_indices<I>(&mut self, indices: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        let indices: Vec<usize> = indices.into_iter().collect();
        let len = self.rows.len();
        if let Some(&index) = indices.iter().find(|&&i| i == 0 || i > len) {
            return Err(Error::UnknownIndex { index, len });
        }

        for index in indices {
            self.rows[index - 1].selected = true;
        }
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.rows.iter_mut().for_each(|r| r.selected = true);
    }

    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(|r| r.selected = false);
    }

    /// Rows chosen for export, in display order
    pub fn selected(&self) -> Vec<&SelectionRow> {
        self.rows.iter().filter(|r| r.selected).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.selected).count()
    }

    /// Rows the map shows: the selection, or every row when nothing is selected
    pub fn active_rows(&self) -> Vec<&SelectionRow> {
        let selected = self.selected();
        if selected.is_empty() {
            self.rows.iter().collect()
        } else {
            selected
        }
    }

    pub fn status(&self) -> TableStatus {
        match self.selected_count() {
            0 => TableStatus::NoRowsSelected,
            n => TableStatus::RowsSelected(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;

    fn view(n: usize) -> Vec<ClientRecord> {
        (0..n)
            .map(|i| ClientRecord {
                zone_code: "SU01".into(),
                zone_name: "Norte".into(),
                client_code: format!("C{:03}", i),
                client_name: format!("Cliente {}", i),
                pharmacy: format!("Botica {}", i),
                references: String::new(),
                address: String::new(),
                position: GeoPoint::new(-12.0 - i as f64 * 0.01, -77.0),
            })
            .collect()
    }

    #[test]
    fn test_empty_view_signals_no_zone() {
        assert_eq!(SelectionTable::from_view(Vec::new()), Err(Error::NoZoneSelected));
    }

    #[test]
    fn test_indices_contiguous_from_one() {
        let table = SelectionTable::from_view(view(5)).unwrap();
        let indices: Vec<_> = table.rows().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(table.rows().iter().all(|r| !r.selected));
        assert_eq!(table.status(), TableStatus::NoRowsSelected);
    }

    #[test]
    fn test_active_rows_fall_back_to_view() {
        let mut table = SelectionTable::from_view(view(3)).unwrap();
        assert_eq!(table.active_rows().len(), 3);

        table.select(2).unwrap();
        let active: Vec<_> = table.active_rows().iter().map(|r| r.index).collect();
        assert_eq!(active, vec![2]);
        assert_eq!(table.status(), TableStatus::RowsSelected(1));
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut table = SelectionTable::from_view(view(3)).unwrap();
        assert!(table.toggle(3).unwrap());
        assert!(!table.toggle(3).unwrap());

        table.select_all();
        assert_eq!(table.selected_count(), 3);
        table.clear();
        assert_eq!(table.selected_count(), 0);
    }

    #[test]
    fn test_select_indices_is_all_or_nothing() {
        let mut table = SelectionTable::from_view(view(3)).unwrap();
        let err = table.select_indices([1, 4]).unwrap_err();
        assert_eq!(err, Error::UnknownIndex { index: 4, len: 3 });
        assert_eq!(table.selected_count(), 0);

        assert!(table.select_indices([0]).is_err());

        table.select_indices([3, 1]).unwrap();
        let selected: Vec<_> = table.selected().iter().map(|r| r.index).collect();
        assert_eq!(selected, vec![1, 3]);
    }

    #[test]
    fn test_deselect_and_unknown_index() {
        let mut table = SelectionTable::from_view(view(2)).unwrap();
        table.select(1).unwrap();
        table.deselect(1).unwrap();
        assert_eq!(table.selected_count(), 0);
        assert_eq!(table.select(3), Err(Error::UnknownIndex { index: 3, len: 2 }));
    }

    #[test]
    fn test_row_lookup() {
        let table = SelectionTable::from_view(view(2)).unwrap();
        assert_eq!(table.row(1).unwrap().record.client_code, "C000");
        assert!(table.row(0).is_none());
        assert!(table.row(3).is_none());
    }
}
