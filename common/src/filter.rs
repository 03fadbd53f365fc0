//! Zone and pharmacy filters
//!
//! Both filters preserve dataset order, which later drives display indices.

use crate::types::ClientRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Zone codes offered by the zone selector: sorted, unique, non-empty
pub fn available_zones(records: &[ClientRecord]) -> Vec<String> {
    zone_counts(records).into_keys().collect()
}

/// Record count per zone code
pub fn zone_counts(records: &[ClientRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| !r.zone_code.is_empty()) {
        *counts.entry(record.zone_code.clone()).or_insert(0) += 1;
    }
    counts
}

/// Records whose zone code is one of `zones`. An empty set selects nothing.
pub fn filter_by_zones(records: &[ClientRecord], zones: &BTreeSet<String>) -> Vec<ClientRecord> {
    if zones.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|r| zones.contains(&r.zone_code))
        .cloned()
        .collect()
}

/// Pharmacy names present in a zone view, sorted and unique
pub fn available_pharmacies(view: &[ClientRecord]) -> Vec<String> {
    view.iter()
        .map(|r| r.pharmacy.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Narrow a zone view to the given pharmacies. An empty set leaves the view unchanged.
pub fn filter_by_pharmacies(
    view: Vec<ClientRecord>,
    pharmacies: &BTreeSet<String>,
) -> Vec<ClientRecord> {
    if pharmacies.is_empty() {
        return view;
    }

    view.into_iter()
        .filter(|r| pharmacies.contains(r.pharmacy.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;

    fn record(zone: &str, pharmacy: &str) -> ClientRecord {
        ClientRecord {
            zone_code: zone.into(),
            zone_name: format!("Zona {}", zone),
            client_code: String::new(),
            client_name: String::new(),
            pharmacy: pharmacy.into(),
            references: String::new(),
            address: String::new(),
            position: GeoPoint::new(-12.0, -77.0),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn dataset() -> Vec<ClientRecord> {
        vec![
            record("SU02", "Botica B"),
            record("SU01", "Botica A"),
            record("SU03", "Botica C"),
            record("SU01", "Botica D"),
            record("", "Sin zona"),
        ]
    }

    #[test]
    fn test_available_zones_sorted_unique() {
        assert_eq!(available_zones(&dataset()), vec!["SU01", "SU02", "SU03"]);
    }

    #[test]
    fn test_zone_counts() {
        let counts = zone_counts(&dataset());
        assert_eq!(counts["SU01"], 2);
        assert_eq!(counts["SU02"], 1);
        assert!(!counts.contains_key(""));
    }

    #[test]
    fn test_filter_by_zones_exact_membership() {
        let view = filter_by_zones(&dataset(), &set(&["SU01", "SU03"]));
        let pharmacies: Vec<_> = view.iter().map(|r| r.pharmacy.as_str()).collect();
        assert_eq!(pharmacies, vec!["Botica A", "Botica C", "Botica D"]);
    }

    #[test]
    fn test_filter_by_zones_empty_selection() {
        assert!(filter_by_zones(&dataset(), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_filter_by_zones_unknown_zone() {
        let view = filter_by_zones(&dataset(), &set(&["SU99", "SU02"]));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].zone_code, "SU02");
    }

    #[test]
    fn test_pharmacy_filter() {
        let view = filter_by_zones(&dataset(), &set(&["SU01"]));
        assert_eq!(available_pharmacies(&view), vec!["Botica A", "Botica D"]);

        let narrowed = filter_by_pharmacies(view.clone(), &set(&["Botica D"]));
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].pharmacy, "Botica D");

        let unchanged = filter_by_pharmacies(view.clone(), &BTreeSet::new());
        assert_eq!(unchanged, view);
    }
}
