//! The `Watchlist` entity: a named, owner-scoped bundle of patents and
//! molecules monitored on a periodic schedule (§3, §4.8).

use crate::enums::{LifecycleStatus, ScanFrequency};
use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surveil_contracts::prelude::WatchlistId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: WatchlistId,
    pub name: String,
    pub owner_id: String,
    pub status: LifecycleStatus,
    pub scan_frequency: ScanFrequency,
    pub similarity_threshold: f64,
    /// Ordered, duplicate-free patent numbers. Order is preserved across
    /// membership edits so scan iteration (§4.9) is deterministic.
    pub patent_numbers: Vec<String>,
    /// Ordered, duplicate-free molecule ids.
    pub molecule_ids: Vec<String>,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub next_scan_at: Option<DateTime<Utc>>,
    pub total_scans: u64,
    pub total_alerts: u64,
}

impl Watchlist {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: WatchlistId,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        scan_frequency: ScanFrequency,
        similarity_threshold: f64,
        patent_numbers: Vec<String>,
        molecule_ids: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&similarity_threshold) || similarity_threshold == 0.0 {
            return Err(ModelError::ThresholdOutOfRange(similarity_threshold));
        }

        let mut watchlist = Self {
            id,
            name: name.into(),
            owner_id: owner_id.into(),
            status: LifecycleStatus::Active,
            scan_frequency,
            similarity_threshold,
            patent_numbers: Vec::new(),
            molecule_ids: Vec::new(),
            last_scan_at: None,
            next_scan_at: Some(now + scan_frequency.duration()),
            total_scans: 0,
            total_alerts: 0,
        };
        watchlist.add_patents(patent_numbers);
        watchlist.add_molecules(molecule_ids);

        if watchlist.patent_numbers.is_empty() && watchlist.molecule_ids.is_empty() {
            return Err(ModelError::EmptyMembership);
        }

        Ok(watchlist)
    }

    pub fn is_active(&self) -> bool {
        self.status == LifecycleStatus::Active
    }

    /// Adds patents, silently ignoring any already present, preserving
    /// insertion order of the new entries.
    pub fn add_patents(&mut self, patents: impl IntoIterator<Item = String>) {
        for patent in patents {
            if !self.patent_numbers.contains(&patent) {
                self.patent_numbers.push(patent);
            }
        }
    }

    /// Removes patents, silently ignoring entries not present.
    pub fn remove_patents(&mut self, patents: &[String]) {
        self.patent_numbers.retain(|p| !patents.contains(p));
    }

    pub fn add_molecules(&mut self, molecules: impl IntoIterator<Item = String>) {
        for molecule in molecules {
            if !self.molecule_ids.contains(&molecule) {
                self.molecule_ids.push(molecule);
            }
        }
    }

    pub fn remove_molecules(&mut self, molecules: &[String]) {
        self.molecule_ids.retain(|m| !molecules.contains(m));
    }

    /// Sets a new scan frequency, resetting `next_scan_at` to
    /// `now + new_duration` per §4.8's partial-update rule.
    pub fn set_scan_frequency(&mut self, frequency: ScanFrequency, now: DateTime<Utc>) {
        self.scan_frequency = frequency;
        self.next_scan_at = Some(now + frequency.duration());
    }

    pub fn set_similarity_threshold(&mut self, threshold: f64) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&threshold) || threshold == 0.0 {
            return Err(ModelError::ThresholdOutOfRange(threshold));
        }
        self.similarity_threshold = threshold;
        Ok(())
    }

    /// Records the outcome of a completed scan: `last_scan_at`,
    /// `next_scan_at`, and the running totals, all in one update (§3's
    /// "MUST occur in a single transactional update").
    pub fn record_scan(&mut self, now: DateTime<Utc>, alerts_created: u64) {
        self.last_scan_at = Some(now);
        self.next_scan_at = Some(now + self.scan_frequency.duration());
        self.total_scans += 1;
        self.total_alerts += alerts_created;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> WatchlistId {
        WatchlistId::from_raw("WL-TEST")
    }

    #[test]
    fn rejects_empty_membership() {
        let err = Watchlist::new(
            id(),
            "name",
            "owner",
            ScanFrequency::Weekly,
            0.8,
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, ModelError::EmptyMembership);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = Watchlist::new(
            id(),
            "name",
            "owner",
            ScanFrequency::Weekly,
            0.0,
            vec!["US-1".into()],
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ThresholdOutOfRange(_)));
    }

    #[test]
    fn next_scan_at_follows_frequency() {
        let now = Utc::now();
        let wl = Watchlist::new(
            id(),
            "name",
            "owner",
            ScanFrequency::Weekly,
            0.8,
            vec!["US-1".into()],
            vec![],
            now,
        )
        .unwrap();
        assert_eq!(wl.next_scan_at, Some(now + chrono::Duration::days(7)));
    }

    #[test]
    fn adding_duplicates_is_idempotent_and_order_preserving() {
        let now = Utc::now();
        let mut wl = Watchlist::new(
            id(),
            "name",
            "owner",
            ScanFrequency::Weekly,
            0.8,
            vec!["P2".into()],
            vec![],
            now,
        )
        .unwrap();
        wl.add_patents(["P1".into(), "P2".into(), "P2".into()]);
        assert_eq!(wl.patent_numbers, vec!["P2".to_string(), "P1".to_string()]);
    }

    #[test]
    fn removing_absent_entries_is_a_no_op() {
        let now = Utc::now();
        let mut wl = Watchlist::new(
            id(),
            "name",
            "owner",
            ScanFrequency::Weekly,
            0.8,
            vec!["P1".into()],
            vec![],
            now,
        )
        .unwrap();
        wl.remove_patents(&["does-not-exist".to_string()]);
        assert_eq!(wl.patent_numbers, vec!["P1".to_string()]);
    }

    #[test]
    fn record_scan_updates_all_fields_together() {
        let now = Utc::now();
        let mut wl = Watchlist::new(
            id(),
            "name",
            "owner",
            ScanFrequency::Daily,
            0.8,
            vec!["P1".into()],
            vec![],
            now,
        )
        .unwrap();
        let later = now + chrono::Duration::hours(1);
        wl.record_scan(later, 2);
        assert_eq!(wl.last_scan_at, Some(later));
        assert_eq!(wl.next_scan_at, Some(later + chrono::Duration::hours(24)));
        assert_eq!(wl.total_scans, 1);
        assert_eq!(wl.total_alerts, 2);
    }
}
