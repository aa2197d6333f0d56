//! Immutable scan outputs (§3): the per-pair `ScanMatch` and the
//! whole-watchlist `ScanResult` record a single `RunScan` invocation
//! produces.

use crate::enums::MatchType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surveil_contracts::prelude::{ScanId, WatchlistId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanMatch {
    pub patent_number: String,
    pub molecule_id: String,
    pub similarity_score: f64,
    pub risk_score: f64,
    pub match_type: MatchType,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: ScanId,
    pub watchlist_id: WatchlistId,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub patents_scanned: u64,
    pub molecules_scanned: u64,
    pub matches_found: u64,
    pub alerts_created: u64,
    pub matches: Vec<ScanMatch>,
    pub error: Option<String>,
}

impl ScanResult {
    pub fn started(id: ScanId, watchlist_id: WatchlistId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            watchlist_id,
            started_at,
            completed_at: None,
            patents_scanned: 0,
            molecules_scanned: 0,
            matches_found: 0,
            alerts_created: 0,
            matches: Vec::new(),
            error: None,
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    pub fn record_match(&mut self, matched: ScanMatch) {
        self.matches_found += 1;
        self.matches.push(matched);
    }

    pub fn finish(&mut self, completed_at: DateTime<Utc>, alerts_created: u64) {
        self.completed_at = Some(completed_at);
        self.alerts_created = alerts_created;
    }

    pub fn fail(&mut self, completed_at: DateTime<Utc>, error: impl Into<String>) {
        self.completed_at = Some(completed_at);
        self.error = Some(error.into());
    }
}
