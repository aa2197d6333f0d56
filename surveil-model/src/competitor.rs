//! `TrackedCompetitor` (§3): a competitor organization tracked against a
//! watchlist's technology areas.

use crate::enums::LifecycleStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surveil_contracts::prelude::{CompetitorId, WatchlistId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackedCompetitor {
    pub id: CompetitorId,
    pub name: String,
    pub aliases: Vec<String>,
    pub watchlist_id: WatchlistId,
    pub technology_areas: Vec<String>,
    pub patent_count: u64,
    pub recent_filings: u64,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub status: LifecycleStatus,
    pub created_at: DateTime<Utc>,
}

impl TrackedCompetitor {
    pub fn new(
        id: CompetitorId,
        name: impl Into<String>,
        watchlist_id: WatchlistId,
        technology_areas: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            aliases: Vec::new(),
            watchlist_id,
            technology_areas,
            patent_count: 0,
            recent_filings: 0,
            last_scan_at: None,
            status: LifecycleStatus::Active,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LifecycleStatus::Active
    }

    /// Reactivates an archived record in place, per §4.10's requirement
    /// that re-tracking restores rather than duplicates.
    pub fn reactivate(&mut self) {
        self.status = LifecycleStatus::Active;
    }

    pub fn archive(&mut self) {
        self.status = LifecycleStatus::Archived;
    }

    /// Months elapsed since tracking began, floored at a fractional month of
    /// `1.0` so a brand-new competitor doesn't produce a divide-by-zero in
    /// filing-velocity calculations.
    pub fn months_tracked(&self, now: DateTime<Utc>) -> f64 {
        let days = (now - self.created_at).num_days().max(1) as f64;
        (days / 30.0).max(1.0 / 30.0)
    }

    pub fn filing_velocity(&self, now: DateTime<Utc>) -> f64 {
        self.patent_count as f64 / self.months_tracked(now)
    }
}
