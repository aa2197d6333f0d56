//! Repository port contracts (C2, §4.2).
//!
//! Every method accepts already-resolved inputs (no cancellation token
//! parameter is threaded through explicitly) — the async runtime's task
//! cancellation is the cancellation mechanism §5 describes; a dropped future
//! is a cancelled command. "Not found" is always `Ok(None)`, distinct from
//! `Err(CoreError::Dependency(_))` for a true backend failure.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use surveil_contracts::prelude::{AlertId, CompetitorId, ScanId, WatchlistId};
use surveil_model::{Alert, Level, ScanResult, Status, TrackedCompetitor, Watchlist};

use crate::error::Result;
use crate::pagination::{PagedResult, Pagination};

/// Result of `GetStats`/`GetAlertStats` (§4.2, §6).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlertStats {
    pub by_status: HashMap<Status, u64>,
    pub by_level: HashMap<Level, u64>,
    /// Mean wall-clock time between `CreatedAt` and `AcknowledgedAt` across
    /// alerts that have been acknowledged at least once.
    pub avg_response_time: Option<chrono::Duration>,
    pub over_sla_count: u64,
}

#[derive(Clone, Debug, Default)]
pub struct AlertFilter {
    pub watchlist_id: Option<WatchlistId>,
    pub status: Option<Status>,
    pub level: Option<Level>,
    pub assignee_id: Option<String>,
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn save(&self, alert: &Alert) -> Result<()>;

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>>;

    /// Persists `alert` only if the currently-stored record's status still
    /// equals `expected_status`; otherwise returns
    /// [`crate::error::CoreError::Conflict`]. This is the serialization
    /// point §4.5/§5 require for concurrent lifecycle transitions.
    async fn compare_and_update(&self, alert: &Alert, expected_status: Status) -> Result<()>;

    async fn list(&self, filter: AlertFilter, page: Pagination) -> Result<PagedResult<Alert>>;

    async fn find_duplicate(
        &self,
        patent_number: &str,
        molecule_id: &str,
        watchlist_id: &WatchlistId,
        since: DateTime<Utc>,
    ) -> Result<Option<Alert>>;

    async fn find_over_sla(&self, now: DateTime<Utc>) -> Result<Vec<Alert>>;

    async fn get_stats(&self, watchlist_id: &WatchlistId) -> Result<AlertStats>;
}

#[derive(Clone, Debug, Default)]
pub struct WatchlistFilter {
    pub owner_id: Option<String>,
    pub status: Option<surveil_model::LifecycleStatus>,
}

#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    async fn save(&self, watchlist: &Watchlist) -> Result<()>;

    async fn find_by_id(&self, id: &WatchlistId) -> Result<Option<Watchlist>>;

    async fn update(&self, watchlist: &Watchlist) -> Result<()>;

    /// Archives (never physically removes) the watchlist with `id`.
    async fn archive(&self, id: &WatchlistId) -> Result<()>;

    async fn list(
        &self,
        filter: WatchlistFilter,
        page: Pagination,
    ) -> Result<PagedResult<Watchlist>>;

    /// `ACTIVE` watchlists whose `NextScanAt <= before`.
    async fn find_due_for_scan(&self, before: DateTime<Utc>) -> Result<Vec<Watchlist>>;
}

#[async_trait]
pub trait ScanResultRepository: Send + Sync {
    async fn save(&self, scan: &ScanResult) -> Result<()>;

    async fn find_by_id(&self, id: &ScanId) -> Result<Option<ScanResult>>;

    async fn list_by_watchlist(
        &self,
        watchlist_id: &WatchlistId,
        page: Pagination,
    ) -> Result<PagedResult<ScanResult>>;
}

#[derive(Clone, Debug, Default)]
pub struct CompetitorFilter {
    pub watchlist_id: Option<WatchlistId>,
    pub status: Option<surveil_model::LifecycleStatus>,
    pub technology_area: Option<String>,
}

#[async_trait]
pub trait CompetitorRepository: Send + Sync {
    async fn save(&self, competitor: &TrackedCompetitor) -> Result<()>;

    async fn find_by_id(&self, id: &CompetitorId) -> Result<Option<TrackedCompetitor>>;

    async fn update(&self, competitor: &TrackedCompetitor) -> Result<()>;

    async fn archive(&self, id: &CompetitorId) -> Result<()>;

    async fn list(
        &self,
        filter: CompetitorFilter,
        page: Pagination,
    ) -> Result<PagedResult<TrackedCompetitor>>;

    async fn find_by_name(
        &self,
        name: &str,
        watchlist_id: &WatchlistId,
    ) -> Result<Option<TrackedCompetitor>>;

    /// Every `ACTIVE` competitor that tracks `area` among its technology
    /// areas — the read path `GetCompetitiveLandscape` needs (§4.10).
    async fn list_by_technology_area(&self, area: &str) -> Result<Vec<TrackedCompetitor>>;
}
