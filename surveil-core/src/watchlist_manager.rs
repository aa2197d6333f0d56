//! Watchlist Manager (C8, §4.8): CRUD and membership edits over
//! `Watchlist`, publishing `WatchlistCreated` for the scheduler/scan engine
//! to pick up.

use chrono::{DateTime, Utc};
use serde::Serialize;
use surveil_contracts::prelude::WatchlistId;
use surveil_model::{LifecycleStatus, ScanFrequency, Watchlist};
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::pagination::{PagedResult, Pagination};
use crate::ports::event_bus::topics;
use crate::ports::repository::{WatchlistFilter, WatchlistRepository};
use crate::ports::{EventBus, EventBusExt};

/// `CreateWatchlist` (§4.8). `scan_frequency`/`similarity_threshold` of
/// `None` fall back to the ambient config defaults.
#[derive(Clone, Debug)]
pub struct CreateWatchlistRequest {
    pub name: String,
    pub owner_id: String,
    pub scan_frequency: Option<ScanFrequency>,
    pub similarity_threshold: Option<f64>,
    pub patent_numbers: Vec<String>,
    pub molecule_ids: Vec<String>,
}

/// `UpdateWatchlist` (§4.8): every field is a partial update, `None` leaves
/// the existing value untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateWatchlistRequest {
    pub name: Option<String>,
    pub scan_frequency: Option<ScanFrequency>,
    pub similarity_threshold: Option<f64>,
}

#[derive(Clone, Serialize)]
struct WatchlistCreatedPayload<'a> {
    watchlist_id: &'a str,
    owner_id: &'a str,
    name: &'a str,
    timestamp: DateTime<Utc>,
}

pub struct WatchlistManager<R, B>
where
    R: WatchlistRepository,
    B: EventBus,
{
    watchlists: R,
    bus: B,
    default_scan_frequency: ScanFrequency,
    default_similarity_threshold: f64,
}

impl<R, B> WatchlistManager<R, B>
where
    R: WatchlistRepository,
    B: EventBus,
{
    pub fn new(
        watchlists: R,
        bus: B,
        default_scan_frequency: ScanFrequency,
        default_similarity_threshold: f64,
    ) -> Self {
        Self {
            watchlists,
            bus,
            default_scan_frequency,
            default_similarity_threshold,
        }
    }

    pub async fn create_watchlist(
        &self,
        req: CreateWatchlistRequest,
        now: DateTime<Utc>,
    ) -> Result<Watchlist> {
        let id = WatchlistId::generate(&[&req.name, &req.owner_id], now.timestamp_nanos_opt().unwrap_or_default());
        let watchlist = Watchlist::new(
            id,
            req.name,
            req.owner_id,
            req.scan_frequency.unwrap_or(self.default_scan_frequency),
            req.similarity_threshold.unwrap_or(self.default_similarity_threshold),
            req.patent_numbers,
            req.molecule_ids,
            now,
        )?;

        self.watchlists.save(&watchlist).await?;

        let payload = WatchlistCreatedPayload {
            watchlist_id: watchlist.id.as_str(),
            owner_id: &watchlist.owner_id,
            name: &watchlist.name,
            timestamp: now,
        };
        if let Err(err) = self
            .bus
            .publish(topics::WATCHLIST_CREATED, watchlist.id.as_str(), &payload)
            .await
        {
            warn!(watchlist_id = %watchlist.id, error = %err, "watchlist.created publish failed (ignored per error taxonomy)");
        }

        info!(watchlist_id = %watchlist.id, owner_id = %watchlist.owner_id, "watchlist created");
        Ok(watchlist)
    }

    pub async fn get_watchlist(&self, id: &WatchlistId) -> Result<Watchlist> {
        self.load(id).await
    }

    pub async fn list_watchlists(
        &self,
        filter: WatchlistFilter,
        page: Pagination,
    ) -> Result<PagedResult<Watchlist>> {
        self.watchlists.list(filter, page).await
    }

    /// `UpdateWatchlist` (§4.8). Changing `scan_frequency` resets
    /// `next_scan_at` to `now + new_duration`.
    pub async fn update_watchlist(
        &self,
        id: &WatchlistId,
        req: UpdateWatchlistRequest,
        now: DateTime<Utc>,
    ) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        if let Some(name) = req.name {
            watchlist.name = name;
        }
        if let Some(frequency) = req.scan_frequency {
            watchlist.set_scan_frequency(frequency, now);
        }
        if let Some(threshold) = req.similarity_threshold {
            watchlist.set_similarity_threshold(threshold)?;
        }
        self.watchlists.update(&watchlist).await?;
        info!(watchlist_id = %watchlist.id, "watchlist updated");
        Ok(watchlist)
    }

    pub async fn add_patents(
        &self,
        id: &WatchlistId,
        patents: Vec<String>,
    ) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        watchlist.add_patents(patents);
        self.watchlists.update(&watchlist).await?;
        Ok(watchlist)
    }

    pub async fn remove_patents(
        &self,
        id: &WatchlistId,
        patents: &[String],
    ) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        watchlist.remove_patents(patents);
        self.watchlists.update(&watchlist).await?;
        Ok(watchlist)
    }

    pub async fn add_molecules(
        &self,
        id: &WatchlistId,
        molecules: Vec<String>,
    ) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        watchlist.add_molecules(molecules);
        self.watchlists.update(&watchlist).await?;
        Ok(watchlist)
    }

    pub async fn remove_molecules(
        &self,
        id: &WatchlistId,
        molecules: &[String],
    ) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        watchlist.remove_molecules(molecules);
        self.watchlists.update(&watchlist).await?;
        Ok(watchlist)
    }

    /// `ArchiveWatchlist` (§3): the only permitted "deletion". Idempotent —
    /// archiving an already-archived watchlist succeeds silently.
    pub async fn archive_watchlist(&self, id: &WatchlistId) -> Result<()> {
        self.watchlists.archive(id).await?;
        info!(watchlist_id = %id, "watchlist archived");
        Ok(())
    }

    pub async fn pause_watchlist(&self, id: &WatchlistId) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        watchlist.status = LifecycleStatus::Paused;
        self.watchlists.update(&watchlist).await?;
        Ok(watchlist)
    }

    pub async fn resume_watchlist(&self, id: &WatchlistId) -> Result<Watchlist> {
        let mut watchlist = self.load(id).await?;
        watchlist.status = LifecycleStatus::Active;
        self.watchlists.update(&watchlist).await?;
        Ok(watchlist)
    }

    async fn load(&self, id: &WatchlistId) -> Result<Watchlist> {
        self.watchlists
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("watchlist {id}")))
    }
}
