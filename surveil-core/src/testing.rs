//! In-memory reference adapters for the ports in [`crate::ports`].
//!
//! These exist only to exercise the engines in this crate in isolation —
//! no indexing, no concurrency tuning, no persistence. Grounded on the
//! hand-rolled mock-adapter pattern in
//! `other_examples/.../rouse-app-src-alert_service.rs.rs`
//! (`MockAlertRepo`, `MockEventPublisher`, … behind `std::sync::Mutex`,
//! rather than a mocking framework the teacher itself doesn't reach for
//! here).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use surveil_contracts::prelude::{AlertId, CompetitorId, ScanId, WatchlistId};
use surveil_model::{Alert, LifecycleStatus, ScanResult, Status, TrackedCompetitor, Watchlist};

use crate::error::{CoreError, Result};
use crate::pagination::{PagedResult, Pagination};
use crate::ports::{
    AlertFilter, AlertRepository, AlertStats, Cache, CompetitorFilter, CompetitorRepository,
    EventBus, ScanResultRepository, SimilarityService, WatchlistFilter, WatchlistRepository,
};

fn paginate<T: Clone>(items: Vec<T>, page: Pagination) -> PagedResult<T> {
    let total = items.len() as u64;
    let start = page.offset() as usize;
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page.page_size as usize)
        .collect();
    PagedResult::new(page_items, total, page)
}

#[derive(Default)]
pub struct InMemoryAlertRepository {
    alerts: Mutex<Vec<Alert>>,
}

impl InMemoryAlertRepository {
    pub async fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn save(&self, alert: &Alert) -> Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>> {
        Ok(self.alerts.lock().unwrap().iter().find(|a| &a.id == id).cloned())
    }

    async fn compare_and_update(&self, alert: &Alert, expected_status: Status) -> Result<()> {
        let mut alerts = self.alerts.lock().unwrap();
        let slot = alerts
            .iter_mut()
            .find(|a| a.id == alert.id)
            .ok_or_else(|| CoreError::NotFound(format!("alert {}", alert.id)))?;
        if slot.status != expected_status {
            return Err(CoreError::Conflict(format!(
                "alert {} expected status {expected_status} but found {}",
                alert.id, slot.status
            )));
        }
        *slot = alert.clone();
        Ok(())
    }

    async fn list(&self, filter: AlertFilter, page: Pagination) -> Result<PagedResult<Alert>> {
        let alerts = self.alerts.lock().unwrap();
        let filtered: Vec<Alert> = alerts
            .iter()
            .filter(|a| {
                filter.watchlist_id.as_ref().map_or(true, |w| &a.watchlist_id == w)
                    && filter.status.map_or(true, |s| a.status == s)
                    && filter.level.map_or(true, |l| a.level == l)
                    && filter
                        .assignee_id
                        .as_ref()
                        .map_or(true, |aid| a.assignee_id.as_deref() == Some(aid.as_str()))
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find_duplicate(
        &self,
        patent_number: &str,
        molecule_id: &str,
        watchlist_id: &WatchlistId,
        since: DateTime<Utc>,
    ) -> Result<Option<Alert>> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                a.patent_number == patent_number
                    && a.molecule_id == molecule_id
                    && &a.watchlist_id == watchlist_id
                    && a.created_at > since
            })
            .cloned())
    }

    async fn find_over_sla(&self, now: DateTime<Utc>) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_over_sla(now))
            .cloned()
            .collect())
    }

    async fn get_stats(&self, watchlist_id: &WatchlistId) -> Result<AlertStats> {
        let alerts = self.alerts.lock().unwrap();
        let mut stats = AlertStats::default();
        let mut response_times = Vec::new();
        for alert in alerts.iter().filter(|a| &a.watchlist_id == watchlist_id) {
            *stats.by_status.entry(alert.status).or_insert(0) += 1;
            *stats.by_level.entry(alert.level).or_insert(0) += 1;
            if let Some(ack) = alert.acknowledged_at {
                response_times.push(ack - alert.created_at);
            }
        }
        if !response_times.is_empty() {
            let total: i64 = response_times.iter().map(|d| d.num_seconds()).sum();
            stats.avg_response_time =
                Some(chrono::Duration::seconds(total / response_times.len() as i64));
        }
        Ok(stats)
    }
}

#[derive(Default)]
pub struct InMemoryWatchlistRepository {
    watchlists: Mutex<Vec<Watchlist>>,
}

#[async_trait]
impl WatchlistRepository for InMemoryWatchlistRepository {
    async fn save(&self, watchlist: &Watchlist) -> Result<()> {
        self.watchlists.lock().unwrap().push(watchlist.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &WatchlistId) -> Result<Option<Watchlist>> {
        Ok(self.watchlists.lock().unwrap().iter().find(|w| &w.id == id).cloned())
    }

    async fn update(&self, watchlist: &Watchlist) -> Result<()> {
        let mut watchlists = self.watchlists.lock().unwrap();
        let slot = watchlists
            .iter_mut()
            .find(|w| w.id == watchlist.id)
            .ok_or_else(|| CoreError::NotFound(format!("watchlist {}", watchlist.id)))?;
        *slot = watchlist.clone();
        Ok(())
    }

    async fn archive(&self, id: &WatchlistId) -> Result<()> {
        let mut watchlists = self.watchlists.lock().unwrap();
        let slot = watchlists
            .iter_mut()
            .find(|w| &w.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("watchlist {id}")))?;
        slot.status = LifecycleStatus::Archived;
        Ok(())
    }

    async fn list(
        &self,
        filter: WatchlistFilter,
        page: Pagination,
    ) -> Result<PagedResult<Watchlist>> {
        let watchlists = self.watchlists.lock().unwrap();
        let filtered: Vec<Watchlist> = watchlists
            .iter()
            .filter(|w| {
                filter.owner_id.as_ref().map_or(true, |o| &w.owner_id == o)
                    && filter.status.map_or(true, |s| w.status == s)
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find_due_for_scan(&self, before: DateTime<Utc>) -> Result<Vec<Watchlist>> {
        Ok(self
            .watchlists
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.is_active() && w.next_scan_at.map_or(false, |t| t <= before))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryScanResultRepository {
    scans: Mutex<Vec<ScanResult>>,
}

#[async_trait]
impl ScanResultRepository for InMemoryScanResultRepository {
    async fn save(&self, scan: &ScanResult) -> Result<()> {
        self.scans.lock().unwrap().push(scan.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ScanId) -> Result<Option<ScanResult>> {
        Ok(self.scans.lock().unwrap().iter().find(|s| &s.id == id).cloned())
    }

    async fn list_by_watchlist(
        &self,
        watchlist_id: &WatchlistId,
        page: Pagination,
    ) -> Result<PagedResult<ScanResult>> {
        let scans = self.scans.lock().unwrap();
        let filtered: Vec<ScanResult> = scans
            .iter()
            .filter(|s| &s.watchlist_id == watchlist_id)
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }
}

#[derive(Default)]
pub struct InMemoryCompetitorRepository {
    competitors: Mutex<Vec<TrackedCompetitor>>,
}

#[async_trait]
impl CompetitorRepository for InMemoryCompetitorRepository {
    async fn save(&self, competitor: &TrackedCompetitor) -> Result<()> {
        self.competitors.lock().unwrap().push(competitor.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CompetitorId) -> Result<Option<TrackedCompetitor>> {
        Ok(self.competitors.lock().unwrap().iter().find(|c| &c.id == id).cloned())
    }

    async fn update(&self, competitor: &TrackedCompetitor) -> Result<()> {
        let mut competitors = self.competitors.lock().unwrap();
        let slot = competitors
            .iter_mut()
            .find(|c| c.id == competitor.id)
            .ok_or_else(|| CoreError::NotFound(format!("competitor {}", competitor.id)))?;
        *slot = competitor.clone();
        Ok(())
    }

    async fn archive(&self, id: &CompetitorId) -> Result<()> {
        let mut competitors = self.competitors.lock().unwrap();
        let slot = competitors
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("competitor {id}")))?;
        slot.archive();
        Ok(())
    }

    async fn list(
        &self,
        filter: CompetitorFilter,
        page: Pagination,
    ) -> Result<PagedResult<TrackedCompetitor>> {
        let competitors = self.competitors.lock().unwrap();
        let filtered: Vec<TrackedCompetitor> = competitors
            .iter()
            .filter(|c| {
                filter.watchlist_id.as_ref().map_or(true, |w| &c.watchlist_id == w)
                    && filter.status.map_or(true, |s| c.status == s)
                    && filter
                        .technology_area
                        .as_ref()
                        .map_or(true, |a| c.technology_areas.iter().any(|t| t == a))
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find_by_name(
        &self,
        name: &str,
        watchlist_id: &WatchlistId,
    ) -> Result<Option<TrackedCompetitor>> {
        Ok(self
            .competitors
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name && &c.watchlist_id == watchlist_id)
            .cloned())
    }

    async fn list_by_technology_area(&self, area: &str) -> Result<Vec<TrackedCompetitor>> {
        Ok(self
            .competitors
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.technology_areas.iter().any(|t| t == area))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

/// Records every publish for assertions; never fails.
#[derive(Default)]
pub struct RecordingEventBus {
    published: Mutex<Vec<(String, String, Value)>>,
}

impl RecordingEventBus {
    pub async fn published(&self) -> Vec<(String, String, Value)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish_raw(&self, topic: &str, key: &str, payload: Value) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), key.to_string(), payload));
        Ok(())
    }
}

/// A similarity stub with per-pair scores and optional forced failures, so
/// scan-engine tests can script the literal scenarios in spec §8 without a
/// real fingerprinting/GNN backend.
#[derive(Default)]
pub struct StubSimilarityService {
    scores: Mutex<HashMap<(String, String), f64>>,
    failures: Mutex<HashSet<(String, String)>>,
}

impl StubSimilarityService {
    pub fn set(&self, patent_number: &str, molecule_id: &str, score: f64) {
        self.scores
            .lock()
            .unwrap()
            .insert((patent_number.to_string(), molecule_id.to_string()), score);
    }

    pub fn fail(&self, patent_number: &str, molecule_id: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((patent_number.to_string(), molecule_id.to_string()));
    }
}

#[async_trait]
impl SimilarityService for StubSimilarityService {
    async fn similarity(&self, patent_number: &str, molecule_id: &str) -> Result<f64> {
        let key = (patent_number.to_string(), molecule_id.to_string());
        if self.failures.lock().unwrap().contains(&key) {
            return Err(CoreError::Dependency(format!(
                "similarity lookup failed for {patent_number}/{molecule_id}"
            )));
        }
        Ok(*self.scores.lock().unwrap().get(&key).unwrap_or(&0.0))
    }
}
