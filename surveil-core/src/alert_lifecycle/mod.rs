//! Alert Lifecycle Engine (C5, §4.5): create/ack/dismiss/escalate/resolve,
//! with dedup, stats-cache invalidation, and per-channel dispatch.

pub mod channel_router;

use chrono::{DateTime, Utc};
use serde::Serialize;
use surveil_config::ChannelRoutingTable;
use surveil_contracts::prelude::{AlertId, ChannelMask, WatchlistId};
use surveil_model::{Alert, Level, Status};
use tracing::{debug, info, warn};

pub use channel_router::{AlertConfigUpdate, ChannelRouter};

use crate::error::{CoreError, Result};
use crate::pagination::{PagedResult, Pagination};
use crate::ports::cache::keys as cache_keys;
use crate::ports::{Cache, CacheExt, EventBus, EventBusExt};
use crate::ports::repository::{AlertFilter, AlertRepository, AlertStats};

/// Input to `CreateAlert` (§4.5): the level and scores are computed upstream
/// by the scan engine (or whatever other caller raises an alert) from a
/// similarity score this engine never inspects directly.
#[derive(Clone, Debug)]
pub struct CreateAlertRequest {
    pub patent_number: String,
    pub molecule_id: String,
    pub watchlist_id: WatchlistId,
    pub level: Level,
    pub similarity_score: f64,
    pub risk_score: f64,
}

#[derive(Clone, Serialize)]
struct DispatchPayload<'a> {
    alert_id: &'a str,
    channel: &'a str,
    level: String,
    title: String,
    patent_number: &'a str,
    molecule_id: &'a str,
    assignee_id: Option<&'a str>,
    timestamp: DateTime<Utc>,
}

pub struct AlertLifecycleEngine<R, B, C>
where
    R: AlertRepository,
    B: EventBus,
    C: Cache,
{
    alerts: R,
    bus: B,
    cache: C,
    router: ChannelRouter,
}

impl<R, B, C> AlertLifecycleEngine<R, B, C>
where
    R: AlertRepository,
    B: EventBus,
    C: Cache,
{
    pub fn new(
        alerts: R,
        bus: B,
        cache: C,
        default_channels: ChannelRoutingTable,
        dedup_window: chrono::Duration,
    ) -> Self {
        Self {
            alerts,
            bus,
            cache,
            router: ChannelRouter::new(default_channels, dedup_window),
        }
    }

    pub fn router(&self) -> &ChannelRouter {
        &self.router
    }

    /// CreateAlert (§4.5). Idempotent: a duplicate `(patent, molecule)`
    /// match inside the dedup window returns the existing alert unchanged
    /// rather than creating a second one.
    pub async fn create_alert(&self, req: CreateAlertRequest, now: DateTime<Utc>) -> Result<Alert> {
        let dedup_since = now - self.router.dedup_window().await;
        if let Some(existing) = self
            .alerts
            .find_duplicate(&req.patent_number, &req.molecule_id, &req.watchlist_id, dedup_since)
            .await?
        {
            debug!(
                alert_id = %existing.id,
                patent_number = %req.patent_number,
                molecule_id = %req.molecule_id,
                "duplicate match within dedup window, returning existing alert"
            );
            return Ok(existing);
        }

        let channels = self
            .router
            .resolve_channels(Some(&req.watchlist_id), req.level, now)
            .await;
        let id = AlertId::generate(
            &[&req.patent_number, &req.molecule_id, req.watchlist_id.as_str()],
            now.timestamp_nanos_opt().unwrap_or_default(),
        );
        let alert = Alert::open(
            id,
            req.patent_number,
            req.molecule_id,
            req.watchlist_id,
            req.level,
            req.risk_score,
            req.similarity_score,
            channels,
            now,
        );

        self.alerts.save(&alert).await?;
        self.invalidate_stats_cache(&alert.watchlist_id).await;
        self.dispatch(&alert, now).await;

        info!(alert_id = %alert.id, level = %alert.level, "alert created");
        Ok(alert)
    }

    /// AcknowledgeAlert (§4.5). Precondition: `Status ∈ {OPEN, ESCALATED}`.
    pub async fn acknowledge_alert(
        &self,
        id: &AlertId,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Alert> {
        let user_id = user_id.into();
        let mut alert = self.load(id).await?;
        let expected = alert.status;
        alert.acknowledge(user_id, now)?;
        self.alerts.compare_and_update(&alert, expected).await?;
        self.invalidate_stats_cache(&alert.watchlist_id).await;
        info!(alert_id = %alert.id, "alert acknowledged");
        Ok(alert)
    }

    /// DismissAlert (§4.5). Precondition: `Status ∉ {DISMISSED, RESOLVED}`;
    /// `reason` required.
    pub async fn dismiss_alert(
        &self,
        id: &AlertId,
        reason: impl Into<String>,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Alert> {
        let mut alert = self.load(id).await?;
        let expected = alert.status;
        alert.dismiss(reason, now)?;
        alert
            .metadata
            .insert("dismissed_by".to_string(), user_id.into());
        self.alerts.compare_and_update(&alert, expected).await?;
        self.invalidate_stats_cache(&alert.watchlist_id).await;
        info!(alert_id = %alert.id, "alert dismissed");
        Ok(alert)
    }

    /// EscalateAlert (§4.5). Widens channels to the full mask and
    /// re-dispatches on all four.
    pub async fn escalate_alert(
        &self,
        id: &AlertId,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Alert> {
        let mut alert = self.load(id).await?;
        let expected = alert.status;
        alert.escalate(reason, now)?;
        self.alerts.compare_and_update(&alert, expected).await?;
        self.invalidate_stats_cache(&alert.watchlist_id).await;
        self.dispatch(&alert, now).await;
        info!(alert_id = %alert.id, "alert escalated");
        Ok(alert)
    }

    /// ResolveAlert (§9 open question): precondition
    /// `Status ∈ {ACKNOWLEDGED, ESCALATED}`, sets `ResolvedAt`.
    pub async fn resolve_alert(
        &self,
        id: &AlertId,
        user_id: impl Into<String>,
        resolution: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Alert> {
        let mut alert = self.load(id).await?;
        let expected = alert.status;
        alert.resolve(resolution, now)?;
        alert
            .metadata
            .insert("resolved_by".to_string(), user_id.into());
        self.alerts.compare_and_update(&alert, expected).await?;
        self.invalidate_stats_cache(&alert.watchlist_id).await;
        info!(alert_id = %alert.id, "alert resolved");
        Ok(alert)
    }

    pub async fn get_alert(&self, id: &AlertId) -> Result<Alert> {
        self.load(id).await
    }

    /// `ListAlerts` (§6): server-side filtered, paginated listing.
    pub async fn list_alerts(&self, filter: AlertFilter, page: Pagination) -> Result<PagedResult<Alert>> {
        self.alerts.list(filter, page).await
    }

    /// GetAlertStats (§6): a read-through cache over the repository's
    /// server-side aggregation (§4.2), 5-minute TTL per §4.4.
    pub async fn get_alert_stats(&self, watchlist_id: &WatchlistId) -> Result<AlertStats> {
        let key = cache_keys::alert_stats(watchlist_id.as_str());
        match self.cache.get::<CachedAlertStats>(&key).await {
            Ok(Some(cached)) => return Ok(cached.into()),
            Ok(None) => {}
            Err(err) => warn!(%key, error = %err, "alert_stats cache read failed, falling through"),
        }

        let stats = self.alerts.get_stats(watchlist_id).await?;
        if let Err(err) = self
            .cache
            .set(&key, &CachedAlertStats::from(stats.clone()), cache_keys::ALERT_STATS_TTL)
            .await
        {
            warn!(%key, error = %err, "alert_stats cache write failed");
        }
        Ok(stats)
    }

    pub async fn update_alert_config(&self, watchlist_id: WatchlistId, update: AlertConfigUpdate) {
        self.router.update_alert_config(watchlist_id, update).await;
    }

    /// `FindOverSLA` (§4.2), exposed so the SLA engine (C7) can sweep
    /// without reaching around this engine to hold its own repository
    /// handle.
    pub async fn find_over_sla(&self, now: DateTime<Utc>) -> Result<Vec<Alert>> {
        self.alerts.find_over_sla(now).await
    }

    /// Whether `(patent_number, molecule_id, watchlist_id)` already has a
    /// non-expired duplicate under the current dedup window, without
    /// performing the create — the scan engine (C9) uses this to count
    /// `AlertsCreated` correctly around `create_alert`'s own idempotent
    /// dedup.
    pub async fn find_duplicate(
        &self,
        patent_number: &str,
        molecule_id: &str,
        watchlist_id: &WatchlistId,
        now: DateTime<Utc>,
    ) -> Result<Option<Alert>> {
        let dedup_since = now - self.router.dedup_window().await;
        self.alerts
            .find_duplicate(patent_number, molecule_id, watchlist_id, dedup_since)
            .await
    }

    async fn load(&self, id: &AlertId) -> Result<Alert> {
        self.alerts
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("alert {id}")))
    }

    async fn invalidate_stats_cache(&self, watchlist_id: &WatchlistId) {
        let key = cache_keys::alert_stats(watchlist_id.as_str());
        if let Err(err) = self.cache.delete(&[key.clone()]).await {
            warn!(%key, error = %err, "stats cache invalidation failed (ignored per error taxonomy)");
        }
    }

    /// Dispatches one message per active channel bit (§4.6). A publish
    /// failure on one channel never aborts the others; every failure is
    /// logged and swallowed — the persisted alert is the authoritative
    /// outcome (§4.5, §7).
    async fn dispatch(&self, alert: &Alert, now: DateTime<Utc>) {
        for (_, suffix) in alert.channels.channels() {
            let payload = DispatchPayload {
                alert_id: alert.id.as_str(),
                channel: suffix,
                level: alert.level.to_string(),
                title: format!(
                    "{} similarity match: {} / {}",
                    alert.level, alert.patent_number, alert.molecule_id
                ),
                patent_number: &alert.patent_number,
                molecule_id: &alert.molecule_id,
                assignee_id: alert.assignee_id.as_deref(),
                timestamp: now,
            };
            let topic = crate::ports::event_bus::topics::alert_dispatch(suffix);
            if let Err(err) = self.bus.publish(&topic, alert.id.as_str(), &payload).await {
                warn!(
                    alert_id = %alert.id,
                    channel = suffix,
                    error = %err,
                    "dispatch publish failed (ignored per error taxonomy)"
                );
            }
        }
    }
}

/// JSON-stable mirror of [`AlertStats`] for the cache, since `HashMap<Level,
/// _>`/`HashMap<Status, _>` keys need string representations to round-trip
/// through `serde_json`.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct CachedAlertStats {
    by_status: std::collections::HashMap<String, u64>,
    by_level: std::collections::HashMap<String, u64>,
    avg_response_time_secs: Option<i64>,
    over_sla_count: u64,
}

impl From<AlertStats> for CachedAlertStats {
    fn from(stats: AlertStats) -> Self {
        Self {
            by_status: stats
                .by_status
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            by_level: stats
                .by_level
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            avg_response_time_secs: stats.avg_response_time.map(|d| d.num_seconds()),
            over_sla_count: stats.over_sla_count,
        }
    }
}

impl From<CachedAlertStats> for AlertStats {
    fn from(cached: CachedAlertStats) -> Self {
        use std::str::FromStr;
        Self {
            by_status: cached
                .by_status
                .into_iter()
                .filter_map(|(k, v)| Status::from_str(&k).ok().map(|s| (s, v)))
                .collect(),
            by_level: cached
                .by_level
                .into_iter()
                .filter_map(|(k, v)| Level::from_str(&k).ok().map(|l| (l, v)))
                .collect(),
            avg_response_time: cached.avg_response_time_secs.map(chrono::Duration::seconds),
            over_sla_count: cached.over_sla_count,
        }
    }
}
