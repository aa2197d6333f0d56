//! Channel router (C6, §4.6): severity → channel bitmask, with per-watchlist
//! overrides and timezone-aware quiet-hour suppression.
//!
//! The per-watchlist configuration lives in-process, guarded by a
//! [`tokio::sync::RwLock`] (§5): `resolve_channels` takes the shared lock
//! just long enough to copy out the small override/quiet-hours values it
//! needs, then releases it before doing the (cheap, CPU-only) timezone
//! arithmetic. `update_alert_config` takes the exclusive lock. Neither path
//! ever awaits I/O while holding the lock.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use chrono_tz::Tz;
use surveil_contracts::prelude::{ChannelMask, WatchlistId};
use surveil_config::ChannelRoutingTable;
use surveil_model::{Level, QuietHours};
use tokio::sync::RwLock;
use tracing::warn;

struct RouterState {
    overrides: HashMap<(WatchlistId, Level), ChannelMask>,
    quiet_hours: HashMap<WatchlistId, QuietHours>,
    /// §4.5/§5: the rolling dedup window is process-global, not
    /// per-watchlist, but shares the same exclusive-lock discipline as the
    /// channel/quiet-hours maps.
    dedup_window: ChronoDuration,
}

/// A watchlist's channel-config overrides as accepted by `UpdateAlertConfig`
/// (§6). `None` fields leave the existing configuration untouched, mirroring
/// the partial-update convention §4.8 establishes for watchlists.
#[derive(Clone, Debug, Default)]
pub struct AlertConfigUpdate {
    pub channel_overrides: Option<HashMap<Level, ChannelMask>>,
    pub quiet_hours: Option<QuietHours>,
}

pub struct ChannelRouter {
    default_table: ChannelRoutingTable,
    state: RwLock<RouterState>,
}

impl ChannelRouter {
    pub fn new(default_table: ChannelRoutingTable, dedup_window: ChronoDuration) -> Self {
        Self {
            default_table,
            state: RwLock::new(RouterState {
                overrides: HashMap::new(),
                quiet_hours: HashMap::new(),
                dedup_window,
            }),
        }
    }

    pub async fn dedup_window(&self) -> ChronoDuration {
        self.state.read().await.dedup_window
    }

    pub async fn set_dedup_window(&self, window: ChronoDuration) {
        self.state.write().await.dedup_window = window;
    }

    /// Applies an `UpdateAlertConfig` request for `watchlist_id`.
    pub async fn update_alert_config(&self, watchlist_id: WatchlistId, update: AlertConfigUpdate) {
        let mut state = self.state.write().await;
        if let Some(overrides) = update.channel_overrides {
            for (level, channels) in overrides {
                state
                    .overrides
                    .insert((watchlist_id.clone(), level), channels);
            }
        }
        if let Some(quiet_hours) = update.quiet_hours {
            state.quiet_hours.insert(watchlist_id, quiet_hours);
        }
    }

    /// Resolves the channel bitmask for `level` on `watchlist_id` at `now`,
    /// applying per-watchlist overrides and quiet-hour suppression per
    /// §4.6. `watchlist_id = None` (an unknown/unbound watchlist) falls
    /// straight through to the severity default.
    pub async fn resolve_channels(
        &self,
        watchlist_id: Option<&WatchlistId>,
        level: Level,
        now: DateTime<Utc>,
    ) -> ChannelMask {
        let default = self.default_table.get(level);

        let (base, quiet_hours) = {
            let state = self.state.read().await;
            let base = match watchlist_id {
                Some(id) => state
                    .overrides
                    .get(&(id.clone(), level))
                    .copied()
                    .unwrap_or(default),
                None => default,
            };
            let quiet_hours = watchlist_id.and_then(|id| state.quiet_hours.get(id).cloned());
            (base, quiet_hours)
        };

        if level == Level::Critical {
            return base;
        }

        match quiet_hours {
            Some(qh) if is_quiet_now(&qh, now) => ChannelMask::IN_APP,
            _ => base,
        }
    }
}

/// Whether `now` falls inside `qh`'s local-time window, per §4.6's
/// cross-midnight-aware check. An unparseable timezone name is logged and
/// treated as "not suppressed" — a misconfigured timezone should never
/// silently block a real alert.
fn is_quiet_now(qh: &QuietHours, now: DateTime<Utc>) -> bool {
    if !qh.enabled {
        return false;
    }
    let tz = match Tz::from_str(&qh.timezone) {
        Ok(tz) => tz,
        Err(err) => {
            warn!(timezone = %qh.timezone, error = %err, "unrecognized quiet-hours timezone, skipping suppression");
            return false;
        }
    };
    let local = now.with_timezone(&tz).time();
    qh.contains_local_time(local)
}
