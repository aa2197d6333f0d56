//! Ambient configuration for the infringement monitoring and alerting core.
//!
//! This is deliberately a plain `Debug + Clone` struct with a `Default`
//! impl carrying the literal constants §4 specifies — no CLI wizard, no
//! `.env` bootstrapping, no backend selection. Loading configuration from a
//! file, environment, or flag set is a transport-layer concern the spec
//! places out of scope (§1); what this crate owns is the shape those
//! loaders would populate.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use surveil_contracts::prelude::ChannelMask;
use surveil_model::{Level, ScanFrequency};

/// Default routing table by severity (§4.6's table, before any per-watchlist
/// override is applied).
#[derive(Clone, Debug)]
pub struct ChannelRoutingTable(HashMap<Level, ChannelMask>);

impl ChannelRoutingTable {
    pub fn get(&self, level: Level) -> ChannelMask {
        self.0.get(&level).copied().unwrap_or(ChannelMask::IN_APP)
    }

    pub fn set(&mut self, level: Level, channels: ChannelMask) {
        self.0.insert(level, channels);
    }
}

impl Default for ChannelRoutingTable {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert(Level::Low, ChannelMask::IN_APP);
        table.insert(Level::Medium, ChannelMask::IN_APP | ChannelMask::EMAIL);
        table.insert(
            Level::High,
            ChannelMask::IN_APP | ChannelMask::EMAIL | ChannelMask::WECHAT,
        );
        table.insert(Level::Critical, ChannelMask::ALL);
        Self(table)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Rolling window (§4.5, default 24h) in which a repeat
    /// `(patent, molecule)` match within the same watchlist is deduplicated
    /// against the existing alert rather than creating a new one.
    pub dedup_window: ChronoDuration,
    /// §4.8 default similarity threshold applied when a watchlist creation
    /// request omits one.
    pub default_similarity_threshold: f64,
    /// §4.8 default scan cadence applied when a watchlist creation request
    /// omits one.
    pub default_scan_frequency: ScanFrequency,
    /// §4.6 severity → channel default routing table, overridable per
    /// watchlist via `UpdateAlertConfig`.
    pub default_channels: ChannelRoutingTable,
}

impl Config {
    pub fn sla_for(&self, level: Level) -> Duration {
        level.sla()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dedup_window: ChronoDuration::hours(24),
            default_similarity_threshold: 0.8,
            default_scan_frequency: ScanFrequency::Weekly,
            default_channels: ChannelRoutingTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_literals() {
        let config = Config::default();
        assert_eq!(config.dedup_window, ChronoDuration::hours(24));
        assert_eq!(config.default_similarity_threshold, 0.8);
        assert_eq!(config.default_scan_frequency, ScanFrequency::Weekly);
    }

    #[test]
    fn default_routing_table_matches_severity_table() {
        let table = ChannelRoutingTable::default();
        assert_eq!(table.get(Level::Low), ChannelMask::IN_APP);
        assert_eq!(table.get(Level::Medium), ChannelMask::IN_APP | ChannelMask::EMAIL);
        assert_eq!(
            table.get(Level::High),
            ChannelMask::IN_APP | ChannelMask::EMAIL | ChannelMask::WECHAT
        );
        assert_eq!(table.get(Level::Critical), ChannelMask::ALL);
    }
}
