//! Enumerations shared across the data model, with the small lookup methods
//! (`sla`, `duration`, `from_similarity_score`) that §4 ties to them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Alert severity. Immutable once an alert is created, except that
/// escalation may widen the dispatch channel set (never the level itself).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    /// Maps a similarity score to its severity level per §4.9's
    /// `scoreToLevel` thresholds.
    pub fn from_similarity_score(score: f64) -> Self {
        if score >= 0.95 {
            Level::Critical
        } else if score >= 0.85 {
            Level::High
        } else if score >= 0.70 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    /// Maximum time an alert at this level may remain `OPEN` before the SLA
    /// engine auto-escalates it (§4.7).
    pub fn sla(self) -> Duration {
        match self {
            Level::Critical => Duration::from_secs(2 * 3600),
            Level::High => Duration::from_secs(8 * 3600),
            Level::Medium => Duration::from_secs(24 * 3600),
            Level::Low => Duration::from_secs(72 * 3600),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Low => "LOW",
            Level::Medium => "MEDIUM",
            Level::High => "HIGH",
            Level::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Level::Low),
            "MEDIUM" => Ok(Level::Medium),
            "HIGH" => Ok(Level::High),
            "CRITICAL" => Ok(Level::Critical),
            _ => Err(()),
        }
    }
}

/// Alert lifecycle status (§3, §4.5 state machine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    Acknowledged,
    Dismissed,
    Escalated,
    Resolved,
}

impl Status {
    /// `DISMISSED` and `RESOLVED` are terminal: no command moves an alert
    /// out of either state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Dismissed | Status::Resolved)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Open => "OPEN",
            Status::Acknowledged => "ACKNOWLEDGED",
            Status::Dismissed => "DISMISSED",
            Status::Escalated => "ESCALATED",
            Status::Resolved => "RESOLVED",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Status::Open),
            "ACKNOWLEDGED" => Ok(Status::Acknowledged),
            "DISMISSED" => Ok(Status::Dismissed),
            "ESCALATED" => Ok(Status::Escalated),
            "RESOLVED" => Ok(Status::Resolved),
            _ => Err(()),
        }
    }
}

/// How often a watchlist's scan engine runs (§3, §4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanFrequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl ScanFrequency {
    /// Calendar-day interval each frequency maps to. `BiWeekly` is a strict
    /// 14-day fortnight and `Monthly` a 30-day month; the spec names the
    /// variants without a calendar mapping, and these are the unambiguous
    /// common-usage readings.
    pub fn duration(self) -> chrono::Duration {
        match self {
            ScanFrequency::Daily => chrono::Duration::hours(24),
            ScanFrequency::Weekly => chrono::Duration::days(7),
            ScanFrequency::BiWeekly => chrono::Duration::days(14),
            ScanFrequency::Monthly => chrono::Duration::days(30),
        }
    }
}

impl Default for ScanFrequency {
    fn default() -> Self {
        ScanFrequency::Weekly
    }
}

/// Lifecycle status shared by watchlists and tracked competitors. Archival
/// is the only permitted "deletion" (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Active,
    Paused,
    Archived,
}

/// The kind of structural relationship a scan match represents. The scan
/// engine currently only ever produces `Structural` matches — similarity
/// computation is an external collaborator (§4.9, §9) — but the type is
/// kept open for whatever match classifications that collaborator grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Structural,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Structural => f.write_str("structural"),
        }
    }
}
