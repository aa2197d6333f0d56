//! The `Alert` entity and its lifecycle state machine (§3, §4.5).

use crate::enums::{Level, Status};
use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surveil_contracts::prelude::{AlertId, ChannelMask, WatchlistId};

/// A detected similarity match that has entered the alert lifecycle.
///
/// Mutated exclusively by the owning alert lifecycle engine; every
/// transition method here enforces its own precondition and returns
/// [`ModelError::InvalidTransition`] (or a more specific variant) when the
/// command does not apply to the alert's current status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub patent_number: String,
    pub molecule_id: String,
    pub watchlist_id: WatchlistId,
    pub level: Level,
    pub status: Status,
    pub risk_score: f64,
    pub similarity_score: f64,
    pub channels: ChannelMask,
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub dismiss_reason: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl Alert {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        id: AlertId,
        patent_number: impl Into<String>,
        molecule_id: impl Into<String>,
        watchlist_id: WatchlistId,
        level: Level,
        risk_score: f64,
        similarity_score: f64,
        channels: ChannelMask,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            patent_number: patent_number.into(),
            molecule_id: molecule_id.into(),
            watchlist_id,
            level,
            status: Status::Open,
            risk_score,
            similarity_score,
            channels,
            assignee_id: None,
            created_at,
            acknowledged_at: None,
            dismissed_at: None,
            escalated_at: None,
            resolved_at: None,
            dismiss_reason: None,
            metadata: HashMap::new(),
        }
    }

    /// `(patent_number, molecule_id, watchlist_id)` — the key `FindDuplicate`
    /// and id derivation both use.
    pub fn natural_key(&self) -> (&str, &str, &WatchlistId) {
        (&self.patent_number, &self.molecule_id, &self.watchlist_id)
    }

    pub fn acknowledge(
        &mut self,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ModelError> {
        match self.status {
            Status::Open | Status::Escalated => {
                self.status = Status::Acknowledged;
                self.acknowledged_at = Some(now);
                self.assignee_id = Some(user_id.into());
                Ok(())
            }
            other => Err(ModelError::InvalidTransition {
                from: other.to_string(),
                to: Status::Acknowledged.to_string(),
            }),
        }
    }

    pub fn dismiss(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ModelError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ModelError::MissingDismissReason);
        }
        if self.status.is_terminal() {
            return Err(ModelError::InvalidTransition {
                from: self.status.to_string(),
                to: Status::Dismissed.to_string(),
            });
        }
        self.status = Status::Dismissed;
        self.dismissed_at = Some(now);
        self.dismiss_reason = Some(reason);
        Ok(())
    }

    /// Widens `channels` to the full bitmask, per §3's carve-out that level
    /// and channels are otherwise immutable once set.
    pub fn escalate(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ModelError> {
        if self.status.is_terminal() {
            return Err(ModelError::InvalidTransition {
                from: self.status.to_string(),
                to: Status::Escalated.to_string(),
            });
        }
        self.status = Status::Escalated;
        self.escalated_at = Some(now);
        self.channels = ChannelMask::ALL;
        self.metadata
            .insert("escalation_reason".to_string(), reason.into());
        Ok(())
    }

    pub fn resolve(
        &mut self,
        resolution: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ModelError> {
        match self.status {
            Status::Acknowledged | Status::Escalated => {
                self.status = Status::Resolved;
                self.resolved_at = Some(now);
                self.metadata.insert("resolution".to_string(), resolution.into());
                Ok(())
            }
            other => Err(ModelError::InvalidTransition {
                from: other.to_string(),
                to: Status::Resolved.to_string(),
            }),
        }
    }

    pub fn elapsed_open(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    pub fn is_over_sla(&self, now: DateTime<Utc>) -> bool {
        self.status == Status::Open
            && self.elapsed_open(now).to_std().unwrap_or_default() > self.level.sla()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Alert {
        Alert::open(
            AlertId::generate(&["US-001", "MOL-1", "WL-1"], now.timestamp_nanos_opt().unwrap()),
            "US-001",
            "MOL-1",
            WatchlistId::from_raw("WL-1"),
            Level::High,
            0.9,
            0.9,
            ChannelMask::IN_APP | ChannelMask::EMAIL | ChannelMask::WECHAT,
            now,
        )
    }

    #[test]
    fn open_to_acknowledged_sets_fields() {
        let now = Utc::now();
        let mut alert = sample(now);
        alert.acknowledge("user-1", now).unwrap();
        assert_eq!(alert.status, Status::Acknowledged);
        assert_eq!(alert.acknowledged_at, Some(now));
        assert_eq!(alert.assignee_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn escalated_can_still_be_acknowledged() {
        let now = Utc::now();
        let mut alert = sample(now);
        alert.escalate("auto", now).unwrap();
        alert.acknowledge("user-1", now).unwrap();
        assert_eq!(alert.status, Status::Acknowledged);
    }

    #[test]
    fn dismiss_requires_non_empty_reason() {
        let now = Utc::now();
        let mut alert = sample(now);
        let err = alert.dismiss("   ", now).unwrap_err();
        assert_eq!(err, ModelError::MissingDismissReason);
        assert_eq!(alert.status, Status::Open);
    }

    #[test]
    fn escalate_widens_channels_to_full_mask() {
        let now = Utc::now();
        let mut alert = sample(now);
        alert.escalate("over sla", now).unwrap();
        assert_eq!(alert.channels, ChannelMask::ALL);
        assert_eq!(alert.status, Status::Escalated);
        assert!(alert.escalated_at.is_some());
    }

    #[test]
    fn no_transitions_out_of_dismissed_or_resolved() {
        let now = Utc::now();
        let mut alert = sample(now);
        alert.dismiss("not relevant", now).unwrap();
        assert!(alert.escalate("x", now).is_err());
        assert!(alert.acknowledge("u", now).is_err());
        assert!(alert.resolve("x", now).is_err());

        let mut alert = sample(now);
        alert.acknowledge("u", now).unwrap();
        alert.resolve("fixed", now).unwrap();
        assert!(alert.escalate("x", now).is_err());
        assert!(alert.dismiss("x", now).is_err());
    }

    #[test]
    fn resolve_requires_acknowledged_or_escalated() {
        let now = Utc::now();
        let mut alert = sample(now);
        assert!(alert.resolve("too soon", now).is_err());
    }
}
