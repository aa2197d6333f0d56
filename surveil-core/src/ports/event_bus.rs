//! Event bus port (C3, §4.3): publish-only, topic + partition key + a
//! self-describing JSON payload. Publish failures are the caller's to log
//! and swallow per §7 — this trait's `Result` exists so an adapter can
//! surface the failure to its caller, not so the caller is obligated to
//! propagate it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, Result};

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish_raw(&self, topic: &str, key: &str, payload: Value) -> Result<()>;
}

#[async_trait]
pub trait EventBusExt: EventBus {
    /// Serializes `payload` to JSON and publishes it. Serialization failure
    /// is an internal bug, not a dependency error, so it is reported
    /// distinctly.
    async fn publish<T: Serialize + Sync>(&self, topic: &str, key: &str, payload: &T) -> Result<()> {
        let value = serde_json::to_value(payload)
            .map_err(|err| CoreError::Internal(format!("event payload serialization: {err}")))?;
        self.publish_raw(topic, key, value).await
    }
}

impl<T: EventBus + ?Sized> EventBusExt for T {}

/// Topics the core publishes on, named literally as they appear in §4.3.
pub mod topics {
    pub const ALERT_DISPATCH_IN_APP: &str = "alert.dispatch.in_app";
    pub const ALERT_DISPATCH_EMAIL: &str = "alert.dispatch.email";
    pub const ALERT_DISPATCH_WECHAT: &str = "alert.dispatch.wechat";
    pub const ALERT_DISPATCH_SMS: &str = "alert.dispatch.sms";
    pub const COMPETITOR_TRACKED: &str = "competitor.tracked";
    pub const COMPETITOR_NEW_FILING: &str = "competitor.new_filing";
    pub const WATCHLIST_CREATED: &str = "monitoring.watchlist.created";
    pub const SCAN_COMPLETED: &str = "monitoring.scan.completed";
    pub const RISK_ASSESSED: &str = "risk.assessed";

    /// Maps a dispatch channel's topic suffix (as produced by
    /// `ChannelMask::channels`) to its fully-qualified topic name.
    pub fn alert_dispatch(channel_suffix: &str) -> String {
        format!("alert.dispatch.{channel_suffix}")
    }
}
