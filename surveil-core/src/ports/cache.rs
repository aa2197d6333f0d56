//! Cache port (C4, §4.4): typed get/set/delete of derived views with TTL.
//! A miss is `Ok(None)`, never an error — the application layer treats the
//! cache purely as an accelerator.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CoreError, Result};

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    async fn delete(&self, keys: &[String]) -> Result<()>;
}

#[async_trait]
pub trait CacheExt: Cache {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).map_err(|err| {
                    CoreError::Internal(format!("cache value deserialization for {key}: {err}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|err| {
            CoreError::Internal(format!("cache value serialization for {key}: {err}"))
        })?;
        self.set_raw(key, raw, ttl).await
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}

/// Cache key builders and TTLs for the four derived views the core keeps
/// (§4.4).
pub mod keys {
    use std::time::Duration;

    pub fn competitor_portfolio(competitor_id: &str) -> String {
        format!("competitor_portfolio:{competitor_id}")
    }
    pub const COMPETITOR_PORTFOLIO_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn competitive_landscape(area: &str) -> String {
        format!("competitive_landscape:{area}")
    }
    pub const COMPETITIVE_LANDSCAPE_TTL: Duration = Duration::from_secs(60 * 60);

    pub fn alert_stats(watchlist_id: &str) -> String {
        format!("alert_stats:{watchlist_id}")
    }
    pub const ALERT_STATS_TTL: Duration = Duration::from_secs(5 * 60);

    pub fn risk_assess(sha256_prefix: &str) -> String {
        format!("risk:assess:{sha256_prefix}")
    }
    pub const RISK_ASSESS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
}
