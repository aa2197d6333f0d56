//! Core services for the infringement monitoring and alerting platform.
//!
//! This crate owns the domain logic — alert lifecycle, channel routing, SLA
//! sweeps, watchlist scheduling and scan execution, competitor and landscape
//! analytics — behind the port traits in [`ports`]. It never talks to a
//! concrete datastore, message bus, cache, or similarity backend directly;
//! adapters for those live outside this crate and are wired in by whatever
//! binary assembles the system.

pub mod alert_lifecycle;
pub mod competitor_service;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod scan_engine;
pub mod sla;
pub mod watchlist_manager;

#[cfg(test)]
pub mod testing;

pub use alert_lifecycle::{AlertConfigUpdate, AlertLifecycleEngine, ChannelRouter, CreateAlertRequest};
pub use competitor_service::{
    CompetitiveLandscape, CompetitorPortfolio, CompetitorService, LandscapeTrend, PortfolioComparison,
};
pub use error::{CoreError, Result};
pub use pagination::{PagedResult, Pagination};
pub use scan_engine::ScanEngine;
pub use sla::SlaEngine;
pub use watchlist_manager::{CreateWatchlistRequest, UpdateWatchlistRequest, WatchlistManager};
