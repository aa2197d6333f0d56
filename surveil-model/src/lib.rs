//! Shared data model for the infringement monitoring and alerting core (§3).
//!
//! This crate owns the entity and value types every service in
//! `surveil-core` operates on, plus the invariant checks that belong to the
//! entities themselves rather than to the services that orchestrate them.
//! It has no notion of repositories, event buses, or caches — those are
//! ports defined by `surveil-core`.

pub mod alert;
pub mod competitor;
pub mod enums;
pub mod error;
pub mod quiet_hours;
pub mod scan;
pub mod watchlist;

pub use alert::Alert;
pub use competitor::TrackedCompetitor;
pub use enums::{Level, LifecycleStatus, MatchType, ScanFrequency, Status};
pub use error::ModelError;
pub use quiet_hours::QuietHours;
pub use scan::{ScanMatch, ScanResult};
pub use watchlist::Watchlist;
