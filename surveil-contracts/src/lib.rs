//! Identity generation and small cross-cutting helpers shared by the rest of
//! the infringement monitoring and alerting workspace.
//!
//! This crate sits below `surveil-model`: it has no notion of an alert or a
//! watchlist, only the primitives every layer above it needs — opaque
//! deterministic identifiers (C1) and the dispatch channel bitmask used by
//! both the data model and the channel router.

pub mod channel;
pub mod id;

pub mod prelude {
    pub use crate::channel::ChannelMask;
    pub use crate::id::{AlertId, CompetitorId, ScanId, WatchlistId};
}
