//! Abstract persistence, eventing, caching, and similarity-lookup contracts
//! consumed by the core (§4.2, §4.3, §4.4, §6).
//!
//! Implementations live outside this crate (a relational store, a message
//! bus, a key-value cache, a fingerprinting/GNN service). Only in-memory
//! reference adapters exist here, and only under `#[cfg(test)]`, to exercise
//! the engines in isolation — see `surveil_core::testing`.

pub mod cache;
pub mod event_bus;
pub mod repository;
pub mod similarity;

pub use cache::{Cache, CacheExt};
pub use event_bus::EventBus;
pub use repository::{
    AlertFilter, AlertRepository, AlertStats, CompetitorFilter, CompetitorRepository,
    ScanResultRepository, WatchlistFilter, WatchlistRepository,
};
pub use similarity::SimilarityService;
