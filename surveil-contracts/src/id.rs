//! Deterministic, collision-resistant identity generation (C1).
//!
//! Every entity in this system is identified by an opaque string: a short
//! human-readable prefix followed by hex-encoded leading bytes of a SHA-256
//! digest over the entity's natural key and a nanosecond-precision
//! timestamp. Identical inputs always produce identical output, which the
//! dedup path and the test suite rely on, but the prefix is collision
//! resistant for any input set this system will see in practice. Callers
//! must treat the result as opaque — never parse it for embedded fields.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of leading hash bytes encoded into the id suffix (16 hex chars).
const ID_HASH_BYTES: usize = 8;

/// Hashes `prefix` + `parts` + `timestamp_nanos` and returns `prefix` followed
/// by the hex-encoded leading bytes of the digest.
fn generate_id(prefix: &str, parts: &[&str], timestamp_nanos: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    for part in parts {
        hasher.update(b"\0");
        hasher.update(part.as_bytes());
    }
    hasher.update(b"\0");
    hasher.update(timestamp_nanos.to_be_bytes());
    let digest = hasher.finalize();
    format!("{prefix}{}", hex::encode(&digest[..ID_HASH_BYTES]))
}

macro_rules! opaque_id {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// The short prefix this id type encodes, e.g. `"ALT-"`.
            pub const PREFIX: &'static str = $prefix;

            /// Deterministically derives an id from natural-key parts and a
            /// nanosecond-precision timestamp. Same inputs, same output.
            pub fn generate(parts: &[&str], timestamp_nanos: i64) -> Self {
                Self(generate_id(Self::PREFIX, parts, timestamp_nanos))
            }

            /// Wraps an already-generated or externally-persisted id string
            /// without re-deriving it. Used when rehydrating from storage.
            pub fn from_raw(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from_raw(value)
            }
        }
    };
}

opaque_id!(AlertId, "ALT-", "Opaque identifier for an `Alert`.");
opaque_id!(WatchlistId, "WL-", "Opaque identifier for a `Watchlist`.");
opaque_id!(ScanId, "SCN-", "Opaque identifier for a `ScanResult`.");
opaque_id!(
    CompetitorId,
    "CMP-",
    "Opaque identifier for a `TrackedCompetitor`."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_identical_inputs() {
        let a = AlertId::generate(&["US-001", "MOL-1", "WL-SCAN"], 1_700_000_000_000_000_000);
        let b = AlertId::generate(&["US-001", "MOL-1", "WL-SCAN"], 1_700_000_000_000_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_when_any_component_differs() {
        let base = AlertId::generate(&["US-001", "MOL-1", "WL-SCAN"], 1_700_000_000_000_000_000);
        let diff_key = AlertId::generate(&["US-002", "MOL-1", "WL-SCAN"], 1_700_000_000_000_000_000);
        let diff_time = AlertId::generate(&["US-001", "MOL-1", "WL-SCAN"], 1_700_000_000_000_000_001);
        assert_ne!(base, diff_key);
        assert_ne!(base, diff_time);
    }

    #[test]
    fn distinct_prefixes_never_collide_across_types() {
        let alert = AlertId::generate(&["same"], 1);
        let watchlist = WatchlistId::generate(&["same"], 1);
        assert_ne!(alert.as_str(), watchlist.as_str());
    }

    #[test]
    fn display_matches_as_str() {
        let id = ScanId::generate(&["WL-1"], 42);
        assert_eq!(id.to_string(), id.as_str());
        assert!(id.as_str().starts_with("SCN-"));
    }
}
