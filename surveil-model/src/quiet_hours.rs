//! Per-watchlist quiet-hours configuration (§3, §4.6): a daily window during
//! which non-`CRITICAL` dispatches are narrowed to `IN_APP` only.
//!
//! The window is stored as naive local time-of-day plus an IANA timezone
//! name; resolving "is `now` inside the window" requires interpreting that
//! timezone, which needs `chrono-tz` — a concern of the channel router in
//! `surveil-core`, not of this value type.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// IANA timezone name, e.g. `"America/New_York"`.
    pub timezone: String,
}

impl QuietHours {
    pub fn new(start: NaiveTime, end: NaiveTime, timezone: impl Into<String>) -> Self {
        Self {
            enabled: true,
            start,
            end,
            timezone: timezone.into(),
        }
    }

    /// Whether `start..end` wraps across midnight, e.g. `22:00..07:00`.
    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Pure window-membership check against a local time-of-day. Timezone
    /// conversion from an absolute instant happens in the caller.
    pub fn contains_local_time(&self, local: NaiveTime) -> bool {
        if !self.enabled {
            return false;
        }
        if self.crosses_midnight() {
            local >= self.start || local < self.end
        } else {
            local >= self.start && local < self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn cross_midnight_window_suppresses_late_and_early() {
        let qh = QuietHours::new(hms(22, 0), hms(7, 0), "America/New_York");
        assert!(qh.contains_local_time(hms(23, 30)));
        assert!(qh.contains_local_time(hms(3, 0)));
        assert!(!qh.contains_local_time(hms(12, 0)));
    }

    #[test]
    fn disabled_window_never_suppresses() {
        let mut qh = QuietHours::new(hms(22, 0), hms(7, 0), "UTC");
        qh.enabled = false;
        assert!(!qh.contains_local_time(hms(23, 30)));
    }

    #[test]
    fn same_day_window() {
        let qh = QuietHours::new(hms(9, 0), hms(17, 0), "UTC");
        assert!(qh.contains_local_time(hms(12, 0)));
        assert!(!qh.contains_local_time(hms(20, 0)));
        assert!(!qh.contains_local_time(hms(8, 0)));
    }
}
