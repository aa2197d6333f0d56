//! SLA Engine (C7, §4.7): a periodic sweep that auto-escalates `OPEN`
//! alerts that have outlived their level's SLA window.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::alert_lifecycle::AlertLifecycleEngine;
use crate::error::Result;
use crate::ports::{Cache, EventBus};
use crate::ports::repository::AlertRepository;

pub struct SlaEngine<'a, R, B, C>
where
    R: AlertRepository,
    B: EventBus,
    C: Cache,
{
    lifecycle: &'a AlertLifecycleEngine<R, B, C>,
}

impl<'a, R, B, C> SlaEngine<'a, R, B, C>
where
    R: AlertRepository,
    B: EventBus,
    C: Cache,
{
    pub fn new(lifecycle: &'a AlertLifecycleEngine<R, B, C>) -> Self {
        Self { lifecycle }
    }

    /// `MonitorSLACompliance` (§4.7): finds every `OPEN` alert whose elapsed
    /// time exceeds its level's SLA and escalates each one. A single
    /// alert's escalation failing (e.g. a concurrent acknowledge already
    /// moved it out of `OPEN`) does not abort the sweep; it is logged and
    /// the sweep continues to the next candidate. Returns the count of
    /// alerts actually escalated.
    pub async fn process_over_sla_alerts(&self, now: DateTime<Utc>) -> Result<u64> {
        let candidates = self.lifecycle.find_over_sla(now).await?;
        let mut escalated = 0u64;

        for alert in &candidates {
            let elapsed = alert.elapsed_open(now);
            match self
                .lifecycle
                .escalate_alert(
                    &alert.id,
                    format!(
                        "SLA breach: open for {} against a {} limit",
                        format_duration(elapsed),
                        format_duration(chrono::Duration::from_std(alert.level.sla()).unwrap_or_default())
                    ),
                    now,
                )
                .await
            {
                Ok(_) => {
                    escalated += 1;
                    info!(alert_id = %alert.id, level = %alert.level, "alert auto-escalated for SLA breach");
                }
                Err(err) => {
                    warn!(
                        alert_id = %alert.id,
                        error = %err,
                        "SLA escalation failed, leaving alert for the next sweep"
                    );
                }
            }
        }

        Ok(escalated)
    }
}

/// Renders a `chrono::Duration` as whole hours for log messages.
fn format_duration(duration: chrono::Duration) -> String {
    format!("{}h", duration.num_hours())
}
