//! Scan Engine (C9, §4.9): executes one watchlist scan over the
//! (patent × molecule) Cartesian product, feeding matches above threshold
//! into the Alert Lifecycle Engine (C5).

use chrono::{DateTime, Utc};
use serde::Serialize;
use surveil_contracts::prelude::{ScanId, WatchlistId};
use surveil_model::{Level, MatchType, ScanMatch, ScanResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alert_lifecycle::{AlertLifecycleEngine, CreateAlertRequest};
use crate::error::Result;
use crate::pagination::{PagedResult, Pagination};
use crate::ports::event_bus::topics;
use crate::ports::repository::{AlertRepository, ScanResultRepository, WatchlistRepository};
use crate::ports::similarity::SimilarityService;
use crate::ports::{Cache, EventBus, EventBusExt};

/// §4.9's fixed fusion of a raw similarity score into the risk score
/// `CreateAlert` persists on each matching alert.
const RISK_SCORE_FACTOR: f64 = 0.95;

#[derive(Clone, Serialize)]
struct ScanCompletedPayload<'a> {
    scan_id: &'a str,
    watchlist_id: &'a str,
    patents_scanned: u64,
    molecules_scanned: u64,
    matches_found: u64,
    alerts_created: u64,
    duration_ms: i64,
    timestamp: DateTime<Utc>,
}

pub struct ScanEngine<'a, WR, SR, SIM, R, B, C, EB>
where
    WR: WatchlistRepository,
    SR: ScanResultRepository,
    SIM: SimilarityService,
    R: AlertRepository,
    B: EventBus,
    C: Cache,
    EB: EventBus,
{
    watchlists: WR,
    scans: SR,
    similarity: SIM,
    lifecycle: &'a AlertLifecycleEngine<R, B, C>,
    bus: EB,
}

impl<'a, WR, SR, SIM, R, B, C, EB> ScanEngine<'a, WR, SR, SIM, R, B, C, EB>
where
    WR: WatchlistRepository,
    SR: ScanResultRepository,
    SIM: SimilarityService,
    R: AlertRepository,
    B: EventBus,
    C: Cache,
    EB: EventBus,
{
    pub fn new(
        watchlists: WR,
        scans: SR,
        similarity: SIM,
        lifecycle: &'a AlertLifecycleEngine<R, B, C>,
        bus: EB,
    ) -> Self {
        Self {
            watchlists,
            scans,
            similarity,
            lifecycle,
            bus,
        }
    }

    /// `RunScan` (§4.9): rejects watchlists that are not `ACTIVE`; otherwise
    /// walks the Cartesian product of patents and molecules in the order the
    /// watchlist stores them, creating an alert for every match at or above
    /// `watchlist.similarity_threshold`. A single pair's similarity lookup
    /// failure is logged and skipped; it never aborts the scan.
    pub async fn run_scan(&self, watchlist_id: &WatchlistId, now: DateTime<Utc>) -> Result<ScanResult> {
        let mut watchlist = self
            .watchlists
            .find_by_id(watchlist_id)
            .await?
            .ok_or_else(|| crate::error::CoreError::NotFound(format!("watchlist {watchlist_id}")))?;

        if !watchlist.is_active() {
            return Err(crate::error::CoreError::Validation(format!(
                "watchlist {watchlist_id} is not ACTIVE"
            )));
        }

        let scan_id = ScanId::generate(
            &[watchlist_id.as_str(), &Uuid::now_v7().to_string()],
            now.timestamp_nanos_opt().unwrap_or_default(),
        );
        let mut result = ScanResult::started(scan_id, watchlist_id.clone(), now);
        result.patents_scanned = watchlist.patent_numbers.len() as u64;
        result.molecules_scanned = watchlist.molecule_ids.len() as u64;

        let mut alerts_created = 0u64;
        for patent in &watchlist.patent_numbers {
            for molecule in &watchlist.molecule_ids {
                let score = match self.similarity.similarity(patent, molecule).await {
                    Ok(score) => score,
                    Err(err) => {
                        warn!(
                            watchlist_id = %watchlist_id,
                            patent_number = %patent,
                            molecule_id = %molecule,
                            error = %err,
                            "similarity lookup failed, skipping pair"
                        );
                        continue;
                    }
                };

                debug!(patent_number = %patent, molecule_id = %molecule, score, "similarity computed");
                if score < watchlist.similarity_threshold {
                    continue;
                }

                let risk_score = score * RISK_SCORE_FACTOR;
                result.record_match(ScanMatch {
                    patent_number: patent.clone(),
                    molecule_id: molecule.clone(),
                    similarity_score: score,
                    risk_score,
                    match_type: MatchType::Structural,
                });

                let already_duplicate = self
                    .lifecycle
                    .find_duplicate(patent, molecule, watchlist_id, now)
                    .await?
                    .is_some();

                let alert = self
                    .lifecycle
                    .create_alert(
                        CreateAlertRequest {
                            patent_number: patent.clone(),
                            molecule_id: molecule.clone(),
                            watchlist_id: watchlist_id.clone(),
                            level: Level::from_similarity_score(score),
                            similarity_score: score,
                            risk_score,
                        },
                        now,
                    )
                    .await?;

                if !already_duplicate {
                    alerts_created += 1;
                    info!(alert_id = %alert.id, patent_number = %patent, molecule_id = %molecule, "match raised an alert");
                }
            }
        }

        let completed_at = now;
        result.finish(completed_at, alerts_created);
        self.scans.save(&result).await?;

        watchlist.record_scan(completed_at, alerts_created);
        self.watchlists.update(&watchlist).await?;

        let payload = ScanCompletedPayload {
            scan_id: result.id.as_str(),
            watchlist_id: watchlist_id.as_str(),
            patents_scanned: result.patents_scanned,
            molecules_scanned: result.molecules_scanned,
            matches_found: result.matches_found,
            alerts_created: result.alerts_created,
            duration_ms: result.duration().map(|d| d.num_milliseconds()).unwrap_or(0),
            timestamp: completed_at,
        };
        if let Err(err) = self
            .bus
            .publish(topics::SCAN_COMPLETED, result.id.as_str(), &payload)
            .await
        {
            warn!(scan_id = %result.id, error = %err, "scan.completed publish failed (ignored per error taxonomy)");
        }

        info!(
            scan_id = %result.id,
            watchlist_id = %watchlist_id,
            matches_found = result.matches_found,
            alerts_created = result.alerts_created,
            "scan completed"
        );
        Ok(result)
    }

    /// `RunScheduledScans` (§4.9): scans every `ACTIVE` watchlist due per
    /// `FindDueForScan(now)`. A single watchlist's failure is logged and
    /// does not abort the sweep. Returns the number of scans actually run.
    pub async fn run_scheduled_scans(&self, now: DateTime<Utc>) -> Result<u64> {
        let due = self.watchlists.find_due_for_scan(now).await?;
        let mut executed = 0u64;

        for watchlist in due.iter().filter(|w| w.is_active()) {
            match self.run_scan(&watchlist.id, now).await {
                Ok(_) => executed += 1,
                Err(err) => {
                    warn!(watchlist_id = %watchlist.id, error = %err, "scheduled scan failed, continuing sweep");
                }
            }
        }

        Ok(executed)
    }

    pub async fn get_scan_history(
        &self,
        watchlist_id: &WatchlistId,
        page: Pagination,
    ) -> Result<PagedResult<ScanResult>> {
        self.scans.list_by_watchlist(watchlist_id, page).await
    }
}
