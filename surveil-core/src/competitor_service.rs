//! Competitor & Landscape Service (C10, §4.10): tracking, portfolio
//! analysis, landscape aggregation, and pairwise comparison over
//! `TrackedCompetitor` records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use surveil_contracts::prelude::{CompetitorId, WatchlistId};
use surveil_model::TrackedCompetitor;
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::pagination::{PagedResult, Pagination};
use crate::ports::cache::keys as cache_keys;
use crate::ports::event_bus::topics;
use crate::ports::repository::{CompetitorFilter, CompetitorRepository};
use crate::ports::{Cache, CacheExt, EventBus, EventBusExt};

/// `AnalyzeCompetitorPortfolio` result (§4.10). `ipc_breakdown` and `trend`
/// are the spec's literal "placeholders for IPC/trend": `ipc_breakdown` is
/// always empty (IPC classification is a molecular/patent-office concern
/// this core never computes, per §1) and `trend` is always `None` (a
/// single competitor's own history doesn't carry the aggregate signal
/// `LandscapeTrend` needs — that's what `GetCompetitiveLandscape` is for).
/// Both fields exist so a future consumer has a stable shape to populate
/// without an API change.
#[derive(Clone, Debug, PartialEq)]
pub struct CompetitorPortfolio {
    pub competitor_id: CompetitorId,
    pub patent_count: u64,
    pub filing_velocity: f64,
    pub technology_breakdown: Vec<String>,
    pub recent_filings: u64,
    pub ipc_breakdown: Vec<String>,
    pub trend: Option<LandscapeTrend>,
}

/// `GetCompetitiveLandscape` result (§4.10).
#[derive(Clone, Debug, PartialEq)]
pub struct CompetitiveLandscape {
    pub technology_area: String,
    pub total_competitors: u64,
    pub total_patents: u64,
    pub top_filer_patent_count: u64,
    /// `(name, market_share_percent)`, sorted by patent count descending,
    /// truncated to 20.
    pub market_shares: Vec<(String, f64)>,
    pub trend: LandscapeTrend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandscapeTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// `ComparePortfolios` result (§4.10). All three area lists are
/// lexicographically sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioComparison {
    pub overlapping_areas: Vec<String>,
    pub unique_to_a: Vec<String>,
    pub unique_to_b: Vec<String>,
    pub velocity_a: f64,
    pub velocity_b: f64,
}

#[derive(Clone, Serialize)]
struct CompetitorTrackedPayload<'a> {
    competitor_id: &'a str,
    watchlist_id: &'a str,
    name: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Clone, Serialize)]
struct NewFilingPayload<'a> {
    competitor_id: &'a str,
    filing: &'a str,
    timestamp: DateTime<Utc>,
}

pub struct CompetitorService<R, B, C>
where
    R: CompetitorRepository,
    B: EventBus,
    C: Cache,
{
    competitors: R,
    bus: B,
    cache: C,
}

impl<R, B, C> CompetitorService<R, B, C>
where
    R: CompetitorRepository,
    B: EventBus,
    C: Cache,
{
    pub fn new(competitors: R, bus: B, cache: C) -> Self {
        Self {
            competitors,
            bus,
            cache,
        }
    }

    /// `TrackCompetitor` (§4.10). `(name, watchlist_id)` is unique: an
    /// `ARCHIVED` match is reactivated in place rather than duplicated; an
    /// already-`ACTIVE` match is returned unchanged, idempotently.
    pub async fn track_competitor(
        &self,
        name: impl Into<String>,
        watchlist_id: WatchlistId,
        technology_areas: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<TrackedCompetitor> {
        let name = name.into();
        if let Some(mut existing) = self.competitors.find_by_name(&name, &watchlist_id).await? {
            if !existing.is_active() {
                existing.reactivate();
                self.competitors.update(&existing).await?;
                info!(competitor_id = %existing.id, "competitor reactivated");
            }
            return Ok(existing);
        }

        let id = CompetitorId::generate(
            &[&name, watchlist_id.as_str()],
            now.timestamp_nanos_opt().unwrap_or_default(),
        );
        let competitor = TrackedCompetitor::new(id, name, watchlist_id, technology_areas, now);
        self.competitors.save(&competitor).await?;

        let payload = CompetitorTrackedPayload {
            competitor_id: competitor.id.as_str(),
            watchlist_id: competitor.watchlist_id.as_str(),
            name: &competitor.name,
            timestamp: now,
        };
        if let Err(err) = self
            .bus
            .publish(topics::COMPETITOR_TRACKED, competitor.id.as_str(), &payload)
            .await
        {
            warn!(competitor_id = %competitor.id, error = %err, "competitor.tracked publish failed (ignored per error taxonomy)");
        }

        info!(competitor_id = %competitor.id, name = %competitor.name, "competitor tracked");
        Ok(competitor)
    }

    /// `RemoveCompetitor` (§3): archival, never physical deletion.
    pub async fn remove_competitor(&self, id: &CompetitorId) -> Result<()> {
        self.competitors.archive(id).await?;
        info!(competitor_id = %id, "competitor archived");
        Ok(())
    }

    pub async fn list_tracked_competitors(
        &self,
        filter: CompetitorFilter,
        page: Pagination,
    ) -> Result<PagedResult<TrackedCompetitor>> {
        self.competitors.list(filter, page).await
    }

    pub async fn get_competitor_profile(&self, id: &CompetitorId) -> Result<TrackedCompetitor> {
        self.load(id).await
    }

    /// `AnalyzeCompetitorPortfolio` (§4.10): 30-minute read-through cache.
    pub async fn analyze_competitor_portfolio(
        &self,
        id: &CompetitorId,
        now: DateTime<Utc>,
    ) -> Result<CompetitorPortfolio> {
        let key = cache_keys::competitor_portfolio(id.as_str());
        match self.cache.get::<CachedPortfolio>(&key).await {
            Ok(Some(cached)) => return Ok(cached.into_portfolio(id.clone())),
            Ok(None) => {}
            Err(err) => warn!(%key, error = %err, "competitor_portfolio cache read failed, falling through"),
        }

        let competitor = self.load(id).await?;
        let portfolio = CompetitorPortfolio {
            competitor_id: competitor.id.clone(),
            patent_count: competitor.patent_count,
            filing_velocity: competitor.filing_velocity(now),
            technology_breakdown: sorted_unique(&competitor.technology_areas),
            recent_filings: competitor.recent_filings,
            ipc_breakdown: Vec::new(),
            trend: None,
        };

        if let Err(err) = self
            .cache
            .set(&key, &CachedPortfolio::from(&portfolio), cache_keys::COMPETITOR_PORTFOLIO_TTL)
            .await
        {
            warn!(%key, error = %err, "competitor_portfolio cache write failed");
        }
        Ok(portfolio)
    }

    /// `GetCompetitiveLandscape` (§4.10): 1-hour read-through cache over
    /// every `ACTIVE` competitor tracking `area`.
    pub async fn get_competitive_landscape(
        &self,
        area: &str,
        now: DateTime<Utc>,
    ) -> Result<CompetitiveLandscape> {
        let key = cache_keys::competitive_landscape(area);
        match self.cache.get::<CachedLandscape>(&key).await {
            Ok(Some(cached)) => return Ok(cached.into_landscape(area)),
            Ok(None) => {}
            Err(err) => warn!(%key, error = %err, "competitive_landscape cache read failed, falling through"),
        }

        let _ = now;
        let competitors = self.competitors.list_by_technology_area(area).await?;
        let active: Vec<&TrackedCompetitor> = competitors.iter().filter(|c| c.is_active()).collect();

        let total_patents: u64 = active.iter().map(|c| c.patent_count).sum();
        let top_filer_patent_count = active.iter().map(|c| c.patent_count).max().unwrap_or(0);

        let mut market_shares: Vec<(String, f64)> = active
            .iter()
            .map(|c| {
                let share = if total_patents == 0 {
                    0.0
                } else {
                    (c.patent_count as f64 / total_patents as f64) * 100.0
                };
                (c.name.clone(), share)
            })
            .collect();
        market_shares.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        market_shares.truncate(20);

        let filing_fraction = if active.is_empty() {
            0.0
        } else {
            active.iter().filter(|c| c.recent_filings > 0).count() as f64 / active.len() as f64
        };
        let trend = if filing_fraction > 0.6 {
            LandscapeTrend::Increasing
        } else if filing_fraction < 0.3 {
            LandscapeTrend::Decreasing
        } else {
            LandscapeTrend::Stable
        };

        let landscape = CompetitiveLandscape {
            technology_area: area.to_string(),
            total_competitors: active.len() as u64,
            total_patents,
            top_filer_patent_count,
            market_shares,
            trend,
        };

        if let Err(err) = self
            .cache
            .set(&key, &CachedLandscape::from(&landscape), cache_keys::COMPETITIVE_LANDSCAPE_TTL)
            .await
        {
            warn!(%key, error = %err, "competitive_landscape cache write failed");
        }
        Ok(landscape)
    }

    /// `ComparePortfolios` (§4.10): rejects `a == b` as a self-comparison
    /// validation error.
    pub async fn compare_portfolios(
        &self,
        a_id: &CompetitorId,
        b_id: &CompetitorId,
        now: DateTime<Utc>,
    ) -> Result<PortfolioComparison> {
        if a_id == b_id {
            return Err(CoreError::Validation(
                "ComparePortfolios requires two distinct competitors".to_string(),
            ));
        }
        let a = self.load(a_id).await?;
        let b = self.load(b_id).await?;

        let areas_a: BTreeSet<String> = a.technology_areas.iter().cloned().collect();
        let areas_b: BTreeSet<String> = b.technology_areas.iter().cloned().collect();

        let overlapping_areas: Vec<String> = areas_a.intersection(&areas_b).cloned().collect();
        let unique_to_a: Vec<String> = areas_a.difference(&areas_b).cloned().collect();
        let unique_to_b: Vec<String> = areas_b.difference(&areas_a).cloned().collect();

        Ok(PortfolioComparison {
            overlapping_areas,
            unique_to_a,
            unique_to_b,
            velocity_a: a.filing_velocity(now),
            velocity_b: b.filing_velocity(now),
        })
    }

    /// `DetectNewFilings` (§9 open question): idempotent, updates
    /// `LastScanAt`, and emits one `competitor.new_filing` event per entry
    /// in the caller-supplied `candidate_filings` — this core has no direct
    /// line to an external patent feed, so a transport layer (or test) is
    /// expected to supply whatever filings it has already detected.
    pub async fn detect_new_filings(
        &self,
        id: &CompetitorId,
        candidate_filings: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let mut competitor = self.load(id).await?;
        competitor.last_scan_at = Some(now);
        self.competitors.update(&competitor).await?;

        for filing in &candidate_filings {
            let payload = NewFilingPayload {
                competitor_id: id.as_str(),
                filing,
                timestamp: now,
            };
            if let Err(err) = self
                .bus
                .publish(topics::COMPETITOR_NEW_FILING, id.as_str(), &payload)
                .await
            {
                warn!(competitor_id = %id, filing = %filing, error = %err, "competitor.new_filing publish failed (ignored per error taxonomy)");
            }
        }

        Ok(candidate_filings)
    }

    async fn load(&self, id: &CompetitorId) -> Result<TrackedCompetitor> {
        self.competitors
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("competitor {id}")))
    }
}

fn sorted_unique(values: &[String]) -> Vec<String> {
    values.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct CachedPortfolio {
    patent_count: u64,
    filing_velocity: f64,
    technology_breakdown: Vec<String>,
    recent_filings: u64,
    ipc_breakdown: Vec<String>,
    trend: Option<String>,
}

impl From<&CompetitorPortfolio> for CachedPortfolio {
    fn from(portfolio: &CompetitorPortfolio) -> Self {
        Self {
            patent_count: portfolio.patent_count,
            filing_velocity: portfolio.filing_velocity,
            technology_breakdown: portfolio.technology_breakdown.clone(),
            recent_filings: portfolio.recent_filings,
            ipc_breakdown: portfolio.ipc_breakdown.clone(),
            trend: portfolio.trend.map(landscape_trend_to_str),
        }
    }
}

impl CachedPortfolio {
    fn into_portfolio(self, competitor_id: CompetitorId) -> CompetitorPortfolio {
        CompetitorPortfolio {
            competitor_id,
            patent_count: self.patent_count,
            filing_velocity: self.filing_velocity,
            technology_breakdown: self.technology_breakdown,
            recent_filings: self.recent_filings,
            ipc_breakdown: self.ipc_breakdown,
            trend: self.trend.map(|s| landscape_trend_from_str(&s)),
        }
    }
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct CachedLandscape {
    total_competitors: u64,
    total_patents: u64,
    top_filer_patent_count: u64,
    market_shares: Vec<(String, f64)>,
    trend: String,
}

impl From<&CompetitiveLandscape> for CachedLandscape {
    fn from(landscape: &CompetitiveLandscape) -> Self {
        Self {
            total_competitors: landscape.total_competitors,
            total_patents: landscape.total_patents,
            top_filer_patent_count: landscape.top_filer_patent_count,
            market_shares: landscape.market_shares.clone(),
            trend: landscape_trend_to_str(landscape.trend),
        }
    }
}

impl CachedLandscape {
    fn into_landscape(self, area: &str) -> CompetitiveLandscape {
        CompetitiveLandscape {
            technology_area: area.to_string(),
            total_competitors: self.total_competitors,
            total_patents: self.total_patents,
            top_filer_patent_count: self.top_filer_patent_count,
            market_shares: self.market_shares,
            trend: landscape_trend_from_str(&self.trend),
        }
    }
}

fn landscape_trend_to_str(trend: LandscapeTrend) -> String {
    match trend {
        LandscapeTrend::Increasing => "increasing".to_string(),
        LandscapeTrend::Decreasing => "decreasing".to_string(),
        LandscapeTrend::Stable => "stable".to_string(),
    }
}

fn landscape_trend_from_str(s: &str) -> LandscapeTrend {
    match s {
        "increasing" => LandscapeTrend::Increasing,
        "decreasing" => LandscapeTrend::Decreasing,
        _ => LandscapeTrend::Stable,
    }
}
