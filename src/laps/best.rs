use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::filter::{laps_in_scope, LapContext, LapFilter, LapScope};
use crate::data::{CompetitionId, Dataset, DriverId, LapId};
use crate::error::EngineResult;

/// A selected best lap, flattened for consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestLap {
    pub lap_id: LapId,
    pub lap_time: i64,
    pub splits: Option<[i64; 3]>,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub session_id: String,
    pub session_type: String,
    pub session_date: DateTime<Utc>,
    pub track_name: String,
    pub competition_id: Option<CompetitionId>,
}

impl From<LapContext<'_>> for BestLap {
    fn from(ctx: LapContext<'_>) -> Self {
        Self {
            lap_id: ctx.lap.lap_id,
            lap_time: ctx.lap.lap_time,
            splits: ctx.lap.splits,
            driver_id: ctx.driver.driver_id,
            driver_name: ctx.driver.last_name.clone(),
            session_id: ctx.session.session_id.clone(),
            session_type: ctx.session.session_type.clone(),
            session_date: ctx.session.session_date,
            track_name: ctx.session.track_name.clone(),
            competition_id: ctx.session.competition_id,
        }
    }
}

/// Ordering used everywhere a single lap must win: fastest, then earliest
/// session, then lowest driver id, then lowest lap id.
pub fn selection_key(ctx: &LapContext) -> (i64, DateTime<Utc>, DriverId, LapId) {
    (
        ctx.lap.lap_time,
        ctx.session.session_date,
        ctx.driver.driver_id,
        ctx.lap.lap_id,
    )
}

/// Pick the best eligible lap, or None when nothing qualifies.
pub fn select_best<'a, I>(candidates: I) -> Option<LapContext<'a>>
where
    I: IntoIterator<Item = LapContext<'a>>,
{
    candidates
        .into_iter()
        .filter(|ctx| ctx.counts_for_best())
        .min_by_key(selection_key)
}

/// Best eligible lap of each key, e.g. per driver or per track.
pub fn best_by<'a, K, I, F>(candidates: I, key: F) -> BTreeMap<K, LapContext<'a>>
where
    K: Ord,
    I: IntoIterator<Item = LapContext<'a>>,
    F: Fn(&LapContext<'a>) -> K,
{
    let mut best: BTreeMap<K, LapContext<'a>> = BTreeMap::new();
    for ctx in candidates.into_iter().filter(|c| c.counts_for_best()) {
        let k = key(&ctx);
        match best.get(&k) {
            Some(current) if selection_key(current) <= selection_key(&ctx) => {}
            _ => {
                best.insert(k, ctx);
            }
        }
    }
    best
}

/// Best valid lap for a scope under the given filter. `Ok(None)` means no data.
pub fn best_lap(data: &Dataset, scope: &LapScope, filter: &LapFilter) -> EngineResult<Option<BestLap>> {
    let candidates = laps_in_scope(data, scope, filter)?;
    let best = select_best(candidates).map(BestLap::from);
    tracing::debug!(?scope, found = best.is_some(), "best lap lookup");
    Ok(best)
}

/// Best valid lap of every driver in scope
pub fn best_per_driver<'a>(
    data: &'a Dataset,
    scope: &LapScope,
    filter: &LapFilter,
) -> EngineResult<BTreeMap<DriverId, LapContext<'a>>> {
    let candidates = laps_in_scope(data, scope, filter)?;
    Ok(best_by(candidates, |ctx| ctx.driver.driver_id))
}

/// Best valid lap of every (driver, session) pair in scope
pub fn best_per_driver_session<'a>(
    data: &'a Dataset,
    scope: &LapScope,
    filter: &LapFilter,
) -> EngineResult<BTreeMap<(DriverId, String), LapContext<'a>>> {
    let candidates = laps_in_scope(data, scope, filter)?;
    Ok(best_by(candidates, |ctx| {
        (ctx.driver.driver_id, ctx.session.session_id.clone())
    }))
}
