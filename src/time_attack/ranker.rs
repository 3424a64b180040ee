use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{CompetitionId, Dataset, DriverId, LapId, SessionKind};
use crate::error::{ConfigError, EngineResult};
use crate::laps::{best_per_driver, selection_key, LapContext, LapFilter, LapScope};
use crate::scoring::points_for_rank;
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeAttackEntry {
    pub position: u32,
    pub competition_id: CompetitionId,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub trust_level: u32,
    pub lap_id: LapId,
    pub lap_time: i64,
    pub splits: Option<[i64; 3]>,
    pub session_id: String,
    pub session_date: DateTime<Utc>,
    /// None for the leader
    pub gap_to_previous: Option<i64>,
    pub gap_to_leader: i64,
    /// Signed distance from the field's mean lap time, in ms
    pub deviation_from_average: i64,
    pub points: u32,
    /// Points are frozen once the deadline has passed
    pub finalized: bool,
}

/// Whether a competition's time-attack board is frozen at `now`.
/// A competition without an end date stays live. An offset that moves the
/// deadline out of the representable range is a configuration error.
pub fn is_finalized(
    date_end: Option<DateTime<Utc>>,
    offset: chrono::Duration,
    now: DateTime<Utc>,
) -> Result<bool, ConfigError> {
    let Some(end) = date_end else {
        return Ok(false);
    };
    let deadline = end.checked_sub_signed(offset).ok_or_else(|| {
        ConfigError::Invalid(vec![format!(
            "scoring.time_attack.deadline_offset: deadline before {} is out of range",
            end.to_rfc3339()
        )])
    })?;
    Ok(now > deadline)
}

/// Rank each driver's best time-attack lap of a competition.
pub fn rank_time_attack(
    data: &Dataset,
    competition_id: CompetitionId,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> EngineResult<Vec<TimeAttackEntry>> {
    let competition = data.competition(competition_id)?;
    let table = config.time_attack_table()?;
    let buckets = table.ranges()?;
    let finalized = is_finalized(competition.date_end, table.deadline_offset()?, now)?;

    let filter = LapFilter::all_sessions().kinds(&[SessionKind::TimeAttack]);
    let mut laps: Vec<LapContext> = best_per_driver(data, &LapScope::Competition(competition_id), &filter)?
        .into_values()
        .collect();
    laps.sort_by_key(selection_key);

    let Some(leader) = laps.first().map(|ctx| ctx.lap.lap_time) else {
        tracing::debug!(competition_id, "no time attack laps");
        return Ok(Vec::new());
    };
    let average = (laps.iter().map(|ctx| ctx.lap.lap_time as f64).sum::<f64>() / laps.len() as f64).round() as i64;

    let mut entries = Vec::with_capacity(laps.len());
    let mut previous: Option<i64> = None;
    for (i, ctx) in laps.iter().enumerate() {
        let position = i as u32 + 1;
        let lap_time = ctx.lap.lap_time;
        entries.push(TimeAttackEntry {
            position,
            competition_id,
            driver_id: ctx.driver.driver_id,
            driver_name: ctx.driver.last_name.clone(),
            trust_level: ctx.driver.trust_level,
            lap_id: ctx.lap.lap_id,
            lap_time,
            splits: ctx.lap.splits,
            session_id: ctx.session.session_id.clone(),
            session_date: ctx.session.session_date,
            gap_to_previous: previous.map(|p| lap_time - p),
            gap_to_leader: lap_time - leader,
            deviation_from_average: lap_time - average,
            points: points_for_rank(&buckets, position),
            finalized,
        });
        previous = Some(lap_time);
    }

    tracing::debug!(competition_id, drivers = entries.len(), finalized, "ranked time attack");
    Ok(entries)
}
