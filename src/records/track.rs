use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{Dataset, DriverId, LapId};
use crate::error::EngineResult;
use crate::laps::{best_by, best_lap, best_per_driver, laps_in_scope, selection_key, BestLap, LapFilter, LapScope};

/// Records use official sessions by registered drivers; the open mode looks
/// at every session and every driver.
pub fn record_filter(official_only: bool) -> LapFilter {
    if official_only {
        LapFilter::official_trusted()
    } else {
        LapFilter::all_sessions()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub official_only: bool,
    #[serde(flatten)]
    pub lap: BestLap,
}

/// The single best lap ever set on a track, or None if nobody has one.
pub fn track_record(data: &Dataset, track: &str, official_only: bool) -> EngineResult<Option<TrackRecord>> {
    let lap = best_lap(data, &LapScope::Track(track.to_string()), &record_filter(official_only))?;
    Ok(lap.map(|lap| TrackRecord { official_only, lap }))
}

/// Every track's record under a mode, fastest first
pub fn all_track_records(data: &Dataset, official_only: bool) -> EngineResult<Vec<TrackRecord>> {
    let candidates = laps_in_scope(data, &LapScope::All, &record_filter(official_only))?;
    let mut best: Vec<_> = best_by(candidates, |ctx| ctx.session.track_name.clone())
        .into_values()
        .collect();
    best.sort_by_key(|ctx| (selection_key(ctx), ctx.session.track_name.clone()));
    Ok(best
        .into_iter()
        .map(|ctx| TrackRecord {
            official_only,
            lap: BestLap::from(ctx),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub position: u32,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub trust_level: u32,
    pub lap_id: LapId,
    pub lap_time: i64,
    pub gap_to_leader: i64,
    pub session_id: String,
    pub session_type: String,
    pub session_date: DateTime<Utc>,
}

/// Each driver's best on a track, ranked. `limit` caps the number of rows.
pub fn track_leaderboard(
    data: &Dataset,
    track: &str,
    official_only: bool,
    limit: Option<usize>,
) -> EngineResult<Vec<LeaderboardEntry>> {
    let mut best: Vec<_> = best_per_driver(data, &LapScope::Track(track.to_string()), &record_filter(official_only))?
        .into_values()
        .collect();
    best.sort_by_key(selection_key);

    let leader = best.first().map(|ctx| ctx.lap.lap_time).unwrap_or_default();
    Ok(best
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, ctx)| LeaderboardEntry {
            position: i as u32 + 1,
            driver_id: ctx.driver.driver_id,
            driver_name: ctx.driver.last_name.clone(),
            trust_level: ctx.driver.trust_level,
            lap_id: ctx.lap.lap_id,
            lap_time: ctx.lap.lap_time,
            gap_to_leader: ctx.lap.lap_time - leader,
            session_id: ctx.session.session_id.clone(),
            session_type: ctx.session.session_type.clone(),
            session_date: ctx.session.session_date,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackStatistics {
    pub track_name: String,
    pub sessions: u32,
    pub official_sessions: u32,
    pub unique_drivers: u32,
    pub total_laps: u32,
    pub valid_laps: u32,
    pub best_lap: Option<i64>,
    pub average_valid_lap: Option<i64>,
    pub record: Option<TrackRecord>,
    pub last_session: Option<DateTime<Utc>>,
}

/// Usage figures for one track. None when no session ran there.
///
/// Counts cover every lap on the track; only the record follows the mode.
pub fn track_statistics(data: &Dataset, track: &str, official_only: bool) -> EngineResult<Option<TrackStatistics>> {
    let sessions: Vec<_> = data.sessions().filter(|s| s.track_name == track).collect();
    if sessions.is_empty() {
        return Ok(None);
    }

    let laps = laps_in_scope(data, &LapScope::Track(track.to_string()), &LapFilter::all_sessions())?;
    let drivers: BTreeSet<DriverId> = laps.iter().map(|ctx| ctx.driver.driver_id).collect();
    let valid: Vec<i64> = laps
        .iter()
        .filter(|ctx| ctx.counts_for_best())
        .map(|ctx| ctx.lap.lap_time)
        .collect();
    let average_valid_lap = if valid.is_empty() {
        None
    } else {
        Some((valid.iter().map(|&t| t as f64).sum::<f64>() / valid.len() as f64).round() as i64)
    };

    Ok(Some(TrackStatistics {
        track_name: track.to_string(),
        sessions: sessions.len() as u32,
        official_sessions: sessions.iter().filter(|s| s.is_official()).count() as u32,
        unique_drivers: drivers.len() as u32,
        total_laps: laps.len() as u32,
        valid_laps: valid.len() as u32,
        best_lap: valid.iter().copied().min(),
        average_valid_lap,
        record: track_record(data, track, official_only)?,
        last_session: sessions.iter().map(|s| s.session_date).max(),
    }))
}
