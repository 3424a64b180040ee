use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::track::{all_track_records, record_filter, track_record};
use crate::data::{ChampionshipId, Dataset, DriverId, LapId};
use crate::error::EngineResult;
use crate::laps::{best_by, laps_in_scope, LapScope};
use crate::scoring::{participation_status, ParticipationStatus, ScoringConfig};
use crate::standings::aggregate_championship;

/// A driver's best lap on one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalBest {
    pub track_name: String,
    pub lap_id: LapId,
    pub lap_time: i64,
    pub splits: Option<[i64; 3]>,
    pub session_id: String,
    pub session_type: String,
    pub session_date: DateTime<Utc>,
    /// Laps on this track that could have been a best
    pub valid_laps: u32,
    /// The personal best is also the track record under the same mode
    pub is_record: bool,
}

/// Personal bests per track, most recent first.
pub fn driver_best_times(data: &Dataset, driver_id: DriverId, official_only: bool) -> EngineResult<Vec<PersonalBest>> {
    data.driver(driver_id)?;
    let laps = laps_in_scope(data, &LapScope::Driver(driver_id), &record_filter(official_only))?;

    let mut valid: BTreeMap<&str, u32> = BTreeMap::new();
    for ctx in laps.iter().filter(|ctx| ctx.counts_for_best()) {
        *valid.entry(ctx.session.track_name.as_str()).or_default() += 1;
    }

    let mut bests = Vec::new();
    for (track, ctx) in best_by(laps.iter().copied(), |ctx| ctx.session.track_name.clone()) {
        let record = track_record(data, &track, official_only)?;
        bests.push(PersonalBest {
            valid_laps: valid.get(track.as_str()).copied().unwrap_or(0),
            is_record: record.is_some_and(|r| r.lap.lap_id == ctx.lap.lap_id),
            track_name: track,
            lap_id: ctx.lap.lap_id,
            lap_time: ctx.lap.lap_time,
            splits: ctx.lap.splits,
            session_id: ctx.session.session_id.clone(),
            session_type: ctx.session.session_type.clone(),
            session_date: ctx.session.session_date,
        });
    }
    bests.sort_by(|a, b| {
        b.session_date
            .cmp(&a.session_date)
            .then_with(|| a.track_name.cmp(&b.track_name))
    });

    tracing::debug!(driver_id, tracks = bests.len(), official_only, "driver best times");
    Ok(bests)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverProfile {
    pub driver_id: DriverId,
    pub driver_name: String,
    pub short_name: Option<String>,
    pub trust_level: u32,
    pub bad_driver_reports: u32,
    pub total_sessions: u32,
    pub official_sessions: u32,
    pub tracks_driven: u32,
    pub total_laps: u32,
    pub records_held: u32,
    pub championships_entered: u32,
    pub titles: u32,
    pub wins: u32,
    pub podiums: u32,
    pub poles: u32,
}

/// Career summary. Titles are championship wins of completed championships.
pub fn driver_profile(data: &Dataset, driver_id: DriverId, config: &ScoringConfig) -> EngineResult<DriverProfile> {
    let driver = data.driver(driver_id)?;

    let mut session_ids: BTreeSet<&str> = data
        .laps()
        .iter()
        .filter(|l| l.driver_id == driver_id)
        .map(|l| l.session_id.as_str())
        .collect();
    session_ids.extend(
        data.session_results()
            .iter()
            .filter(|r| r.driver_id == driver_id && !r.is_spectator)
            .map(|r| r.session_id.as_str()),
    );

    let mut official_sessions = 0;
    let mut tracks = BTreeSet::new();
    for id in &session_ids {
        let session = data.session(id)?;
        if session.is_official() {
            official_sessions += 1;
        }
        tracks.insert(session.track_name.as_str());
    }

    let records_held = all_track_records(data, false)?
        .iter()
        .filter(|r| r.lap.driver_id == driver_id)
        .count() as u32;

    let mut profile = DriverProfile {
        driver_id,
        driver_name: driver.last_name.clone(),
        short_name: driver.short_name.clone(),
        trust_level: driver.trust_level,
        bad_driver_reports: driver.bad_driver_reports,
        total_sessions: session_ids.len() as u32,
        official_sessions,
        tracks_driven: tracks.len() as u32,
        total_laps: data.laps().iter().filter(|l| l.driver_id == driver_id).count() as u32,
        records_held,
        championships_entered: 0,
        titles: 0,
        wins: 0,
        podiums: 0,
        poles: 0,
    };

    for championship in data.championships() {
        if !took_part(data, championship.championship_id, driver_id)? {
            continue;
        }
        let standings = aggregate_championship(data, championship.championship_id, config)?;
        if let Some(row) = standings.iter().find(|s| s.driver_id == driver_id) {
            profile.championships_entered += 1;
            profile.wins += row.wins;
            profile.podiums += row.podiums;
            profile.poles += row.poles;
            if row.position == 1 && championship.is_completed {
                profile.titles += 1;
            }
        }
    }

    Ok(profile)
}

/// Whether the driver has a result in any round of the championship
fn took_part(data: &Dataset, championship_id: ChampionshipId, driver_id: DriverId) -> EngineResult<bool> {
    for round in data.championship_rounds(championship_id) {
        if participation_status(data, round.competition_id, driver_id)? != ParticipationStatus::Absent {
            return Ok(true);
        }
    }
    Ok(false)
}
