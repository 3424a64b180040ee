use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{Dataset, DriverId};
use crate::error::EngineResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatistics {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total_sessions: u32,
    pub official_sessions: u32,
    pub unofficial_sessions: u32,
    pub unique_drivers: u32,
    pub most_used_track: Option<String>,
    pub most_used_track_sessions: u32,
    pub last_session_id: Option<String>,
    pub last_session_date: Option<DateTime<Utc>>,
}

/// Activity summary for sessions starting within `from..=to`.
pub fn session_statistics(data: &Dataset, from: DateTime<Utc>, to: DateTime<Utc>) -> EngineResult<SessionStatistics> {
    let sessions: Vec<_> = data
        .sessions()
        .filter(|s| s.session_date >= from && s.session_date <= to)
        .collect();
    let ids: BTreeSet<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();

    let mut drivers: BTreeSet<DriverId> = BTreeSet::new();
    for lap in data.laps().iter().filter(|l| ids.contains(l.session_id.as_str())) {
        drivers.insert(data.driver(lap.driver_id)?.driver_id);
    }
    for result in data
        .session_results()
        .iter()
        .filter(|r| !r.is_spectator && ids.contains(r.session_id.as_str()))
    {
        drivers.insert(data.driver(result.driver_id)?.driver_id);
    }

    let mut per_track: BTreeMap<&str, u32> = BTreeMap::new();
    for session in &sessions {
        *per_track.entry(session.track_name.as_str()).or_default() += 1;
    }
    // BTreeMap order makes the alphabetically first track win a tie
    let busiest = per_track
        .iter()
        .fold(None, |best: Option<(&str, u32)>, (track, count)| match best {
            Some((_, top)) if top >= *count => best,
            _ => Some((*track, *count)),
        });

    let last = sessions
        .iter()
        .max_by(|a, b| (a.session_date, &b.session_id).cmp(&(b.session_date, &a.session_id)));
    let official = sessions.iter().filter(|s| s.is_official()).count() as u32;

    Ok(SessionStatistics {
        from,
        to,
        total_sessions: sessions.len() as u32,
        official_sessions: official,
        unofficial_sessions: sessions.len() as u32 - official,
        unique_drivers: drivers.len() as u32,
        most_used_track: busiest.map(|(track, _)| track.to_string()),
        most_used_track_sessions: busiest.map(|(_, count)| count).unwrap_or(0),
        last_session_id: last.map(|s| s.session_id.clone()),
        last_session_date: last.map(|s| s.session_date),
    })
}
