use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{
    Championship, ChampionshipId, Competition, CompetitionId, Driver, DriverId, Lap, League,
    LeagueId, ManualPenalty, PointsAdjustment, Session, SessionResult,
};
use crate::error::InputError;

/// On-disk shape of the engine's input: plain lists, one per record type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetFile {
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub laps: Vec<Lap>,
    #[serde(default)]
    pub session_results: Vec<SessionResult>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
    #[serde(default)]
    pub championships: Vec<Championship>,
    #[serde(default)]
    pub leagues: Vec<League>,
    #[serde(default)]
    pub adjustments: Vec<PointsAdjustment>,
    #[serde(default)]
    pub manual_penalties: Vec<ManualPenalty>,
}

/// Read-only, id-indexed snapshot of every record the engine consumes.
///
/// All maps are ordered so iteration (and therefore every ranked output) is
/// identical across runs.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    drivers: BTreeMap<DriverId, Driver>,
    sessions: BTreeMap<String, Session>,
    competitions: BTreeMap<CompetitionId, Competition>,
    championships: BTreeMap<ChampionshipId, Championship>,
    leagues: BTreeMap<LeagueId, League>,
    laps: Vec<Lap>,
    session_results: Vec<SessionResult>,
    adjustments: Vec<PointsAdjustment>,
    manual_penalties: Vec<ManualPenalty>,
}

fn index_by<K, V>(
    kind: &'static str,
    items: Vec<V>,
    key: impl Fn(&V) -> K,
) -> Result<BTreeMap<K, V>, InputError>
where
    K: Ord + ToString,
{
    let mut map = BTreeMap::new();
    for item in items {
        let k = key(&item);
        if map.contains_key(&k) {
            return Err(InputError::DuplicateId {
                kind,
                id: k.to_string(),
            });
        }
        map.insert(k, item);
    }
    Ok(map)
}

impl Dataset {
    /// Index a loaded file. Fails only on duplicate ids; dangling references
    /// surface from the computation that needs them (or `check_integrity`).
    pub fn new(file: DatasetFile) -> Result<Self, InputError> {
        let mut laps = file.laps;
        laps.sort_by_key(|l| l.lap_id);
        if let Some(pair) = laps.windows(2).find(|w| w[0].lap_id == w[1].lap_id) {
            return Err(InputError::DuplicateId {
                kind: "lap",
                id: pair[0].lap_id.to_string(),
            });
        }

        Ok(Self {
            drivers: index_by("driver", file.drivers, |d| d.driver_id)?,
            sessions: index_by("session", file.sessions, |s| s.session_id.clone())?,
            competitions: index_by("competition", file.competitions, |c| c.competition_id)?,
            championships: index_by("championship", file.championships, |c| c.championship_id)?,
            leagues: index_by("league", file.leagues, |l| l.league_id)?,
            laps,
            session_results: file.session_results,
            adjustments: file.adjustments,
            manual_penalties: file.manual_penalties,
        })
    }

    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn session_results(&self) -> &[SessionResult] {
        &self.session_results
    }

    pub fn competitions(&self) -> impl Iterator<Item = &Competition> {
        self.competitions.values()
    }

    pub fn championships(&self) -> impl Iterator<Item = &Championship> {
        self.championships.values()
    }

    pub fn adjustments(&self) -> &[PointsAdjustment] {
        &self.adjustments
    }

    pub fn manual_penalties(&self) -> &[ManualPenalty] {
        &self.manual_penalties
    }

    pub fn find_driver(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(&id)
    }

    pub fn find_session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn driver(&self, id: DriverId) -> Result<&Driver, InputError> {
        self.drivers.get(&id).ok_or(InputError::UnknownDriver(id))
    }

    pub fn session(&self, id: &str) -> Result<&Session, InputError> {
        self.sessions
            .get(id)
            .ok_or_else(|| InputError::UnknownSession(id.to_string()))
    }

    pub fn competition(&self, id: CompetitionId) -> Result<&Competition, InputError> {
        self.competitions
            .get(&id)
            .ok_or(InputError::UnknownCompetition(id))
    }

    pub fn championship(&self, id: ChampionshipId) -> Result<&Championship, InputError> {
        self.championships
            .get(&id)
            .ok_or(InputError::UnknownChampionship(id))
    }

    pub fn league(&self, id: LeagueId) -> Result<&League, InputError> {
        self.leagues.get(&id).ok_or(InputError::UnknownLeague(id))
    }

    /// Sessions of one competition in running order (session_order, then date)
    pub fn competition_sessions(&self, id: CompetitionId) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self
            .sessions
            .values()
            .filter(|s| s.competition_id == Some(id))
            .collect();
        sessions.sort_by(|a, b| {
            (a.session_order, a.session_date, &a.session_id)
                .cmp(&(b.session_order, b.session_date, &b.session_id))
        });
        sessions
    }

    pub fn results_for_session<'a>(&'a self, session_id: &'a str) -> impl Iterator<Item = &'a SessionResult> {
        self.session_results
            .iter()
            .filter(move |r| r.session_id == session_id)
    }

    /// Rounds of a championship ordered by round number (unnumbered last)
    pub fn championship_rounds(&self, id: ChampionshipId) -> Vec<&Competition> {
        let mut rounds: Vec<&Competition> = self
            .competitions
            .values()
            .filter(|c| c.championship_id == Some(id))
            .collect();
        rounds.sort_by_key(|c| (c.round_number.is_none(), c.round_number, c.competition_id));
        rounds
    }

    pub fn league_tiers(&self, id: LeagueId) -> Vec<&Championship> {
        self.championships
            .values()
            .filter(|c| c.league_id == Some(id))
            .collect()
    }

    /// Report every dangling reference at once.
    pub fn check_integrity(&self) -> Result<(), Vec<InputError>> {
        let mut errors = Vec::new();

        for lap in &self.laps {
            if !self.sessions.contains_key(&lap.session_id) {
                errors.push(InputError::UnknownSession(lap.session_id.clone()));
            }
            if !self.drivers.contains_key(&lap.driver_id) {
                errors.push(InputError::UnknownDriver(lap.driver_id));
            }
        }

        for result in &self.session_results {
            if !self.sessions.contains_key(&result.session_id) {
                errors.push(InputError::UnknownSession(result.session_id.clone()));
            }
            if !self.drivers.contains_key(&result.driver_id) {
                errors.push(InputError::UnknownDriver(result.driver_id));
            }
        }

        for session in self.sessions.values() {
            if let Some(id) = session.competition_id {
                if !self.competitions.contains_key(&id) {
                    errors.push(InputError::UnknownCompetition(id));
                }
            }
        }

        for competition in self.competitions.values() {
            if let Some(id) = competition.championship_id {
                if !self.championships.contains_key(&id) {
                    errors.push(InputError::BrokenChampionshipLink {
                        competition: competition.competition_id,
                        championship: id,
                    });
                }
            }
        }

        for championship in self.championships.values() {
            if let Some(id) = championship.league_id {
                if !self.leagues.contains_key(&id) {
                    errors.push(InputError::BrokenLeagueLink {
                        championship: championship.championship_id,
                        league: id,
                    });
                }
            }
        }

        for adj in &self.adjustments {
            if !self.drivers.contains_key(&adj.driver_id) {
                errors.push(InputError::UnknownDriver(adj.driver_id));
            }
        }

        for penalty in &self.manual_penalties {
            if !self.drivers.contains_key(&penalty.driver_id) {
                errors.push(InputError::UnknownDriver(penalty.driver_id));
            }
        }

        errors.dedup();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
