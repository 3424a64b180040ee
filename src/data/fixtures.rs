//! Builders for small in-memory datasets used across the unit tests.
use chrono::{DateTime, Duration, TimeZone, Utc};

use super::dataset::{Dataset, DatasetFile};
use super::types::{
    Championship, Competition, Driver, Lap, League, ManualPenalty, PointsAdjustment, Session,
    SessionResult,
};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap()
}

#[derive(Default)]
pub struct DatasetBuilder {
    file: DatasetFile,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(mut self, id: u32, name: &str, trust_level: u32) -> Self {
        self.file.drivers.push(Driver {
            driver_id: id,
            last_name: name.to_string(),
            short_name: None,
            preferred_race_number: None,
            trust_level,
            bad_driver_reports: 0,
        });
        self
    }

    pub fn member(self, id: u32, name: &str) -> Self {
        self.driver(id, name, 1)
    }

    pub fn guest(self, id: u32, name: &str) -> Self {
        self.driver(id, name, 0)
    }

    /// `at` is both the running order and an hour offset from `base_time()`
    pub fn session(mut self, id: &str, code: &str, track: &str, at: u32, competition: Option<u32>) -> Self {
        self.file.sessions.push(Session {
            session_id: id.to_string(),
            session_type: code.to_string(),
            track_name: track.to_string(),
            session_date: base_time() + Duration::hours(at as i64),
            total_drivers: 0,
            competition_id: competition,
            session_order: Some(at),
        });
        self
    }

    pub fn lap(mut self, lap_id: u64, session: &str, driver: u32, ms: i64) -> Self {
        self.file.laps.push(Lap {
            lap_id,
            session_id: session.to_string(),
            driver_id: driver,
            lap_time: ms,
            is_valid_for_best: true,
            splits: None,
        });
        self
    }

    pub fn invalid_lap(mut self, lap_id: u64, session: &str, driver: u32, ms: i64) -> Self {
        self = self.lap(lap_id, session, driver, ms);
        if let Some(lap) = self.file.laps.last_mut() {
            lap.is_valid_for_best = false;
        }
        self
    }

    pub fn split_lap(mut self, lap_id: u64, session: &str, driver: u32, splits: [i64; 3]) -> Self {
        self = self.lap(lap_id, session, driver, splits.iter().sum());
        if let Some(lap) = self.file.laps.last_mut() {
            lap.splits = Some(splits);
        }
        self
    }

    pub fn result(mut self, session: &str, driver: u32, position: Option<u32>) -> Self {
        self.file.session_results.push(SessionResult {
            session_id: session.to_string(),
            driver_id: driver,
            position,
            race_number: None,
            lap_count: 0,
            best_lap: None,
            total_time: None,
            is_spectator: false,
        });
        self
    }

    pub fn spectator(mut self, session: &str, driver: u32) -> Self {
        self = self.result(session, driver, None);
        if let Some(result) = self.file.session_results.last_mut() {
            result.is_spectator = true;
        }
        self
    }

    pub fn competition(mut self, id: u32, track: &str, championship: Option<u32>, round: Option<u32>) -> Self {
        self.file.competitions.push(Competition {
            competition_id: id,
            name: format!("Round at {}", track),
            track_name: track.to_string(),
            championship_id: championship,
            round_number: round,
            date_start: Some(base_time()),
            date_end: None,
            weekend_format: None,
            is_completed: true,
        });
        self
    }

    pub fn ends_at(mut self, competition: u32, date_end: DateTime<Utc>) -> Self {
        if let Some(c) = self
            .file
            .competitions
            .iter_mut()
            .find(|c| c.competition_id == competition)
        {
            c.date_end = Some(date_end);
        }
        self
    }

    pub fn championship(mut self, id: u32, total_rounds: u32, drop: Option<u32>) -> Self {
        self.file.championships.push(Championship {
            championship_id: id,
            name: format!("Championship {}", id),
            season: None,
            total_rounds,
            drop_worst_results: drop,
            league_id: None,
            tier_number: None,
            start_date: None,
            end_date: None,
            is_completed: false,
        });
        self
    }

    pub fn in_league(mut self, championship: u32, league: u32, tier: Option<u32>) -> Self {
        if let Some(c) = self
            .file
            .championships
            .iter_mut()
            .find(|c| c.championship_id == championship)
        {
            c.league_id = Some(league);
            c.tier_number = tier;
        }
        self
    }

    pub fn completed(mut self, championship: u32) -> Self {
        if let Some(c) = self
            .file
            .championships
            .iter_mut()
            .find(|c| c.championship_id == championship)
        {
            c.is_completed = true;
        }
        self
    }

    pub fn league(mut self, id: u32, total_tiers: u32) -> Self {
        self.file.leagues.push(League {
            league_id: id,
            name: format!("League {}", id),
            total_tiers,
            is_completed: false,
        });
        self
    }

    pub fn adjustment(mut self, competition: u32, driver: u32, bonus: u32, penalty: u32) -> Self {
        self.file.adjustments.push(PointsAdjustment {
            competition_id: competition,
            driver_id: driver,
            bonus_points: bonus,
            penalty_points: penalty,
            reason: None,
        });
        self
    }

    pub fn manual_penalty(mut self, championship: u32, driver: u32, points: u32) -> Self {
        self.file.manual_penalties.push(ManualPenalty {
            championship_id: championship,
            driver_id: driver,
            points,
            reason: None,
        });
        self
    }

    /// Give a driver a flat score in a championship round: an unclassified
    /// race result plus a bonus adjustment. Creates the round on first use.
    pub fn round_score(mut self, championship: u32, round: u32, driver: u32, points: u32) -> Self {
        let competition = championship * 100 + round;
        let session = format!("c{}r{}", championship, round);
        if !self
            .file
            .competitions
            .iter()
            .any(|c| c.competition_id == competition)
        {
            self = self
                .competition(competition, "monza", Some(championship), Some(round))
                .session(&session, "R", "monza", round, Some(competition));
        }
        self.result(&session, driver, None)
            .adjustment(competition, driver, points, 0)
    }

    pub fn into_file(self) -> DatasetFile {
        self.file
    }

    pub fn build(self) -> Dataset {
        Dataset::new(self.file).expect("fixture dataset has unique ids")
    }
}
