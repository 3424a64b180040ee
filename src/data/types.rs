use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type DriverId = u32;
pub type CompetitionId = u32;
pub type ChampionshipId = u32;
pub type LeagueId = u32;
pub type LapId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: DriverId,
    pub last_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub preferred_race_number: Option<u32>,
    /// 0 = guest, anything above is a registered member
    #[serde(default)]
    pub trust_level: u32,
    #[serde(default)]
    pub bad_driver_reports: u32,
}

impl Driver {
    pub fn is_guest(&self) -> bool {
        self.trust_level == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Practice,
    Qualifying,
    Race,
    TimeAttack,
    Other,
}

impl SessionKind {
    /// Classify a raw session code ("FP2", "Q", "R1", "TA") or a spelled-out name.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        match code.as_str() {
            "TA" | "TIME_ATTACK" | "TIMEATTACK" | "HOTLAP" => return SessionKind::TimeAttack,
            "PRACTICE" => return SessionKind::Practice,
            "QUALIFYING" => return SessionKind::Qualifying,
            "RACE" => return SessionKind::Race,
            _ => {}
        }

        let numbered = |prefix: &str| {
            code.strip_prefix(prefix)
                .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
        };

        if numbered("FP") || numbered("P") {
            SessionKind::Practice
        } else if numbered("Q") {
            SessionKind::Qualifying
        } else if numbered("R") {
            SessionKind::Race
        } else {
            SessionKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    /// Raw session code as imported ("FP1", "Q", "R2", ...)
    pub session_type: String,
    pub track_name: String,
    pub session_date: DateTime<Utc>,
    #[serde(default)]
    pub total_drivers: u32,
    #[serde(default)]
    pub competition_id: Option<CompetitionId>,
    #[serde(default)]
    pub session_order: Option<u32>,
}

impl Session {
    pub fn kind(&self) -> SessionKind {
        SessionKind::from_code(&self.session_type)
    }

    /// A session is official when it belongs to a competition
    pub fn is_official(&self) -> bool {
        self.competition_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub lap_id: LapId,
    pub session_id: String,
    pub driver_id: DriverId,
    /// Milliseconds
    pub lap_time: i64,
    #[serde(default)]
    pub is_valid_for_best: bool,
    #[serde(default)]
    pub splits: Option<[i64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: String,
    pub driver_id: DriverId,
    /// None when the driver was not classified (retired, no time)
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub race_number: Option<u32>,
    #[serde(default)]
    pub lap_count: u32,
    #[serde(default)]
    pub best_lap: Option<i64>,
    #[serde(default)]
    pub total_time: Option<i64>,
    #[serde(default)]
    pub is_spectator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub competition_id: CompetitionId,
    pub name: String,
    pub track_name: String,
    /// None marks an unranked "fun" event
    #[serde(default)]
    pub championship_id: Option<ChampionshipId>,
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default)]
    pub date_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub weekend_format: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Championship {
    pub championship_id: ChampionshipId,
    pub name: String,
    #[serde(default)]
    pub season: Option<String>,
    pub total_rounds: u32,
    /// Overrides the scoring config's default when set
    #[serde(default)]
    pub drop_worst_results: Option<u32>,
    #[serde(default)]
    pub league_id: Option<LeagueId>,
    #[serde(default)]
    pub tier_number: Option<u32>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub league_id: LeagueId,
    pub name: String,
    pub total_tiers: u32,
    #[serde(default)]
    pub is_completed: bool,
}

/// Flat steward decision applied to one driver's competition score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAdjustment {
    pub competition_id: CompetitionId,
    pub driver_id: DriverId,
    #[serde(default)]
    pub bonus_points: u32,
    #[serde(default)]
    pub penalty_points: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Manual override keyed by (championship, driver), always subtracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualPenalty {
    pub championship_id: ChampionshipId,
    pub driver_id: DriverId,
    pub points: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_kind_numbered_codes() {
        assert_eq!(SessionKind::from_code("FP1"), SessionKind::Practice);
        assert_eq!(SessionKind::from_code("FP"), SessionKind::Practice);
        assert_eq!(SessionKind::from_code("Q2"), SessionKind::Qualifying);
        assert_eq!(SessionKind::from_code("R"), SessionKind::Race);
        assert_eq!(SessionKind::from_code("r3"), SessionKind::Race);
    }

    #[test]
    fn test_session_kind_named() {
        assert_eq!(SessionKind::from_code("TA"), SessionKind::TimeAttack);
        assert_eq!(SessionKind::from_code("time_attack"), SessionKind::TimeAttack);
        assert_eq!(SessionKind::from_code("Race"), SessionKind::Race);
        assert_eq!(SessionKind::from_code("Qualifying"), SessionKind::Qualifying);
    }

    #[test]
    fn test_session_kind_unknown() {
        assert_eq!(SessionKind::from_code("WARMUP"), SessionKind::Other);
        assert_eq!(SessionKind::from_code("RX"), SessionKind::Other);
        assert_eq!(SessionKind::from_code(""), SessionKind::Other);
    }

    #[test]
    fn test_guest_is_trust_zero() {
        let mut driver = Driver {
            driver_id: 1,
            last_name: "Rossi".to_string(),
            short_name: None,
            preferred_race_number: None,
            trust_level: 0,
            bad_driver_reports: 0,
        };
        assert!(driver.is_guest());
        driver.trust_level = 3;
        assert!(!driver.is_guest());
    }
}
