//! Error types for the standings engine.
//!
//! An empty result is never an error: single lookups return `Option::None` and
//! ranked sets return an empty `Vec`. The variants below are reserved for
//! configurations and inputs the engine refuses to compute on.
use thiserror::Error;

use crate::data::types::{ChampionshipId, CompetitionId, DriverId, LeagueId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing points table: {0}")] MissingPointsTable(&'static str),
    #[error("championship {championship}: dropping {drop} of {total_rounds} rounds leaves nothing to count")]
    NoCountedRounds { championship: ChampionshipId, drop: u32, total_rounds: u32 },
    #[error("invalid scoring config: {}", .0.join("; "))] Invalid(Vec<String>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown driver: {0}")] UnknownDriver(DriverId),
    #[error("unknown session: {0}")] UnknownSession(String),
    #[error("unknown competition: {0}")] UnknownCompetition(CompetitionId),
    #[error("unknown championship: {0}")] UnknownChampionship(ChampionshipId),
    #[error("unknown league: {0}")] UnknownLeague(LeagueId),
    #[error("competition {competition} references missing championship {championship}")]
    BrokenChampionshipLink { competition: CompetitionId, championship: ChampionshipId },
    #[error("championship {championship} references missing league {league}")]
    BrokenLeagueLink { championship: ChampionshipId, league: LeagueId },
    #[error("championship {championship} in league {league} has no tier number")]
    MissingTier { championship: ChampionshipId, league: LeagueId },
    #[error("championship {championship}: tier {tier} outside 1..={total_tiers}")]
    TierOutOfRange { championship: ChampionshipId, tier: u32, total_tiers: u32 },
    #[error("league {league}: tier {tier} claimed by championships {first} and {second}")]
    DuplicateTier { league: LeagueId, tier: u32, first: ChampionshipId, second: ChampionshipId },
    #[error("duplicate {kind} id: {id}")] DuplicateId { kind: &'static str, id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)] InvalidConfiguration(#[from] ConfigError),
    #[error(transparent)] InconsistentInput(#[from] InputError),
}

pub type EngineResult<T> = Result<T, EngineError>;
