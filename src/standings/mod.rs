pub mod championship;
pub mod consistency;
pub mod league;

pub use championship::{aggregate_championship, rounds_to_drop, DriverChampionshipStanding, RoundScore};
pub use consistency::{coefficient_of_variation, consistency_bonus, consistency_rating};
pub use league::{aggregate_league, DriverLeagueStanding, TierPoints};
