pub mod competition;
pub mod config;
pub mod factors;
pub mod validation;

pub use competition::{participation_status, score_competition, DriverCompetitionResult, ParticipationStatus};
pub use config::*;
pub use factors::{points_for_position, points_for_rank, RankRange};
pub use validation::validate_scoring;
