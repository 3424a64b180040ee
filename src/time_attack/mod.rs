pub mod ranker;

pub use ranker::{is_finalized, rank_time_attack, TimeAttackEntry};
