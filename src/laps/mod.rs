pub mod best;
pub mod filter;

pub use best::{best_by, best_lap, best_per_driver, best_per_driver_session, select_best, selection_key, BestLap};
pub use filter::{is_plausible, laps_in_scope, LapContext, LapFilter, LapScope};
