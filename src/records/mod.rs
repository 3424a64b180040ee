pub mod driver;
pub mod sessions;
pub mod track;

pub use driver::{driver_best_times, driver_profile, DriverProfile, PersonalBest};
pub use sessions::{session_statistics, SessionStatistics};
pub use track::{
    all_track_records, record_filter, track_leaderboard, track_record, track_statistics,
    LeaderboardEntry, TrackRecord, TrackStatistics,
};
