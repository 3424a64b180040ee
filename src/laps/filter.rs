use crate::data::{CompetitionId, Dataset, Driver, DriverId, Lap, Session, SessionKind};
use crate::error::InputError;

/// Laps at or beyond either bound are telemetry glitches, not laps.
pub const MIN_PLAUSIBLE_LAP_MS: i64 = 30_000;
pub const MAX_PLAUSIBLE_LAP_MS: i64 = 3_600_000;

pub fn is_plausible(lap_time: i64) -> bool {
    lap_time > MIN_PLAUSIBLE_LAP_MS && lap_time < MAX_PLAUSIBLE_LAP_MS
}

/// A lap joined with the session and driver it belongs to
#[derive(Debug, Clone, Copy)]
pub struct LapContext<'a> {
    pub lap: &'a Lap,
    pub session: &'a Session,
    pub driver: &'a Driver,
}

impl LapContext<'_> {
    /// Eligible to be somebody's best lap: positive, plausible and flagged valid
    pub fn counts_for_best(&self) -> bool {
        self.lap.lap_time > 0 && is_plausible(self.lap.lap_time) && self.lap.is_valid_for_best
    }
}

/// Which laps a best-lap query looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LapScope {
    Session(String),
    Track(String),
    TrackDriver { track: String, driver: DriverId },
    Driver(DriverId),
    Competition(CompetitionId),
    All,
}

impl LapScope {
    pub fn contains(&self, ctx: &LapContext) -> bool {
        match self {
            LapScope::Session(id) => ctx.session.session_id == *id,
            LapScope::Track(track) => ctx.session.track_name == *track,
            LapScope::TrackDriver { track, driver } => {
                ctx.session.track_name == *track && ctx.driver.driver_id == *driver
            }
            LapScope::Driver(driver) => ctx.driver.driver_id == *driver,
            LapScope::Competition(id) => ctx.session.competition_id == Some(*id),
            LapScope::All => true,
        }
    }
}

/// Eligibility predicates shared by every report that selects laps.
///
/// Predicates compose by conjunction: each enabled flag narrows the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LapFilter {
    /// Only laps from sessions linked to a competition
    pub official_only: bool,
    /// Only laps from registered drivers (trust level above zero)
    pub trusted_only: bool,
    /// Only laps from these kinds of session
    pub kinds: Option<Vec<SessionKind>>,
}

impl LapFilter {
    pub fn all_sessions() -> Self {
        Self::default()
    }

    /// The filter used for records: official sessions, registered drivers
    pub fn official_trusted() -> Self {
        Self::default().official().trusted()
    }

    pub fn official(mut self) -> Self {
        self.official_only = true;
        self
    }

    pub fn trusted(mut self) -> Self {
        self.trusted_only = true;
        self
    }

    pub fn kinds(mut self, kinds: &[SessionKind]) -> Self {
        self.kinds = Some(kinds.to_vec());
        self
    }

    pub fn accepts(&self, ctx: &LapContext) -> bool {
        if self.official_only && !ctx.session.is_official() {
            return false;
        }
        if self.trusted_only && ctx.driver.is_guest() {
            return false;
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&ctx.session.kind()) {
                return false;
            }
        }
        true
    }
}

/// Join every lap in scope with its session and driver.
///
/// Implausible and invalid laps are kept: lap counts include them, only
/// best-lap selection drops them.
pub fn laps_in_scope<'a>(
    data: &'a Dataset,
    scope: &LapScope,
    filter: &LapFilter,
) -> Result<Vec<LapContext<'a>>, InputError> {
    let mut out = Vec::new();
    for lap in data.laps() {
        if let LapScope::Session(ref id) = scope {
            if lap.session_id != *id {
                continue;
            }
        }
        if let LapScope::Driver(id) | LapScope::TrackDriver { driver: id, .. } = scope {
            if lap.driver_id != *id {
                continue;
            }
        }

        let ctx = LapContext {
            lap,
            session: data.session(&lap.session_id)?,
            driver: data.driver(lap.driver_id)?,
        };
        if scope.contains(&ctx) && filter.accepts(&ctx) {
            out.push(ctx);
        }
    }
    Ok(out)
}
