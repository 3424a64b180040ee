use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::config::ScoringConfig;
use super::factors::points_for_position;
use crate::data::{CompetitionId, Dataset, DriverId, SessionKind, SessionResult};
use crate::error::{EngineResult, InputError};
use crate::laps::{best_lap, LapFilter, LapScope};

/// How a driver took part in a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    /// Finished at least one race with a position
    Classified,
    /// Took part but was never classified in a race
    Unclassified,
    Absent,
}

/// One driver's score for a single race weekend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverCompetitionResult {
    pub position: u32,
    pub competition_id: CompetitionId,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub trust_level: u32,
    pub status: ParticipationStatus,
    pub qualifying_position: Option<u32>,
    pub race_position: Option<u32>,
    /// None when the driver was classified in no race
    pub race_points: Option<u32>,
    pub pole_points: u32,
    pub fastest_lap_points: u32,
    pub bonus_points: u32,
    pub penalty_points: u32,
    pub points_bonus: i64,
    /// Always zero here; dropping happens across a championship
    pub points_dropped: u32,
    pub total_points: i64,
    pub wins: u32,
    pub podiums: u32,
    pub poles: u32,
    pub fastest_laps: u32,
    /// Only set for registered drivers
    pub guests_beaten: Option<u32>,
    pub beaten_by_guests: Option<u32>,
}

impl DriverCompetitionResult {
    pub fn is_guest(&self) -> bool {
        self.trust_level == 0
    }
}

#[derive(Debug, Default)]
struct Tally {
    classified: bool,
    qualifying_position: Option<u32>,
    race_position: Option<u32>,
    race_points: u32,
    pole_points: u32,
    fastest_lap_points: u32,
    bonus_points: u32,
    penalty_points: u32,
    wins: u32,
    podiums: u32,
    poles: u32,
    fastest_laps: u32,
    guests_beaten: u32,
    beaten_by_guests: u32,
}

/// Score every participant of one competition.
///
/// A participant is any driver with a non-spectator result in one of the
/// competition's sessions. An empty Vec means nobody took part.
pub fn score_competition(
    data: &Dataset,
    competition_id: CompetitionId,
    config: &ScoringConfig,
) -> EngineResult<Vec<DriverCompetitionResult>> {
    let competition = data.competition(competition_id)?;
    if let Some(championship) = competition.championship_id {
        data.championship(championship)
            .map_err(|_| InputError::BrokenChampionshipLink {
                competition: competition_id,
                championship,
            })?;
    }

    let race_table = config.race_table()?;
    let pole_points = config.pole()?;
    let fastest_lap_points = config.fastest_lap()?;

    let mut tallies: BTreeMap<DriverId, Tally> = BTreeMap::new();

    for session in data.competition_sessions(competition_id) {
        let results: Vec<&SessionResult> = data
            .results_for_session(&session.session_id)
            .filter(|r| !r.is_spectator)
            .collect();
        for result in &results {
            data.driver(result.driver_id)?;
            tallies.entry(result.driver_id).or_default();
        }

        match session.kind() {
            SessionKind::Qualifying => {
                for result in &results {
                    let tally = tallies.entry(result.driver_id).or_default();
                    tally.qualifying_position = result.position;
                    if result.position == Some(1) {
                        tally.poles = tally.poles.saturating_add(1);
                        tally.pole_points = tally.pole_points.saturating_add(pole_points);
                    }
                }
            }
            SessionKind::Race => {
                for result in &results {
                    let (beaten, beaten_by) = guest_interactions(data, result, &results)?;
                    let tally = tallies.entry(result.driver_id).or_default();
                    tally.race_position = result.position;
                    tally.guests_beaten = tally.guests_beaten.saturating_add(beaten);
                    tally.beaten_by_guests = tally.beaten_by_guests.saturating_add(beaten_by);
                    if let Some(pos) = result.position {
                        tally.classified = true;
                        tally.race_points = tally.race_points.saturating_add(points_for_position(race_table, pos));
                        if pos == 1 {
                            tally.wins = tally.wins.saturating_add(1);
                        }
                        if pos <= 3 {
                            tally.podiums = tally.podiums.saturating_add(1);
                        }
                    }
                }

                let fastest = best_lap(
                    data,
                    &LapScope::Session(session.session_id.clone()),
                    &LapFilter::all_sessions(),
                )?;
                if let Some(lap) = fastest {
                    match tallies.get_mut(&lap.driver_id) {
                        Some(tally) => {
                            tally.fastest_laps = tally.fastest_laps.saturating_add(1);
                            tally.fastest_lap_points = tally.fastest_lap_points.saturating_add(fastest_lap_points);
                        }
                        None => tracing::warn!(
                            session = %session.session_id,
                            driver_id = lap.driver_id,
                            "fastest lap holder has no result in session, no points awarded"
                        ),
                    }
                }
            }
            _ => {}
        }
    }

    for adj in data
        .adjustments()
        .iter()
        .filter(|a| a.competition_id == competition_id)
    {
        match tallies.get_mut(&adj.driver_id) {
            Some(tally) => {
                tally.bonus_points = tally.bonus_points.saturating_add(adj.bonus_points);
                tally.penalty_points = tally.penalty_points.saturating_add(adj.penalty_points);
            }
            None => tracing::warn!(
                competition_id,
                driver_id = adj.driver_id,
                "ignoring points adjustment for a driver who did not take part"
            ),
        }
    }

    let mut rows = Vec::with_capacity(tallies.len());
    for (driver_id, tally) in tallies {
        let driver = data.driver(driver_id)?;
        let race_points = tally.classified.then_some(tally.race_points);
        let points_bonus = tally.bonus_points as i64 - tally.penalty_points as i64;
        let total_points = race_points.unwrap_or(0) as i64
            + tally.pole_points as i64
            + tally.fastest_lap_points as i64
            + points_bonus;
        let (guests_beaten, beaten_by_guests) = if driver.is_guest() {
            (None, None)
        } else {
            (Some(tally.guests_beaten), Some(tally.beaten_by_guests))
        };

        rows.push(DriverCompetitionResult {
            position: 0,
            competition_id,
            driver_id,
            driver_name: driver.last_name.clone(),
            trust_level: driver.trust_level,
            status: if tally.classified {
                ParticipationStatus::Classified
            } else {
                ParticipationStatus::Unclassified
            },
            qualifying_position: tally.qualifying_position,
            race_position: tally.race_position,
            race_points,
            pole_points: tally.pole_points,
            fastest_lap_points: tally.fastest_lap_points,
            bonus_points: tally.bonus_points,
            penalty_points: tally.penalty_points,
            points_bonus,
            points_dropped: 0,
            total_points,
            wins: tally.wins,
            podiums: tally.podiums,
            poles: tally.poles,
            fastest_laps: tally.fastest_laps,
            guests_beaten,
            beaten_by_guests,
        });
    }

    rows.sort_by(compare_rows);
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }

    tracing::debug!(competition_id, drivers = rows.len(), "scored competition");
    Ok(rows)
}

/// Total desc, race points desc (classified zero above unclassified), then
/// members above guests when both scored nothing, then driver id.
fn compare_rows(a: &DriverCompetitionResult, b: &DriverCompetitionResult) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.race_points.cmp(&a.race_points))
        .then_with(|| {
            if a.total_points == 0 && b.total_points == 0 {
                b.trust_level.cmp(&a.trust_level)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.driver_id.cmp(&b.driver_id))
}

/// (guests finishing behind, guests finishing ahead) for a registered driver
/// in one race. A classified finish is ahead of an unclassified one.
fn guest_interactions(
    data: &Dataset,
    result: &SessionResult,
    field: &[&SessionResult],
) -> Result<(u32, u32), InputError> {
    if data.driver(result.driver_id)?.is_guest() {
        return Ok((0, 0));
    }

    let mut beaten = 0;
    let mut beaten_by = 0;
    for other in field {
        if other.driver_id == result.driver_id || !data.driver(other.driver_id)?.is_guest() {
            continue;
        }
        match (result.position, other.position) {
            (Some(mine), Some(theirs)) if theirs > mine => beaten += 1,
            (Some(mine), Some(theirs)) if theirs < mine => beaten_by += 1,
            (Some(_), None) => beaten += 1,
            (None, Some(_)) => beaten_by += 1,
            _ => {}
        }
    }
    Ok((beaten, beaten_by))
}

/// Whether a driver was classified, took part unclassified, or was absent.
pub fn participation_status(
    data: &Dataset,
    competition_id: CompetitionId,
    driver_id: DriverId,
) -> EngineResult<ParticipationStatus> {
    data.competition(competition_id)?;
    data.driver(driver_id)?;

    let mut status = ParticipationStatus::Absent;
    for session in data.competition_sessions(competition_id) {
        for result in data
            .results_for_session(&session.session_id)
            .filter(|r| r.driver_id == driver_id && !r.is_spectator)
        {
            if session.kind() == SessionKind::Race && result.position.is_some() {
                return Ok(ParticipationStatus::Classified);
            }
            status = ParticipationStatus::Unclassified;
        }
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::DatasetBuilder;
    use crate::error::{ConfigError, EngineError};

    fn no_extras() -> ScoringConfig {
        ScoringConfig {
            race_points: Some(vec![25, 18]),
            pole_points: Some(0),
            fastest_lap_points: Some(0),
            ..ScoringConfig::default()
        }
    }

    fn weekend() -> DatasetBuilder {
        DatasetBuilder::new()
            .competition(10, "monza", None, Some(1))
            .session("q", "Q", "monza", 0, Some(10))
            .session("r", "R1", "monza", 1, Some(10))
    }

    #[test]
    fn test_three_members_ranked_by_points() {
        let data = weekend()
            .member(1, "Alpha")
            .member(2, "Bravo")
            .member(3, "Charlie")
            .guest(4, "Visitor")
            .result("r", 3, Some(3))
            .result("r", 1, Some(1))
            .result("r", 2, Some(2))
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        let order: Vec<(DriverId, i64)> = rows.iter().map(|r| (r.driver_id, r.total_points)).collect();
        assert_eq!(order, vec![(1, 25), (2, 18), (3, 0)]);
        assert_eq!(rows[2].race_points, Some(0));
        assert_eq!(rows[2].status, ParticipationStatus::Classified);
        assert_eq!(rows[2].position, 3);

        assert_eq!(
            participation_status(&data, 10, 4).unwrap(),
            ParticipationStatus::Absent
        );
    }

    #[test]
    fn test_unclassified_driver_has_null_race_points() {
        let data = weekend()
            .member(1, "Alpha")
            .member(2, "Bravo")
            .result("r", 1, Some(3))
            .result("r", 2, None)
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        assert_eq!(rows[0].driver_id, 1);
        assert_eq!(rows[0].race_points, Some(0));
        assert_eq!(rows[1].race_points, None);
        assert_eq!(rows[1].status, ParticipationStatus::Unclassified);
        assert_eq!(rows[1].total_points, 0);
    }

    #[test]
    fn test_zero_scoring_member_ranks_above_zero_scoring_guest() {
        let data = weekend()
            .guest(1, "Visitor")
            .member(2, "Bravo")
            .result("r", 1, Some(4))
            .result("r", 2, Some(5))
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        assert_eq!(rows[0].driver_id, 2);
        assert_eq!(rows[1].driver_id, 1);
        assert_eq!(rows[1].guests_beaten, None);
        assert_eq!(rows[0].beaten_by_guests, Some(1));
    }

    #[test]
    fn test_pole_and_fastest_lap() {
        let config = ScoringConfig {
            race_points: Some(vec![10, 5]),
            pole_points: Some(2),
            fastest_lap_points: Some(1),
            ..ScoringConfig::default()
        };
        let data = weekend()
            .member(1, "Alpha")
            .member(2, "Bravo")
            .result("q", 2, Some(1))
            .result("q", 1, Some(2))
            .result("r", 1, Some(1))
            .result("r", 2, Some(2))
            .lap(1, "r", 1, 91_000)
            .lap(2, "r", 2, 90_500)
            .lap(3, "q", 1, 80_000)
            .build();

        let rows = score_competition(&data, 10, &config).unwrap();
        let alpha = rows.iter().find(|r| r.driver_id == 1).unwrap();
        let bravo = rows.iter().find(|r| r.driver_id == 2).unwrap();
        assert_eq!(alpha.total_points, 10);
        assert_eq!(bravo.pole_points, 2);
        assert_eq!(bravo.fastest_lap_points, 1);
        assert_eq!(bravo.total_points, 8);
        assert_eq!(bravo.qualifying_position, Some(1));
        assert_eq!(alpha.wins, 1);
        assert_eq!(bravo.podiums, 1);
    }

    #[test]
    fn test_guest_interaction_counts() {
        let data = weekend()
            .member(1, "Alpha")
            .member(2, "Bravo")
            .guest(3, "Visitor")
            .guest(4, "Tourist")
            .result("r", 3, Some(1))
            .result("r", 1, Some(2))
            .result("r", 4, None)
            .result("r", 2, None)
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        let alpha = rows.iter().find(|r| r.driver_id == 1).unwrap();
        let bravo = rows.iter().find(|r| r.driver_id == 2).unwrap();
        assert_eq!(alpha.guests_beaten, Some(1));
        assert_eq!(alpha.beaten_by_guests, Some(1));
        assert_eq!(bravo.guests_beaten, Some(0));
        assert_eq!(bravo.beaten_by_guests, Some(1));
        assert!(rows.iter().filter(|r| r.is_guest()).all(|r| r.guests_beaten.is_none()));
    }

    #[test]
    fn test_adjustments_are_signed() {
        let data = weekend()
            .member(1, "Alpha")
            .result("r", 1, Some(2))
            .adjustment(10, 1, 5, 8)
            .adjustment(10, 99, 50, 0)
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bonus_points, 5);
        assert_eq!(rows[0].penalty_points, 8);
        assert_eq!(rows[0].points_bonus, -3);
        assert_eq!(rows[0].total_points, 15);
        assert_eq!(rows[0].points_dropped, 0);
    }

    #[test]
    fn test_stacked_adjustments_saturate() {
        let data = weekend()
            .member(1, "Alpha")
            .result("r", 1, Some(1))
            .adjustment(10, 1, u32::MAX, 0)
            .adjustment(10, 1, u32::MAX, 0)
            .adjustment(10, 1, 0, u32::MAX)
            .adjustment(10, 1, 0, 7)
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        assert_eq!(rows[0].bonus_points, u32::MAX);
        assert_eq!(rows[0].penalty_points, u32::MAX);
        assert_eq!(rows[0].points_bonus, 0);
        assert_eq!(rows[0].total_points, 25);
    }

    #[test]
    fn test_empty_race_table_rejected() {
        let data = weekend().member(1, "Alpha").result("r", 1, Some(1)).build();
        let config = ScoringConfig {
            race_points: Some(vec![]),
            ..no_extras()
        };
        assert!(matches!(
            score_competition(&data, 10, &config),
            Err(EngineError::InvalidConfiguration(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_spectators_do_not_take_part() {
        let data = weekend()
            .member(1, "Alpha")
            .member(2, "Bravo")
            .result("r", 1, Some(1))
            .spectator("r", 2)
            .build();

        let rows = score_competition(&data, 10, &no_extras()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            participation_status(&data, 10, 2).unwrap(),
            ParticipationStatus::Absent
        );
    }

    #[test]
    fn test_empty_competition_is_no_data() {
        let data = weekend().build();
        assert_eq!(score_competition(&data, 10, &no_extras()), Ok(vec![]));
    }

    #[test]
    fn test_missing_race_table_rejected() {
        let data = weekend().member(1, "Alpha").result("r", 1, Some(1)).build();
        let config = ScoringConfig {
            race_points: None,
            ..ScoringConfig::default()
        };
        assert_eq!(
            score_competition(&data, 10, &config),
            Err(EngineError::InvalidConfiguration(ConfigError::MissingPointsTable("race_points")))
        );
    }

    #[test]
    fn test_result_without_driver_record_rejected() {
        let data = weekend().result("r", 7, Some(1)).build();
        assert_eq!(
            score_competition(&data, 10, &no_extras()),
            Err(EngineError::InconsistentInput(InputError::UnknownDriver(7)))
        );
    }

    #[test]
    fn test_broken_championship_link_rejected() {
        let data = DatasetBuilder::new()
            .competition(10, "monza", Some(3), Some(1))
            .build();
        assert!(matches!(
            score_competition(&data, 10, &no_extras()),
            Err(EngineError::InconsistentInput(InputError::BrokenChampionshipLink { .. }))
        ));
    }
}
