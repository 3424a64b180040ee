use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::consistency::{consistency_rating, round2};
use crate::data::{ChampionshipId, CompetitionId, Dataset, DriverId};
use crate::error::{ConfigError, EngineResult, InputError};
use crate::scoring::{score_competition, DropPolicy, ScoringConfig};

/// A driver's score in one round of a championship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundScore {
    pub competition_id: CompetitionId,
    pub round_number: Option<u32>,
    pub points: i64,
    pub race_position: Option<u32>,
    pub dropped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverChampionshipStanding {
    pub position: u32,
    pub championship_id: ChampionshipId,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub trust_level: u32,
    pub competitions_participated: u32,
    pub counted_rounds: u32,
    pub wins: u32,
    pub podiums: u32,
    pub poles: u32,
    pub fastest_laps: u32,
    pub gross_points: i64,
    pub points_dropped: i64,
    pub base_points: i64,
    pub participation_multiplier: f64,
    pub participation_bonus: f64,
    pub manual_penalties: u32,
    pub total_points: f64,
    pub average_position: Option<f64>,
    pub best_position: Option<u32>,
    pub consistency_rating: Option<f64>,
    /// In round order
    pub rounds: Vec<RoundScore>,
}

impl DriverChampionshipStanding {
    pub fn dropped_rounds(&self) -> Vec<Option<u32>> {
        self.rounds
            .iter()
            .filter(|r| r.dropped)
            .map(|r| r.round_number)
            .collect()
    }
}

#[derive(Debug, Default)]
struct Season {
    rounds: Vec<RoundScore>,
    wins: u32,
    podiums: u32,
    poles: u32,
    fastest_laps: u32,
}

/// How many of `participated` rounds are discarded under the policy.
pub fn rounds_to_drop(policy: DropPolicy, drop: u32, total_rounds: u32, participated: u32) -> u32 {
    match policy {
        DropPolicy::SeasonMinimum => {
            let must_count = total_rounds.saturating_sub(drop);
            drop.min(participated.saturating_sub(must_count))
        }
        DropPolicy::Always => drop.min(participated),
    }
}

/// Flag the `count` worst rounds as dropped, lowest score first, earlier round
/// first on equal scores. Returns the sum of the dropped scores.
fn mark_dropped(rounds: &mut [RoundScore], count: u32) -> i64 {
    let mut order: Vec<usize> = (0..rounds.len()).collect();
    order.sort_by_key(|&i| {
        let r = &rounds[i];
        (r.points, r.round_number.unwrap_or(u32::MAX), r.competition_id)
    });

    let mut sum = 0;
    for &i in order.iter().take(count as usize) {
        rounds[i].dropped = true;
        sum += rounds[i].points;
    }
    sum
}

/// Roll every round of a championship up into one ranked table.
pub fn aggregate_championship(
    data: &Dataset,
    championship_id: ChampionshipId,
    config: &ScoringConfig,
) -> EngineResult<Vec<DriverChampionshipStanding>> {
    let championship = data.championship(championship_id)?;
    if let Some(league) = championship.league_id {
        data.league(league)
            .map_err(|_| InputError::BrokenLeagueLink {
                championship: championship_id,
                league,
            })?;
    }

    let total_rounds = championship.total_rounds;
    let drop = championship
        .drop_worst_results
        .unwrap_or(config.drop_worst_results);
    if total_rounds == 0 || drop >= total_rounds {
        return Err(ConfigError::NoCountedRounds {
            championship: championship_id,
            drop,
            total_rounds,
        }
        .into());
    }

    let mut seasons: BTreeMap<DriverId, Season> = BTreeMap::new();
    for round in data.championship_rounds(championship_id) {
        for row in score_competition(data, round.competition_id, config)? {
            let season = seasons.entry(row.driver_id).or_default();
            season.wins += row.wins;
            season.podiums += row.podiums;
            season.poles += row.poles;
            season.fastest_laps += row.fastest_laps;
            season.rounds.push(RoundScore {
                competition_id: round.competition_id,
                round_number: round.round_number,
                points: row.total_points,
                race_position: row.race_position,
                dropped: false,
            });
        }
    }

    let mut penalties: BTreeMap<DriverId, u32> = BTreeMap::new();
    for penalty in data
        .manual_penalties()
        .iter()
        .filter(|p| p.championship_id == championship_id)
    {
        if seasons.contains_key(&penalty.driver_id) {
            let total = penalties.entry(penalty.driver_id).or_default();
            *total = total.saturating_add(penalty.points);
        } else {
            tracing::warn!(
                championship_id,
                driver_id = penalty.driver_id,
                "ignoring manual penalty for a driver with no rounds"
            );
        }
    }

    let mut standings = Vec::with_capacity(seasons.len());
    for (driver_id, mut season) in seasons {
        let driver = data.driver(driver_id)?;
        let participated = season.rounds.len() as u32;
        let gross_points: i64 = season.rounds.iter().map(|r| r.points).sum();

        let count = rounds_to_drop(config.drop_policy, drop, total_rounds, participated);
        let points_dropped = mark_dropped(&mut season.rounds, count);
        let base_points = gross_points - points_dropped;

        let (multiplier, bonus) = if participated >= total_rounds {
            (config.participation.multiplier, config.participation.bonus)
        } else {
            (1.0, 0.0)
        };
        let manual_penalties = penalties.get(&driver_id).copied().unwrap_or(0);
        let total_points = round2(base_points as f64 * multiplier + bonus - manual_penalties as f64);

        let positions: Vec<u32> = season.rounds.iter().filter_map(|r| r.race_position).collect();
        let average_position = if positions.is_empty() {
            None
        } else {
            Some(round2(
                positions.iter().map(|&p| p as f64).sum::<f64>() / positions.len() as f64,
            ))
        };
        let round_points: Vec<f64> = season.rounds.iter().map(|r| r.points as f64).collect();

        standings.push(DriverChampionshipStanding {
            position: 0,
            championship_id,
            driver_id,
            driver_name: driver.last_name.clone(),
            trust_level: driver.trust_level,
            competitions_participated: participated,
            counted_rounds: participated - count,
            wins: season.wins,
            podiums: season.podiums,
            poles: season.poles,
            fastest_laps: season.fastest_laps,
            gross_points,
            points_dropped,
            base_points,
            participation_multiplier: multiplier,
            participation_bonus: bonus,
            manual_penalties,
            total_points,
            average_position,
            best_position: positions.iter().copied().min(),
            consistency_rating: consistency_rating(&round_points),
            rounds: season.rounds,
        });
    }

    standings.sort_by(compare_standings);
    for (i, row) in standings.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }

    tracing::debug!(
        championship_id,
        drivers = standings.len(),
        drop,
        "aggregated championship"
    );
    Ok(standings)
}

fn compare_standings(a: &DriverChampionshipStanding, b: &DriverChampionshipStanding) -> Ordering {
    b.total_points
        .total_cmp(&a.total_points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.podiums.cmp(&a.podiums))
        .then_with(|| b.poles.cmp(&a.poles))
        .then_with(|| a.manual_penalties.cmp(&b.manual_penalties))
        .then_with(|| a.driver_id.cmp(&b.driver_id))
}
