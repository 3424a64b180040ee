use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::championship::aggregate_championship;
use super::consistency::{consistency_bonus, round2};
use crate::data::{ChampionshipId, Championship, Dataset, DriverId, LeagueId};
use crate::error::{EngineResult, InputError};
use crate::scoring::ScoringConfig;

/// One tier column of a league row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierPoints {
    pub tier_number: u32,
    pub championship_id: ChampionshipId,
    /// None when the driver did not race in this tier
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverLeagueStanding {
    pub position: u32,
    pub league_id: LeagueId,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub trust_level: u32,
    /// Ordered by tier number, one entry per tier in the league
    pub tiers: Vec<TierPoints>,
    pub tiers_participated: u32,
    pub consistency_bonus: f64,
    pub total_final_points: f64,
    pub total_wins: u32,
    pub total_podiums: u32,
    pub total_poles: u32,
    pub total_fastest_laps: u32,
}

impl DriverLeagueStanding {
    pub fn tier_sum(&self) -> f64 {
        self.tiers.iter().filter_map(|t| t.points).sum()
    }
}

/// The league's championships ordered by tier, after checking every tier
/// number is present, in range and claimed once.
fn ordered_tiers(data: &Dataset, league_id: LeagueId) -> EngineResult<Vec<&Championship>> {
    let league = data.league(league_id)?;

    let mut by_tier: BTreeMap<u32, &Championship> = BTreeMap::new();
    for championship in data.league_tiers(league_id) {
        let tier = championship.tier_number.ok_or(InputError::MissingTier {
            championship: championship.championship_id,
            league: league_id,
        })?;
        if tier == 0 || tier > league.total_tiers {
            return Err(InputError::TierOutOfRange {
                championship: championship.championship_id,
                tier,
                total_tiers: league.total_tiers,
            }
            .into());
        }
        if let Some(first) = by_tier.insert(tier, championship) {
            return Err(InputError::DuplicateTier {
                league: league_id,
                tier,
                first: first.championship_id,
                second: championship.championship_id,
            }
            .into());
        }
    }
    Ok(by_tier.into_values().collect())
}

#[derive(Debug, Default)]
struct Career {
    points: BTreeMap<u32, f64>,
    wins: u32,
    podiums: u32,
    poles: u32,
    fastest_laps: u32,
}

/// Roll every tier of a league up into one table with a consistency bonus.
pub fn aggregate_league(
    data: &Dataset,
    league_id: LeagueId,
    config: &ScoringConfig,
) -> EngineResult<Vec<DriverLeagueStanding>> {
    let tiers = ordered_tiers(data, league_id)?;

    let mut careers: BTreeMap<DriverId, Career> = BTreeMap::new();
    for championship in &tiers {
        let tier = championship.tier_number.unwrap_or_default();
        for row in aggregate_championship(data, championship.championship_id, config)? {
            let career = careers.entry(row.driver_id).or_default();
            career.points.insert(tier, row.total_points);
            career.wins += row.wins;
            career.podiums += row.podiums;
            career.poles += row.poles;
            career.fastest_laps += row.fastest_laps;
        }
    }

    let mut standings = Vec::with_capacity(careers.len());
    for (driver_id, career) in careers {
        let driver = data.driver(driver_id)?;
        let columns: Vec<TierPoints> = tiers
            .iter()
            .map(|c| {
                let tier_number = c.tier_number.unwrap_or_default();
                TierPoints {
                    tier_number,
                    championship_id: c.championship_id,
                    points: career.points.get(&tier_number).copied(),
                }
            })
            .collect();
        let participated: Vec<f64> = columns.iter().filter_map(|t| t.points).collect();
        let bonus = consistency_bonus(&config.consistency, &participated);
        let sum: f64 = participated.iter().sum();

        standings.push(DriverLeagueStanding {
            position: 0,
            league_id,
            driver_id,
            driver_name: driver.last_name.clone(),
            trust_level: driver.trust_level,
            tiers: columns,
            tiers_participated: participated.len() as u32,
            consistency_bonus: bonus,
            total_final_points: round2(sum + bonus),
            total_wins: career.wins,
            total_podiums: career.podiums,
            total_poles: career.poles,
            total_fastest_laps: career.fastest_laps,
        });
    }

    standings.sort_by(compare_standings);
    for (i, row) in standings.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }

    tracing::debug!(league_id, tiers = tiers.len(), drivers = standings.len(), "aggregated league");
    Ok(standings)
}

fn compare_standings(a: &DriverLeagueStanding, b: &DriverLeagueStanding) -> Ordering {
    b.total_final_points
        .total_cmp(&a.total_final_points)
        .then_with(|| b.tiers_participated.cmp(&a.tiers_participated))
        .then_with(|| b.total_wins.cmp(&a.total_wins))
        .then_with(|| a.driver_id.cmp(&b.driver_id))
}
