use serde::{Deserialize, Serialize};

use super::factors::RankRange;
use crate::error::ConfigError;

/// Main scoring configuration.
///
/// Passed explicitly into every computation; nothing reads scoring rules
/// from ambient state.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   race_points: [25, 18, 15, 12, 10, 8, 6, 4, 2, 1]
///   pole_points: 1
///   fastest_lap_points: 1
///   drop_worst_results: 1
///   participation:
///     multiplier: 1.1
///     bonus: 5
///   consistency:
///     scale: 10
///     curve: reciprocal
///   time_attack:
///     deadline_offset: 1d
///     points:
///       - { range: "1", points: 25 }
///       - { range: "2-3", points: 15 }
///       - { range: ">3", points: 5 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Points by race finishing position, index 0 = winner
    #[serde(default)]
    pub race_points: Option<Vec<u32>>,

    #[serde(default)]
    pub pole_points: Option<u32>,

    #[serde(default)]
    pub fastest_lap_points: Option<u32>,

    /// Used for championships that don't set their own
    #[serde(default)]
    pub drop_worst_results: u32,

    #[serde(default)]
    pub drop_policy: DropPolicy,

    #[serde(default)]
    pub participation: ParticipationConfig,

    #[serde(default)]
    pub consistency: ConsistencyConfig,

    #[serde(default)]
    pub time_attack: Option<TimeAttackConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            race_points: Some(vec![25, 18, 15, 12, 10, 8, 6, 4, 2, 1]),
            pole_points: Some(1),
            fastest_lap_points: Some(1),
            drop_worst_results: 0,
            drop_policy: DropPolicy::default(),
            participation: ParticipationConfig::default(),
            consistency: ConsistencyConfig::default(),
            time_attack: Some(TimeAttackConfig::default()),
        }
    }
}

impl ScoringConfig {
    pub fn race_table(&self) -> Result<&[u32], ConfigError> {
        match self.race_points.as_deref() {
            None => Err(ConfigError::MissingPointsTable("race_points")),
            Some([]) => Err(ConfigError::Invalid(vec![
                "scoring.race_points: must list at least one position".to_string(),
            ])),
            Some(table) => Ok(table),
        }
    }

    pub fn pole(&self) -> Result<u32, ConfigError> {
        self.pole_points
            .ok_or(ConfigError::MissingPointsTable("pole_points"))
    }

    pub fn fastest_lap(&self) -> Result<u32, ConfigError> {
        self.fastest_lap_points
            .ok_or(ConfigError::MissingPointsTable("fastest_lap_points"))
    }

    pub fn time_attack_table(&self) -> Result<&TimeAttackConfig, ConfigError> {
        self.time_attack
            .as_ref()
            .ok_or(ConfigError::MissingPointsTable("time_attack"))
    }
}

/// How many of a driver's worst rounds are discarded
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Drop only once a driver has raced more than `total_rounds - N` rounds
    #[default]
    SeasonMinimum,
    /// Always drop up to N rounds, even mid-season
    Always,
}

/// Adjustment for drivers who entered every round: `base * multiplier + bonus`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParticipationConfig {
    pub multiplier: f64,
    pub bonus: f64,
}

impl Default for ParticipationConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            bonus: 0.0,
        }
    }
}

/// Maps the coefficient of variation of a driver's tier totals to a bonus
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyCurve {
    /// scale / (1 + cv)
    #[default]
    Reciprocal,
    /// scale * max(0, 1 - cv)
    Linear,
    /// scale * e^(-decay * cv)
    Exponential,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConsistencyConfig {
    /// Bonus awarded at zero variation
    pub scale: f64,
    pub curve: ConsistencyCurve,
    /// Only used by the exponential curve
    pub decay: f64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            scale: 10.0,
            curve: ConsistencyCurve::default(),
            decay: 1.0,
        }
    }
}

/// Time-attack points table and freeze deadline
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeAttackConfig {
    /// Rank buckets, first match wins
    pub points: Vec<PointsBucket>,

    /// How long before the competition's end the board freezes (humantime, e.g. "1d")
    #[serde(default = "default_deadline_offset")]
    pub deadline_offset: String,
}

fn default_deadline_offset() -> String {
    "1d".to_string()
}

impl Default for TimeAttackConfig {
    fn default() -> Self {
        let points = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1]
            .iter()
            .enumerate()
            .map(|(i, p)| PointsBucket {
                range: (i + 1).to_string(),
                points: *p,
            })
            .collect();
        Self {
            points,
            deadline_offset: default_deadline_offset(),
        }
    }
}

impl TimeAttackConfig {
    pub fn deadline_offset(&self) -> Result<chrono::Duration, ConfigError> {
        let invalid = |e: String| {
            ConfigError::Invalid(vec![format!(
                "scoring.time_attack.deadline_offset: invalid '{}' - {}",
                self.deadline_offset, e
            )])
        };
        let std = humantime::parse_duration(self.deadline_offset.trim())
            .map_err(|e| invalid(e.to_string()))?;
        chrono::Duration::from_std(std).map_err(|e| invalid(e.to_string()))
    }

    /// Parsed buckets in declaration order. Fails on the first bad range.
    pub fn ranges(&self) -> Result<Vec<(RankRange, u32)>, ConfigError> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, bucket)| {
                RankRange::parse(&bucket.range)
                    .map(|range| (range, bucket.points))
                    .map_err(|e| {
                        ConfigError::Invalid(vec![format!(
                            "scoring.time_attack.points[{}].range: invalid '{}' - {}",
                            i, bucket.range, e
                        )])
                    })
            })
            .collect()
    }
}

/// Rank range mapped to points.
/// Range format: "<N", "<=N", ">N", ">=N", "N-M" (inclusive) or "N"
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PointsBucket {
    pub range: String,
    pub points: u32,
}
