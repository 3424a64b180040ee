use super::config::ScoringConfig;
use super::factors::RankRange;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// Required tables that are simply absent are not reported here; the
/// computation that needs them refuses to run instead.
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref table) = config.race_points {
        if table.is_empty() {
            errors.push("scoring.race_points: must list at least one position".to_string());
        }
    }

    let participation = &config.participation;
    if !participation.multiplier.is_finite() || participation.multiplier < 0.0 {
        errors.push("scoring.participation.multiplier: must be non-negative".to_string());
    }
    if !participation.bonus.is_finite() {
        errors.push("scoring.participation.bonus: must be a number".to_string());
    }

    let consistency = &config.consistency;
    if !consistency.scale.is_finite() || consistency.scale < 0.0 {
        errors.push("scoring.consistency.scale: must be non-negative".to_string());
    }
    if !consistency.decay.is_finite() || consistency.decay < 0.0 {
        errors.push("scoring.consistency.decay: must be non-negative".to_string());
    }

    // Validate time attack buckets
    if let Some(ref time_attack) = config.time_attack {
        for (i, bucket) in time_attack.points.iter().enumerate() {
            if let Err(e) = RankRange::parse(&bucket.range) {
                errors.push(format!(
                    "scoring.time_attack.points[{}].range: invalid '{}' - {}",
                    i, bucket.range, e
                ));
            }
        }
        if let Err(e) = time_attack.deadline_offset() {
            errors.push(e.to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{PointsBucket, TimeAttackConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_missing_tables_are_not_validation_errors() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_empty_race_table() {
        let config = ScoringConfig {
            race_points: Some(vec![]),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.race_points"));
    }

    #[test]
    fn test_negative_multiplier_and_scale() {
        let mut config = ScoringConfig::default();
        config.participation.multiplier = -1.0;
        config.consistency.scale = -5.0;
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("multiplier"));
        assert!(errors[1].contains("scale"));
    }

    #[test]
    fn test_invalid_bucket_range() {
        let config = ScoringConfig {
            time_attack: Some(TimeAttackConfig {
                points: vec![PointsBucket {
                    range: "top three".to_string(),
                    points: 10,
                }],
                deadline_offset: "1d".to_string(),
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.time_attack.points[0].range"));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = ScoringConfig::default();
        config.consistency.decay = -1.0;
        config.time_attack = Some(TimeAttackConfig {
            points: vec![PointsBucket {
                range: "9-2".to_string(),
                points: 1,
            }],
            deadline_offset: "soon".to_string(),
        });
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[2].contains("deadline_offset"));
    }
}
