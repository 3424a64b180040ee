use crate::scoring::{ConsistencyConfig, ConsistencyCurve};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let sum: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum / values.len() as f64).sqrt())
}

/// std / mean, undefined below two values or for a non-positive mean
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    if mean <= 0.0 {
        return None;
    }
    Some(std_dev(values)? / mean)
}

/// Map a CV onto the configured curve. Every curve is non-increasing in CV
/// and yields `scale` at zero.
pub fn apply_curve(config: &ConsistencyConfig, cv: f64) -> f64 {
    let cv = cv.max(0.0);
    match config.curve {
        ConsistencyCurve::Reciprocal => config.scale / (1.0 + cv),
        ConsistencyCurve::Linear => config.scale * (1.0 - cv).max(0.0),
        ConsistencyCurve::Exponential => config.scale * (-config.decay * cv).exp(),
    }
}

/// League bonus for a driver's per-tier totals. Zero when CV is undefined.
pub fn consistency_bonus(config: &ConsistencyConfig, tier_points: &[f64]) -> f64 {
    coefficient_of_variation(tier_points)
        .map(|cv| round2(apply_curve(config, cv)))
        .unwrap_or(0.0)
}

/// 1 / (1 + CV) over per-round totals, in 0..=1
pub fn consistency_rating(round_points: &[f64]) -> Option<f64> {
    coefficient_of_variation(round_points).map(|cv| round2(1.0 / (1.0 + cv)))
}
