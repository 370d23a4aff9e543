//! Normal distribution quantiles for interval estimation

use crate::{Result, StatsError};
use statrs::distribution::{ContinuousCDF, Normal};

/// Quantile of the standard normal distribution at probability `p`
pub fn normal_quantile(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(StatsError::InvalidInput(format!(
            "Probability must be in (0, 1), got {}",
            p
        )));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| StatsError::CalculationError(format!("Standard normal: {}", e)))?;

    Ok(normal.inverse_cdf(p))
}

/// Critical value `z` such that `P(|Z| <= z) = confidence_level`
pub fn two_sided_z(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(StatsError::InvalidInput(format!(
            "Confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }

    normal_quantile((1.0 + confidence_level) / 2.0)
}
