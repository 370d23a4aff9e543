//! Derivative-free minimisation
//!
//! A bounded Nelder-Mead simplex search. The search is fully deterministic:
//! the initial simplex is derived from the starting point and ties between
//! vertices are broken by their index.

use crate::{Result, StatsError};
use serde::{Deserialize, Serialize};

/// Configuration for the Nelder-Mead search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Relative tolerance on the spread of objective values
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Initial simplex step, relative to the starting coordinate
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tolerance: 1e-10,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a Nelder-Mead search
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached before `max_iter`
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// `bounds`, when given, clamps every coordinate into `(min, max)` after each
/// simplex move.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> Result<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Err(StatsError::InvalidInput(
            "Nelder-Mead needs at least one parameter".to_string(),
        ));
    }
    if let Some(b) = bounds {
        if b.len() != n {
            return Err(StatsError::InvalidInput(format!(
                "Expected {} bounds, got {}",
                n,
                b.len()
            )));
        }
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        match bounds {
            Some(b) => point
                .iter()
                .zip(b.iter())
                .map(|(&x, &(lo, hi))| x.clamp(lo, hi))
                .collect(),
            None => point,
        }
    };

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(clamp(initial.to_vec()));
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-8 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(clamp(vertex));
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();
    let mut order: Vec<usize> = (0..=n).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = values[worst] - values[best];
        if spread.is_finite() && spread <= config.tolerance * (1.0 + values[best].abs()) {
            converged = true;
            break;
        }

        let centroid = centroid(&simplex, worst);
        let diameter = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        let scale = 1.0 + centroid.iter().map(|c| c.abs()).fold(0.0, f64::max);
        if values[best].is_finite() && diameter <= config.tolerance * scale {
            converged = true;
            break;
        }

        iterations += 1;

        let reflected = clamp(towards(&centroid, &simplex[worst], -config.alpha));
        let reflected_value = objective(&reflected);

        if reflected_value < values[best] {
            let expanded = clamp(towards(&centroid, &reflected, config.gamma));
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < values[worst] {
            let outside = clamp(towards(&centroid, &reflected, config.rho));
            let value = objective(&outside);
            (outside, value)
        } else {
            let inside = clamp(towards(&centroid, &simplex[worst], config.rho));
            let value = objective(&inside);
            (inside, value)
        };

        if contracted_value < values[worst].min(reflected_value) {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink every vertex towards the best one
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                simplex[i] = clamp(towards(&anchor, &simplex[i], config.sigma));
                values[i] = objective(&simplex[i]);
            }
        }
    }

    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));
    let best = order[0];

    Ok(NelderMeadResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    })
}

/// Centroid of every vertex except `exclude`
fn centroid(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let dims = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; dims];

    for (i, vertex) in simplex.iter().enumerate() {
        if i == exclude {
            continue;
        }
        for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
            *c += v;
        }
    }

    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

/// `origin + factor * (point - origin)`
fn towards(origin: &[f64], point: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point.iter())
        .map(|(o, p)| o + factor * (p - o))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_bowl() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] + 3.0).powi(2),
            &[0.0, 0.0],
            None,
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.point[1], -3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bounds_are_respected() {
        let bounds = [(-1.0, 1.0)];
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[0.0],
            Some(&bounds),
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.point[0] <= 1.0);
        assert_relative_eq!(result.point[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let objective = |x: &[f64]| (x[0] - 0.3).powi(2) + 2.0 * (x[1] - 0.7).powi(2) + x[0] * x[1];
        let config = NelderMeadConfig::default();
        let a = nelder_mead(objective, &[0.1, 0.1], None, &config).unwrap();
        let b = nelder_mead(objective, &[0.1, 0.1], None, &config).unwrap();

        assert_eq!(a.point, b.point);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_rejects_empty_and_mismatched_bounds() {
        let config = NelderMeadConfig::default();
        assert!(nelder_mead(|_| 0.0, &[], None, &config).is_err());
        assert!(nelder_mead(|_| 0.0, &[1.0, 2.0], Some(&[(0.0, 1.0)]), &config).is_err());
    }
}
