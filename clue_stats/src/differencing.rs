//! Differencing helpers for integrated models

use crate::{Result, StatsError};

/// Apply `d` rounds of first differencing.
///
/// Each round shortens the series by one value; differencing stops early
/// once a single value remains.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `history`.
///
/// `differenced` holds future values on the `d`-times differenced scale;
/// the result is on the scale of `history`.
pub fn integrate(differenced: &[f64], history: &[f64], d: usize) -> Result<Vec<f64>> {
    if d == 0 {
        return Ok(differenced.to_vec());
    }
    if history.len() < d {
        return Err(StatsError::InsufficientData(format!(
            "Integrating order {} needs at least {} historical values, have {}",
            d,
            d,
            history.len()
        )));
    }

    // Last observed value at every differencing level 0..d
    let mut anchors = Vec::with_capacity(d);
    let mut level = history.to_vec();
    for _ in 0..d {
        anchors.push(*level.last().unwrap_or(&0.0));
        level = difference(&level, 1);
    }

    let mut result = differenced.to_vec();
    for anchor in anchors.into_iter().rev() {
        let mut cumsum = anchor;
        for value in result.iter_mut() {
            cumsum += *value;
            *value = cumsum;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_difference() {
        let series = vec![10.0, 12.0, 15.0, 14.0, 18.0];
        let diff = difference(&series, 1);
        assert_eq!(diff, vec![2.0, 3.0, -1.0, 4.0]);

        let diff2 = difference(&series, 2);
        assert_eq!(diff2, vec![1.0, -4.0, 5.0]);

        assert_eq!(difference(&series, 0), series);
    }

    #[test]
    fn test_integrate_inverts_difference() {
        let history = vec![1.0, 4.0, 9.0, 16.0, 25.0];
        // Continue the squares: 36, 49 have second differences of 2
        let future = integrate(&[2.0, 2.0], &history, 2).unwrap();
        assert_relative_eq!(future[0], 36.0);
        assert_relative_eq!(future[1], 49.0);

        let linear = integrate(&[1.0, 1.0, 1.0], &[5.0, 6.0], 1).unwrap();
        assert_eq!(linear, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_integrate_needs_history() {
        assert!(integrate(&[1.0], &[2.0], 2).is_err());
    }
}
