use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use clue_forecast::data::{Frequency, TimeSeries};
use clue_forecast::error::ForecastError;
use clue_forecast::forecast::{forecast, ForecastResult};
use clue_forecast::models::{ModelFamily, ModelSpec, Order, SearchBounds};
use clue_forecast::pipeline::ModelSelection;
use clue_forecast::selection::select_order;
use clue_forecast::trainer::{fit, FittedModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rstest::rstest;

fn as_series(values: Vec<f64>) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    TimeSeries::from_values(start, Frequency::BusinessDaily, values).unwrap()
}

fn noisy_series(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, rng.gen_range(0.5..3.0)).unwrap();
    let drift = rng.gen_range(-0.5..0.5);
    let mut level = 100.0;
    (0..n)
        .map(|_| {
            level += drift + noise.sample(&mut rng);
            level
        })
        .collect()
}

fn auto_fit(series: &TimeSeries) -> FittedModel {
    let spec = select_order(series, &ModelFamily::AutoArima, &SearchBounds::default()).unwrap();
    fit(series, &spec).unwrap()
}

#[test]
fn test_intervals_contain_points_and_widen() {
    for seed in 0..8 {
        let series = as_series(noisy_series(60, seed));
        let result = forecast(&auto_fit(&series), 20, 0.95).unwrap();

        assert_eq!(result.values().len(), 20);
        assert_eq!(result.intervals().len(), 20);
        for (point, (lower, upper)) in result.values().iter().zip(result.intervals()) {
            assert!(lower <= point && point <= upper, "seed {}", seed);
        }

        let widths = result.widths();
        assert!(
            widths.windows(2).all(|w| w[1] >= w[0] - 1e-12),
            "seed {}: widths shrink {:?}",
            seed,
            widths
        );
    }
}

#[test]
fn test_constant_series() {
    let series = as_series(vec![25.0; 50]);
    let result = forecast(&auto_fit(&series), 10, 0.95).unwrap();

    for (point, width) in result.values().iter().zip(result.widths()) {
        assert_relative_eq!(*point, 25.0, epsilon = 1e-9);
        assert!(width < 1e-4, "width {} is not near zero", width);
    }
}

#[test]
fn test_linear_trend_is_extrapolated() {
    let series = as_series((0..100).map(|i| 100.0 + i as f64).collect());
    let result = forecast(&auto_fit(&series), 5, 0.95).unwrap();

    for (h, point) in result.values().iter().enumerate() {
        assert_relative_eq!(*point, 200.0 + h as f64, epsilon = 1e-6);
    }
}

#[test]
fn test_higher_confidence_is_wider() {
    let series = as_series(noisy_series(80, 99));
    let model = auto_fit(&series);

    let narrow = forecast(&model, 5, 0.80).unwrap();
    let wide = forecast(&model, 5, 0.99).unwrap();

    assert_eq!(narrow.values(), wide.values());
    for (n, w) in narrow.widths().iter().zip(wide.widths()) {
        assert!(w > *n);
    }
}

#[test]
fn test_future_timestamps_follow_the_calendar() {
    let series = as_series(noisy_series(40, 3));
    let result = forecast(&auto_fit(&series), 3, 0.95).unwrap();

    let last = series.last_timestamp().unwrap();
    let timestamps = result.timestamps().unwrap();
    assert_eq!(timestamps[0], Frequency::BusinessDaily.next(last));
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
}

#[rstest]
#[case(0, 0.95)]
#[case(5, 0.0)]
#[case(5, 1.0)]
#[case(5, 1.5)]
#[case(5, f64::NAN)]
fn test_invalid_requests(#[case] horizon: usize, #[case] level: f64) {
    let series = as_series(noisy_series(40, 4));
    let err = forecast(&auto_fit(&series), horizon, level).unwrap_err();
    assert!(matches!(err, ForecastError::ValidationError(_)));
}

#[rstest]
#[case(0)]
#[case(-3)]
fn test_non_positive_horizon_selection(#[case] horizon: i64) {
    let err = ModelSelection::new(ModelFamily::AutoArima, horizon, 0.95).unwrap_err();
    assert!(matches!(err, ForecastError::ValidationError(_)));
}

#[test]
fn test_result_invariants_are_enforced() {
    let spec = ModelSpec::new(ModelFamily::AutoArima, Order::new(0, 1, 0));

    let inverted = ForecastResult::new(spec, vec![1.0], vec![(2.0, 3.0)], 0.95, 1);
    assert!(matches!(inverted, Err(ForecastError::InferenceError(_))));

    let short = ForecastResult::new(spec, vec![1.0], vec![(0.0, 2.0)], 0.95, 2);
    assert!(short.is_err());

    let ok = ForecastResult::new(spec, vec![1.0, 2.0], vec![(0.0, 2.0), (1.0, 3.0)], 0.95, 2).unwrap();
    assert_eq!(ok.lower(), vec![0.0, 1.0]);
    assert_eq!(ok.upper(), vec![2.0, 3.0]);
}

#[test]
fn test_forecast_json_shape() {
    let series = as_series(noisy_series(40, 8));
    let result = forecast(&auto_fit(&series), 4, 0.9).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(json["forecast"].as_array().unwrap().len(), 4);
    let intervals = json["confidence_intervals"].as_array().unwrap();
    assert_eq!(intervals.len(), 4);
    assert_eq!(intervals[0].as_array().unwrap().len(), 2);
    assert_eq!(json["confidence_level"], 0.9);
}
