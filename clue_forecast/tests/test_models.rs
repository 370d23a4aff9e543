use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use clue_forecast::data::{Frequency, TimeSeries};
use clue_forecast::error::ForecastError;
use clue_forecast::models::arima::ArimaModel;
use clue_forecast::models::{
    ForecastModel, ModelFamily, ModelSpec, Order, SearchBounds, TrainedForecastModel,
};
use clue_forecast::trainer::fit;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut values = Vec::with_capacity(n);
    let mut prev = 0.0;
    for _ in 0..n {
        prev = phi * prev + noise.sample(&mut rng);
        values.push(50.0 + prev);
    }
    values
}

/// Random walk whose increments follow an AR(1) process
fn integrated_ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut level = 100.0;
    ar1(phi, n, seed)
        .into_iter()
        .map(|v| {
            level += v - 50.0;
            level
        })
        .collect()
}

fn as_series(values: Vec<f64>) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    TimeSeries::from_values(start, Frequency::daily(), values).unwrap()
}

#[test]
fn test_order_serialises_as_array() {
    let order = Order::new(1, 2, 0);
    assert_eq!(serde_json::to_string(&order).unwrap(), "[1,2,0]");
    assert_eq!(serde_json::from_str::<Order>("[1,2,0]").unwrap(), order);
    assert_eq!(order.to_string(), "(1, 2, 0)");
}

#[test]
fn test_model_family_round_trip() {
    assert_eq!("AUTO_ARIMA".parse::<ModelFamily>().unwrap(), ModelFamily::AutoArima);
    assert_eq!("auto_arima".parse::<ModelFamily>().unwrap(), ModelFamily::AutoArima);
    assert_eq!(
        "ARIMA(2, 1, 0)".parse::<ModelFamily>().unwrap(),
        ModelFamily::Arima(Order::new(2, 1, 0))
    );
    assert_eq!(ModelFamily::Arima(Order::new(2, 1, 0)).to_string(), "ARIMA(2,1,0)");

    for bad in ["PROPHET", "ARIMA(1,1)", "ARIMA(a,b,c)", "ARIMA(1,1,1"] {
        assert!(matches!(
            bad.parse::<ModelFamily>(),
            Err(ForecastError::ValidationError(_))
        ));
    }

    let spec = ModelSpec::new(ModelFamily::AutoArima, Order::new(0, 1, 1));
    let json = serde_json::to_string(&spec).unwrap();
    assert_eq!(json, r#"{"family":"AUTO_ARIMA","order":[0,1,1]}"#);
}

#[test]
fn test_search_bounds() {
    let bounds = SearchBounds::new(1, 1, 2);
    let candidates = bounds.candidates();

    assert_eq!(candidates.len(), 12);
    assert_eq!(candidates[0], Order::new(0, 0, 0));
    assert_eq!(candidates[1], Order::new(0, 0, 1));
    assert_eq!(candidates[11], Order::new(1, 1, 2));
    assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    assert!(candidates.iter().all(|o| bounds.contains(o)));
    assert!(!bounds.contains(&Order::new(2, 0, 0)));

    assert!(SearchBounds::new(2, 4, 2).validate().is_err());
    assert!(SearchBounds::new(11, 1, 1).validate().is_err());
    assert!(SearchBounds::default().validate().is_ok());
}

#[test]
fn test_ar1_estimation() {
    let trained = ArimaModel::new(Order::new(1, 0, 0))
        .train(&ar1(0.6, 500, 7))
        .unwrap();

    assert_relative_eq!(trained.ar_coefficients()[0], 0.6, epsilon = 0.1);
    assert_relative_eq!(trained.intercept().unwrap(), 50.0, epsilon = 0.5);
    assert_relative_eq!(trained.sigma2(), 1.0, epsilon = 0.2);
    assert_eq!(trained.residuals().len(), 499);
}

#[test]
fn test_fit_is_deterministic() {
    let series = as_series(integrated_ar1(0.4, 120, 11));
    let spec = ModelSpec::new(ModelFamily::AutoArima, Order::new(1, 1, 1));

    let first = fit(&series, &spec).unwrap();
    let second = fit(&series, &spec).unwrap();

    assert_eq!(first.ar_coefficients(), second.ar_coefficients());
    assert_eq!(first.ma_coefficients(), second.ma_coefficients());
    assert_eq!(first.intercept(), second.intercept());
    assert_eq!(first.sigma2(), second.sigma2());
    assert_eq!(first.residuals(), second.residuals());
}

#[test]
fn test_fit_exposes_diagnostics() {
    let series = as_series(ar1(0.5, 200, 3));
    let spec = ModelSpec::new(ModelFamily::Arima(Order::new(1, 0, 1)), Order::new(1, 0, 1));
    let fitted = fit(&series, &spec).unwrap();

    assert_eq!(fitted.ar_coefficients().len(), 1);
    assert_eq!(fitted.ma_coefficients().len(), 1);
    assert_eq!(fitted.residuals().len(), 199);
    assert_eq!(fitted.n_observations(), 200);
    assert!(fitted.aic() < fitted.bic());
    assert!(fitted.aic() < fitted.aicc());
    assert!(fitted.log_likelihood().is_finite());
    assert_eq!(fitted.last_timestamp(), series.last_timestamp());
}

#[test]
fn test_fit_rejects_contradictory_spec() {
    let series = as_series(ar1(0.5, 60, 5));
    let spec = ModelSpec::new(ModelFamily::Arima(Order::new(1, 0, 0)), Order::new(0, 1, 0));
    assert!(matches!(
        fit(&series, &spec),
        Err(ForecastError::ValidationError(_))
    ));
}

#[test]
fn test_fit_too_short() {
    let series = as_series(vec![1.0, 2.0, 4.0, 3.0]);
    let spec = ModelSpec::new(ModelFamily::AutoArima, Order::new(2, 1, 2));
    assert!(matches!(fit(&series, &spec), Err(ForecastError::FitError(_))));
}

#[test]
fn test_model_forecast_shape() {
    let trained = ArimaModel::new(Order::new(1, 1, 0))
        .train(&ar1(0.3, 100, 9))
        .unwrap();
    let forecast = trained.forecast(12).unwrap();

    assert_eq!(forecast.points.len(), 12);
    assert_eq!(forecast.std_errors.len(), 12);
    assert!(forecast.std_errors.windows(2).all(|w| w[0] <= w[1]));
    assert!(trained.forecast(0).is_err());
}

#[test]
fn test_optimizer_settings_from_toml() {
    let optimizer: clue_stats::NelderMeadConfig = toml::from_str("max_iter = 2000").unwrap();
    assert_eq!(optimizer.max_iter, 2000);
    assert_eq!(optimizer.tolerance, clue_stats::NelderMeadConfig::default().tolerance);

    let values = ar1(0.5, 200, 11);
    let trained = ArimaModel::new(Order::new(1, 0, 0))
        .with_optimizer(optimizer)
        .train(&values)
        .unwrap();
    assert!(trained.iterations() <= 2000);
    assert!(trained.ar_coefficients()[0] > 0.2);
}
