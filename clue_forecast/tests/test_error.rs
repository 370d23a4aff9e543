use clue_forecast::error::ForecastError;
use clue_stats::StatsError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let stats_error = StatsError::InsufficientData("need two values".to_string());
    assert!(matches!(
        ForecastError::from(stats_error),
        ForecastError::StatsError(_)
    ));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));

    let toml_error = toml::from_str::<toml::Value>("= nope").unwrap_err();
    assert!(matches!(
        ForecastError::from(toml_error),
        ForecastError::ConfigError(_)
    ));
}

#[test]
fn test_error_display() {
    let cases = [
        (ForecastError::DataError("empty".to_string()), "Data error: empty"),
        (
            ForecastError::ModelSelectionError("none fitted".to_string()),
            "Model selection error: none fitted",
        ),
        (ForecastError::FitError("diverged".to_string()), "Fit error: diverged"),
        (
            ForecastError::InferenceError("not finite".to_string()),
            "Inference error: not finite",
        ),
        (
            ForecastError::ValidationError("horizon".to_string()),
            "Validation error: horizon",
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let message = ForecastError::from(io_error).to_string();
    assert!(message.contains("IO error"));
    assert!(message.contains("permission denied"));
}
