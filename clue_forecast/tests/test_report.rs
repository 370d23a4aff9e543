use clue_forecast::evaluation::EvaluationMetrics;
use clue_forecast::forecast::ForecastResult;
use clue_forecast::models::{ModelFamily, ModelSpec, Order};
use clue_forecast::pipeline::TrainingResult;
use clue_forecast::report::{normalize_report_path, ReportPayload, DEFAULT_REPORT_TITLE};
use clue_forecast::selection::InformationCriterion;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;
use tempfile::tempdir;

fn training() -> TrainingResult {
    TrainingResult {
        family: ModelFamily::AutoArima,
        order: Order::new(1, 1, 0),
        criterion: InformationCriterion::Aic,
        score: 512.25,
        evaluated_order: Order::new(0, 1, 1),
        metrics: EvaluationMetrics {
            mae: 1.25,
            mse: 2.5,
            rmse: 2.5_f64.sqrt(),
            mape: 0.75,
        },
        horizon: 30,
    }
}

#[test]
fn test_payload_from_training() {
    let payload = ReportPayload::from_training(&training());

    assert_eq!(payload.title, DEFAULT_REPORT_TITLE);
    assert_eq!(payload.model_results["model_type"], json!("AUTO_ARIMA"));
    assert_eq!(payload.model_results["model_order"], json!([1, 1, 0]));
    assert_eq!(payload.model_results["evaluated_order"], json!([0, 1, 1]));
    assert_eq!(payload.model_results["forecast_horizon"], json!(30));
    assert_eq!(payload.metrics["MAE"], 1.25);
    assert_eq!(payload.metrics.len(), 4);
}

#[test]
fn test_payload_json_shape() {
    let payload = ReportPayload::from_training(&training())
        .with_notes(None::<String>)
        .with_image("plots/forecast.png");
    let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

    assert!(value.get("notes").is_none());
    assert_eq!(value["image"], json!("plots/forecast.png"));
    assert_eq!(value["metrics"]["MAPE"], json!(0.75));
}

#[test]
fn test_payload_with_forecast() {
    let spec = ModelSpec::new(ModelFamily::AutoArima, Order::new(1, 1, 0));
    let forecast = ForecastResult::new(spec, vec![1.0, 2.0], vec![(0.0, 2.0), (1.0, 3.0)], 0.9, 2).unwrap();

    let payload = ReportPayload::from_training(&training()).with_forecast(&forecast);
    assert_eq!(payload.model_results["forecast_horizon"], json!(2));
    assert_eq!(payload.model_results["confidence_level"], json!(0.9));
}

#[test]
fn test_write_json_creates_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("report.json");

    ReportPayload::from_training(&training())
        .write_json(&path)
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"model_order\""));
}

#[test]
fn test_render_text() {
    let text = ReportPayload::from_training(&training())
        .with_title("Quarterly Review")
        .render_text();

    assert!(text.starts_with("Quarterly Review\n"));
    assert!(text.contains("Model Summary"));
    assert!(text.contains("model_order"));
    assert!(text.contains("(1, 1, 0)"));
    assert!(text.contains("Evaluation Metrics"));
    assert!(text.contains("1.2500"));
    assert!(text.contains("Generated via CLUE application."));
}

#[test]
fn test_normalize_report_path() {
    assert_eq!(normalize_report_path(None), PathBuf::from("clue_report.pdf"));
    assert_eq!(normalize_report_path(Some("  ")), PathBuf::from("clue_report.pdf"));
    assert_eq!(normalize_report_path(Some("out/summary")), PathBuf::from("out/summary.pdf"));
    assert_eq!(normalize_report_path(Some("SUMMARY.PDF")), PathBuf::from("SUMMARY.PDF"));
}
