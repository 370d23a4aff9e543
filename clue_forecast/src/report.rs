//! Report payload handed to the external document renderer
//!
//! The renderer itself lives outside this crate; this module only guarantees
//! that training and forecast outputs serialise cleanly into the mappings it
//! expects.

use crate::error::Result;
use crate::forecast::ForecastResult;
use crate::pipeline::TrainingResult;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REPORT_TITLE: &str = "CLUE Forecasting Report";
pub const DEFAULT_REPORT_FILE: &str = "clue_report.pdf";
pub const DEFAULT_REPORT_NOTES: &str = "Generated via CLUE application.";

/// `{title, model_results, metrics, notes?, image?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub title: String,
    pub model_results: BTreeMap<String, Value>,
    pub metrics: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

impl ReportPayload {
    /// Model summary and metrics of a TRAIN invocation
    pub fn from_training(result: &TrainingResult) -> Self {
        let mut model_results = BTreeMap::new();
        model_results.insert("model_type".to_string(), json!(result.family.to_string()));
        model_results.insert("model_order".to_string(), json!(result.order));
        model_results.insert("evaluated_order".to_string(), json!(result.evaluated_order));
        model_results.insert("forecast_horizon".to_string(), json!(result.horizon));
        model_results.insert(result.criterion.to_string(), json!(result.score));

        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            model_results,
            metrics: result.metrics.to_map(),
            notes: Some(DEFAULT_REPORT_NOTES.to_string()),
            image: None,
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// Record the forecast that accompanies the report
    pub fn with_forecast(mut self, forecast: &ForecastResult) -> Self {
        self.model_results
            .insert("forecast_horizon".to_string(), json!(forecast.horizon()));
        self.model_results.insert(
            "confidence_level".to_string(),
            json!(forecast.confidence_level()),
        );
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: Option<S>) -> Self {
        self.notes = notes.map(Into::into);
        self
    }

    pub fn with_image<P: Into<PathBuf>>(mut self, image: P) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the payload as JSON, creating parent directories as needed
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Plain-text rendering of the model summary and metrics tables
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out);
        let _ = writeln!(out, "Model Summary");
        for (key, value) in &self.model_results {
            let _ = writeln!(out, "  {:<18} {}", key, render_value(value));
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Evaluation Metrics");
        let _ = writeln!(out, "  {:<18} Value", "Metric");
        for (name, value) in &self.metrics {
            let _ = writeln!(out, "  {:<18} {:.4}", name, value);
        }
        if let Some(notes) = &self.notes {
            let _ = writeln!(out);
            let _ = writeln!(out, "Notes");
            let _ = writeln!(out, "  {}", notes);
        }
        out
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!(
            "({})",
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        ),
        other => other.to_string(),
    }
}

/// Default to [`DEFAULT_REPORT_FILE`] and make sure the path ends in `.pdf`
pub fn normalize_report_path(path: Option<&str>) -> PathBuf {
    let path = path.map(str::trim).filter(|p| !p.is_empty());
    match path {
        None => PathBuf::from(DEFAULT_REPORT_FILE),
        Some(p) if p.to_lowercase().ends_with(".pdf") => PathBuf::from(p),
        Some(p) => PathBuf::from(format!("{}.pdf", p)),
    }
}
