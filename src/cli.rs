//! Command line front end
//!
//! Every subcommand reads one CSV file, runs a pipeline stage and prints the
//! outcome as JSON, or as plain text with `--text`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clue_forecast::config::PipelineConfig;
use clue_forecast::data::{DataSource, TimeSeries};
use clue_forecast::eda::eda_summary;
use clue_forecast::evaluation::HoldoutSize;
use clue_forecast::models::ModelFamily;
use clue_forecast::pipeline::{LoadReport, ModelSelection, Pipeline};
use clue_forecast::report::{normalize_report_path, ReportPayload};
use log::info;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clue")]
#[command(about = "Forecast financial time series with ARIMA models", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print plain text instead of JSON
    #[arg(long, global = true)]
    pub text: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarise a price series
    Eda {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Select and fit a model, then score it on a holdout
    Train {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Forecast future values with confidence intervals
    Forecast {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Train a model and write the report payload for the document renderer
    Report {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Report file; `.pdf` is appended when missing
        #[arg(short, long)]
        output: Option<String>,

        /// Report title
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// CSV file with a time column and a value column
    #[arg(long)]
    pub csv: PathBuf,

    /// Value column (default: Close)
    #[arg(short, long)]
    pub column: Option<String>,

    /// Time column (default: detected from the headers)
    #[arg(long)]
    pub time_column: Option<String>,

    /// TOML pipeline configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    /// AUTO_ARIMA or ARIMA(p,d,q)
    #[arg(short, long, default_value = "AUTO_ARIMA")]
    pub family: String,

    /// Number of steps to forecast
    #[arg(long, allow_hyphen_values = true)]
    pub horizon: Option<i64>,

    /// Confidence level of the intervals, inside (0, 1)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Number of trailing observations held out for evaluation
    #[arg(long)]
    pub holdout: Option<usize>,
}

impl SourceArgs {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("failed to read configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(column) = &self.column {
            config.ingest.value_column = column.clone();
        }
        if let Some(column) = &self.time_column {
            config.ingest.time_column = Some(column.clone());
        }
        Ok(config)
    }
}

impl ModelArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(holdout) = self.holdout {
            config.evaluation.holdout = HoldoutSize::Count(holdout);
        }
    }

    fn selection(&self, config: &PipelineConfig) -> Result<ModelSelection> {
        let family: ModelFamily = self.family.parse()?;
        let horizon = self
            .horizon
            .unwrap_or(config.forecast.horizon as i64);
        let confidence = self
            .confidence
            .unwrap_or(config.forecast.confidence_level);
        Ok(ModelSelection::new(family, horizon, confidence)?)
    }
}

fn load(source: &SourceArgs, config: PipelineConfig) -> Result<(Pipeline, TimeSeries, LoadReport)> {
    let pipeline = Pipeline::new(config)?;
    let (series, report) = pipeline
        .load(&DataSource::csv(&source.csv))
        .with_context(|| format!("failed to load {}", source.csv.display()))?;
    info!(
        "Loaded {} observations from {} ({} missing)",
        series.len(),
        source.csv.display(),
        report.missing()
    );
    Ok((pipeline, series, report))
}

/// Run one subcommand, writing its result to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::Eda { source } => {
            let (_, series, report) = load(source, source.pipeline_config()?)?;
            let summary = eda_summary(&series, report.missing())?;
            if cli.text {
                writeln!(out, "{}", summary)?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            }
        }
        Command::Train { source, model } => {
            let mut config = source.pipeline_config()?;
            model.apply(&mut config);
            let selection = model.selection(&config)?;
            let (pipeline, series, _) = load(source, config)?;

            let training = pipeline.train(&series, &selection)?;
            if cli.text {
                writeln!(out, "Model : {}", training.family)?;
                writeln!(out, "Order : {}", training.order)?;
                writeln!(out, "{:<6}: {:.4}", training.criterion, training.score)?;
                writeln!(out, "Holdout scored with order {}", training.evaluated_order)?;
                writeln!(out, "{}", training.metrics)?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&training)?)?;
            }
        }
        Command::Forecast { source, model } => {
            let mut config = source.pipeline_config()?;
            model.apply(&mut config);
            let selection = model.selection(&config)?;
            let (pipeline, series, _) = load(source, config)?;

            let result = pipeline.forecast(&series, &selection)?;
            if cli.text {
                writeln!(
                    out,
                    "ARIMA{} at {:.0}% confidence",
                    result.spec().order,
                    result.confidence_level() * 100.0
                )?;
                for (step, (value, (lower, upper))) in
                    result.values().iter().zip(result.intervals()).enumerate()
                {
                    let label = match result.timestamps() {
                        Some(timestamps) => timestamps[step].format("%Y-%m-%d %H:%M:%S").to_string(),
                        None => format!("t+{}", step + 1),
                    };
                    writeln!(out, "{}  {:.4}  [{:.4}, {:.4}]", label, value, lower, upper)?;
                }
            } else {
                writeln!(out, "{}", result.to_json()?)?;
            }
        }
        Command::Report {
            source,
            model,
            output,
            title,
        } => {
            let mut config = source.pipeline_config()?;
            model.apply(&mut config);
            let selection = model.selection(&config)?;
            let (pipeline, series, _) = load(source, config)?;

            let training = pipeline.train(&series, &selection)?;
            let forecast = pipeline.forecast(&series, &selection)?;
            let mut payload = ReportPayload::from_training(&training).with_forecast(&forecast);
            if let Some(title) = title {
                payload = payload.with_title(title.as_str());
            }

            let report_path = normalize_report_path(output.as_deref());
            let payload_path = report_path.with_extension("json");
            payload
                .write_json(&payload_path)
                .with_context(|| format!("failed to write {}", payload_path.display()))?;
            info!(
                "Report payload for {} written to {}",
                report_path.display(),
                payload_path.display()
            );

            if cli.text {
                write!(out, "{}", payload.render_text())?;
            } else {
                writeln!(out, "{}", payload.to_json()?)?;
            }
        }
    }
    Ok(())
}
