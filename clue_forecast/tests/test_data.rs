use chrono::{Duration, NaiveDate, TimeZone, Utc};
use clue_forecast::config::{DateRange, IngestConfig};
use clue_forecast::data::{DataSource, Frequency, Ingestor, RawTable, SymbolProvider, TimeSeries};
use clue_forecast::error::{ForecastError, Result};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn daily_rows(n: usize) -> Vec<(String, String)> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            (date.format("%Y-%m-%d").to_string(), format!("{:.1}", 100.0 + i as f64))
        })
        .collect()
}

fn table(rows: &[(String, String)]) -> RawTable {
    RawTable::new(
        vec!["Date".to_string(), "Close".to_string()],
        rows.iter()
            .map(|(d, v)| vec![d.clone(), v.clone()])
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_ingest_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    for (date, close) in daily_rows(40) {
        writeln!(file, "{},1.0,2.0,0.5,{},1000", date, close).unwrap();
    }

    let series = Ingestor::default()
        .ingest(&DataSource::csv(file.path()))
        .unwrap();

    assert_eq!(series.len(), 40);
    assert_eq!(series.values()[0], 100.0);
    assert_eq!(
        series.first_timestamp(),
        Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_ingest_sorts_and_keeps_last_duplicate() {
    let mut rows = daily_rows(35);
    rows.reverse();
    rows.push(("2023-01-05".to_string(), "999.0".to_string()));

    let (series, report) = Ingestor::default()
        .ingest_table(&table(&rows))
        .unwrap();

    assert_eq!(series.len(), 35);
    assert_eq!(report.duplicates_replaced, 1);
    assert_eq!(series.values()[4], 999.0);
    assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_ingest_drops_invalid_values() {
    let mut rows = daily_rows(34);
    rows[3].1 = String::new();
    rows[7].1 = "NaN".to_string();
    rows[9].1 = "n/a".to_string();
    rows[11].1 = "inf".to_string();

    let (series, report) = Ingestor::default()
        .ingest_table(&table(&rows))
        .unwrap();

    assert_eq!(report.rows_read, 34);
    assert_eq!(report.dropped_invalid_values, 4);
    assert_eq!(series.len(), 30);
    assert!(series.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_ingest_too_few_observations() {
    let err = Ingestor::default()
        .ingest_table(&table(&daily_rows(10)))
        .unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_ingest_missing_column() {
    let config = IngestConfig {
        value_column: "Adj Close".to_string(),
        ..IngestConfig::default()
    };
    let err = Ingestor::new(config)
        .ingest_table(&table(&daily_rows(40)))
        .unwrap_err();

    match err {
        ForecastError::DataError(msg) => assert!(msg.contains("Adj Close")),
        other => panic!("Expected DataError, got {:?}", other),
    }
}

#[test]
fn test_ingest_value_column_is_case_insensitive() {
    let config = IngestConfig {
        value_column: "close".to_string(),
        ..IngestConfig::default()
    };
    let series = Ingestor::new(config)
        .ingest(&DataSource::Table(table(&daily_rows(30))))
        .unwrap();
    assert_eq!(series.len(), 30);
}

#[test]
fn test_ingest_unparseable_timestamp() {
    let mut rows = daily_rows(40);
    rows[5].0 = "not a date".to_string();

    let err = Ingestor::default()
        .ingest_table(&table(&rows))
        .unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_ingest_empty_source() {
    let empty = RawTable::new(vec!["Date".to_string(), "Close".to_string()], vec![]).unwrap();
    let err = Ingestor::default().ingest_table(&empty).unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_ingest_date_range() {
    let config = IngestConfig {
        min_observations: 5,
        date_range: Some(DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 11),
            NaiveDate::from_ymd_opt(2023, 1, 20),
        )),
        ..IngestConfig::default()
    };

    let (series, report) = Ingestor::new(config)
        .ingest_table(&table(&daily_rows(40)))
        .unwrap();

    assert_eq!(series.len(), 10);
    assert_eq!(report.outside_range, 30);
    assert_eq!(series.values()[0], 110.0);
}

#[test]
fn test_ingest_detects_unnamed_time_column() {
    let rows = daily_rows(30);
    let raw = RawTable::new(
        vec!["".to_string(), "Close".to_string()],
        rows.iter().map(|(d, v)| vec![d.clone(), v.clone()]).collect(),
    )
    .unwrap();

    assert_eq!(Ingestor::default().ingest_table(&raw).unwrap().0.len(), 30);
}

#[test]
fn test_ingest_missing_file() {
    let err = Ingestor::default()
        .ingest(&DataSource::csv("/definitely/not/here.csv"))
        .unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

struct FixedProvider;

impl SymbolProvider for FixedProvider {
    fn fetch(&self, symbol: &str, _range: Option<&DateRange>) -> Result<RawTable> {
        if symbol == "ACME" {
            Ok(table(&daily_rows(45)))
        } else {
            Err(ForecastError::DataError(format!("Unknown symbol {}", symbol)))
        }
    }
}

#[test]
fn test_ingest_symbol() {
    let without_provider = Ingestor::default().ingest(&DataSource::symbol("ACME"));
    assert!(matches!(without_provider, Err(ForecastError::DataError(_))));

    let ingestor = Ingestor::default().with_provider(Box::new(FixedProvider));
    assert_eq!(ingestor.ingest(&DataSource::symbol("ACME")).unwrap().len(), 45);
    assert!(ingestor.ingest(&DataSource::symbol("NOPE")).is_err());
}

#[test]
fn test_time_series_invariants() {
    let t0 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let t1 = t0 + Duration::days(1);

    assert!(TimeSeries::new(vec![t0, t1], vec![1.0, 2.0]).is_ok());
    assert!(matches!(
        TimeSeries::new(vec![t1, t0], vec![1.0, 2.0]),
        Err(ForecastError::DataError(_))
    ));
    assert!(matches!(
        TimeSeries::new(vec![t0, t0], vec![1.0, 2.0]),
        Err(ForecastError::DataError(_))
    ));
    assert!(matches!(
        TimeSeries::new(vec![t0, t1], vec![1.0, f64::NAN]),
        Err(ForecastError::DataError(_))
    ));
    assert!(TimeSeries::new(vec![t0], vec![1.0, 2.0]).is_err());
}

#[test]
fn test_time_series_split() {
    let t0 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let series = TimeSeries::from_values(
        t0,
        clue_forecast::Frequency::daily(),
        (0..10).map(|i| i as f64).collect(),
    )
    .unwrap();

    let (train, test) = series.split_at(7).unwrap();
    assert_eq!(train.len(), 7);
    assert_eq!(test.values(), &[7.0, 8.0, 9.0]);
    assert_eq!(test.frequency(), Some(clue_forecast::Frequency::daily()));
    assert!(series.split_at(11).is_err());
}

#[test]
fn test_deserialize_validates_series() {
    let unsorted = r#"{
        "timestamps": ["2023-01-03T00:00:00Z", "2023-01-02T00:00:00Z", "2023-01-02T00:00:00Z"],
        "values": [1.0, 2.0, 3.0],
        "frequency": null
    }"#;
    assert!(serde_json::from_str::<TimeSeries>(unsorted).is_err());

    let mismatched = r#"{
        "timestamps": ["2023-01-01T00:00:00Z", "2023-01-02T00:00:00Z", "2023-01-03T00:00:00Z"],
        "values": [1.0, 2.0]
    }"#;
    assert!(serde_json::from_str::<TimeSeries>(mismatched).is_err());

    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let series = TimeSeries::from_values(start, Frequency::daily(), vec![1.0, 2.5, 4.0]).unwrap();
    let json = serde_json::to_string(&series).unwrap();
    assert_eq!(serde_json::from_str::<TimeSeries>(&json).unwrap(), series);
}
