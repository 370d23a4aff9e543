//! Conversion from polars data frames

use crate::data::RawTable;
use crate::error::Result;
use polars::prelude::*;

/// Render every column of `df` as text so the ingestor can parse it uniformly
pub fn table_from_frame(df: &DataFrame) -> Result<RawTable> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = vec![Vec::with_capacity(headers.len()); df.height()];
    for column in df.get_columns() {
        let as_text = column.cast(&DataType::Utf8)?;
        let cells = as_text.utf8()?;
        for (row, cell) in rows.iter_mut().zip(cells.into_iter()) {
            row.push(cell.unwrap_or_default().to_string());
        }
    }

    RawTable::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_table() {
        let df = df! {
            "Date" => &["2023-01-02", "2023-01-03"],
            "Close" => &[101.5, 102.0],
        }
        .unwrap();

        let table = table_from_frame(&df).unwrap();
        assert_eq!(table.headers(), &["Date".to_string(), "Close".to_string()]);
        assert_eq!(table.rows()[1][0], "2023-01-03");
        assert_eq!(table.rows()[1][1].parse::<f64>().unwrap(), 102.0);
    }
}
