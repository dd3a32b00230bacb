use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use cleanse_model::Result;

use crate::csv_table::CsvTable;

/// Build a frame of nullable string columns; empty cells become null.
pub fn build_frame(table: &CsvTable) -> Result<DataFrame> {
    let columns: Vec<Column> = table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let values: Vec<Option<&str>> = table
                .column(idx)
                .map(|value| if value.is_empty() { None } else { Some(value) })
                .collect();
            Series::new(header.as_str().into(), values).into_column()
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_become_null() {
        let table = CsvTable {
            headers: vec!["a".to_string(), "b".to_string()],
            rows: vec![
                vec!["1".to_string(), String::new()],
                vec![String::new(), "y".to_string()],
            ],
        };
        let df = build_frame(&table).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        let b = df.column("b").unwrap().str().unwrap();
        assert_eq!(b.get(0), None);
        assert_eq!(b.get(1), Some("y"));
    }

    #[test]
    fn header_only_table_builds_empty_frame() {
        let table = CsvTable {
            headers: vec!["a".to_string()],
            rows: Vec::new(),
        };
        let df = build_frame(&table).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 1);
    }
}
