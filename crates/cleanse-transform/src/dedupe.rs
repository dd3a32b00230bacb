use std::collections::HashMap;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};

use cleanse_common::{require_column, string_values};
use cleanse_model::Result;

/// Drop earlier rows whose `key` repeats a later row, keeping the last
/// occurrence. Null keys are never duplicates of each other.
///
/// Returns the filtered frame and the number of rows removed.
pub fn dedupe_keep_last(df: &DataFrame, key: &str) -> Result<(DataFrame, usize)> {
    if df.height() == 0 {
        return Ok((df.clone(), 0));
    }
    let keys = string_values(df, key)?;
    let mut last_seen: HashMap<&str, usize> = HashMap::new();
    for (idx, value) in keys.iter().enumerate() {
        if let Some(value) = value.as_deref() {
            last_seen.insert(value, idx);
        }
    }
    let keep: Vec<bool> = keys
        .iter()
        .enumerate()
        .map(|(idx, value)| match value.as_deref() {
            Some(value) => last_seen.get(value) == Some(&idx),
            None => true,
        })
        .collect();
    filter_rows(df, &keep)
}

/// Drop rows that are null in any of `columns`.
pub fn drop_null_rows(df: &DataFrame, columns: &[&str]) -> Result<(DataFrame, usize)> {
    let mut keep = vec![true; df.height()];
    for name in columns {
        let column = require_column(df, name)?;
        let nulls = column.is_null();
        for (slot, is_null) in keep.iter_mut().zip(nulls.into_iter()) {
            if is_null.unwrap_or(false) {
                *slot = false;
            }
        }
    }
    filter_rows(df, &keep)
}

fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<(DataFrame, usize)> {
    let removed = keep.iter().filter(|k| !**k).count();
    if removed == 0 {
        return Ok((df.clone(), 0));
    }
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok((df.filter(&mask)?, removed))
}
