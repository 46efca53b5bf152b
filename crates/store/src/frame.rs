//! Parquet and column extraction helpers.

use std::fs::{self, File};
use std::path::Path;

use cne5_primitives::TradeDate;
use polars::prelude::*;

use crate::StoreError;

/// Days between the common era and the Unix epoch; polars dates are
/// days since 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn date_from_days(days: i32) -> TradeDate {
    TradeDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE).unwrap_or_default()
}

pub(crate) fn read_parquet(path: &Path) -> Result<DataFrame, StoreError> {
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

/// Publish a DataFrame with write-temp-then-rename semantics.
pub(crate) fn write_parquet_atomic(path: &Path, df: &mut DataFrame) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("parquet.tmp");
    let file = File::create(&tmp)?;
    ParquetWriter::new(file).finish(df)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Publish a JSON document with write-temp-then-rename semantics.
pub(crate) fn write_json_atomic<T: serde::Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let file = File::create(&tmp)?;
    serde_json::to_writer_pretty(file, value)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Extract a float column; nulls become `NaN`.
pub(crate) fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, StoreError> {
    let column = df.column(name).map_err(|_| StoreError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Extract a float column, or an all-missing column when absent.
pub(crate) fn f64_column_or_missing(df: &DataFrame, name: &str) -> Vec<f64> {
    f64_column(df, name).unwrap_or_else(|_| vec![f64::NAN; df.height()])
}

/// Extract a string column; nulls become empty strings.
pub(crate) fn str_column(df: &DataFrame, name: &str) -> Result<Vec<String>, StoreError> {
    let column = df.column(name).map_err(|_| StoreError::MissingColumn(name.to_string()))?;
    let values = column.str()?;
    Ok(values.into_iter().map(|v| v.unwrap_or("").to_string()).collect())
}

/// Extract a date column via its physical days-since-epoch encoding.
/// Null (malformed) entries are `None` and skipped by callers.
pub(crate) fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<TradeDate>>, StoreError> {
    let column = df.column(name).map_err(|_| StoreError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::Int32)?;
    let values = casted.i32()?;
    Ok(values.into_iter().map(|v| v.map(date_from_days)).collect())
}

/// Extract an integer column; nulls become zero.
pub(crate) fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<i64>, StoreError> {
    let column = df.column(name).map_err(|_| StoreError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::Int64)?;
    let values = casted.i64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(0)).collect())
}
