//! CSV Data Loader Module
//! Reads the hospital and state CSV files with Polars, replaces CMS
//! missing-value markers with nulls and coerces numeric columns.

use super::cache::TableCache;
use super::schema::{
    is_missing_sentinel, COMPARED_TO_NATIONAL, HOSPITAL_NUMERIC_COLUMNS,
    HOSPITAL_REQUIRED_COLUMNS, STATE, STATE_REQUIRED_COLUMNS,
};
use crate::taxonomy::BenchmarkCounter;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Data source not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: TableKind,
        column: &'static str,
    },
}

/// Which of the two source tables a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Hospital,
    State,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Hospital => f.write_str("hospital"),
            TableKind::State => f.write_str("state"),
        }
    }
}

/// Parse a numeric cell, treating anything unparseable as absent.
pub fn parse_number(raw: &str) -> Option<f64> {
    if is_missing_sentinel(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a hospital counter. Only non-negative whole numbers are accepted.
pub fn parse_count(raw: &str) -> Option<i64> {
    parse_number(raw)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as i64)
}

/// Loads the two CMS tables. Cached loads go through the process-wide
/// [`TableCache`]; the `read_*` functions always hit the file.
pub struct DataLoader;

impl DataLoader {
    /// Load (or fetch from cache) the hospital-level table.
    pub fn load_hospital_table(path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        TableCache::global().get_or_load(TableKind::Hospital, path.as_ref(), Self::read_hospital_csv)
    }

    /// Load (or fetch from cache) the state-level table.
    pub fn load_state_table(path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        TableCache::global().get_or_load(TableKind::State, path.as_ref(), Self::read_state_csv)
    }

    /// Read and clean a hospital-level CSV without touching the cache.
    pub fn read_hospital_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let raw = Self::read_raw(path)?;
        Self::require_columns(&raw, TableKind::Hospital, &HOSPITAL_REQUIRED_COLUMNS)?;

        let height = raw.height();
        let mut columns = Vec::with_capacity(raw.width() + HOSPITAL_NUMERIC_COLUMNS.len());
        for column in raw.get_columns() {
            let name = column.name().as_str();
            if HOSPITAL_NUMERIC_COLUMNS.contains(&name) {
                columns.push(Self::coerce_float(column)?);
            } else {
                columns.push(Self::clean_text(column)?);
            }
        }

        for name in HOSPITAL_NUMERIC_COLUMNS {
            if raw.column(name).is_err() {
                warn!(column = name, "hospital table has no such column, filling with nulls");
                columns.push(Column::full_null(name.into(), height, &DataType::Float64));
            }
        }
        if raw.column(COMPARED_TO_NATIONAL).is_err() {
            warn!(column = COMPARED_TO_NATIONAL, "hospital table has no such column, filling with nulls");
            columns.push(Column::full_null(
                COMPARED_TO_NATIONAL.into(),
                height,
                &DataType::String,
            ));
        }

        let df = DataFrame::new(columns)?;
        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded hospital table"
        );
        Ok(df)
    }

    /// Read and clean a state-level CSV without touching the cache.
    pub fn read_state_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let raw = Self::read_raw(path)?;
        Self::require_columns(&raw, TableKind::State, &STATE_REQUIRED_COLUMNS)?;

        let height = raw.height();
        let counter_columns: Vec<&str> = BenchmarkCounter::ALL.iter().map(|c| c.column()).collect();

        let mut columns = Vec::with_capacity(raw.width() + counter_columns.len());
        for column in raw.get_columns() {
            if counter_columns.contains(&column.name().as_str()) {
                columns.push(Self::coerce_count(column)?);
            } else {
                columns.push(Self::clean_text(column)?);
            }
        }

        for name in &counter_columns {
            if raw.column(name).is_err() {
                warn!(column = *name, "state table has no such column, filling with nulls");
                columns.push(Column::full_null((*name).into(), height, &DataType::Int64));
            }
        }

        let df = DataFrame::new(columns)?;
        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded state table"
        );
        Ok(df)
    }

    /// Sorted distinct state codes present in a table.
    pub fn observed_states(df: &DataFrame) -> Vec<String> {
        df.column(STATE)
            .ok()
            .and_then(|col| col.str().ok())
            .map(|ca| {
                ca.into_iter()
                    .flatten()
                    .map(str::to_string)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Read every column as text so sentinel handling sees the raw cells.
    fn read_raw(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;
        Ok(df)
    }

    fn require_columns(
        df: &DataFrame,
        table: TableKind,
        required: &[&'static str],
    ) -> Result<(), LoaderError> {
        for column in required {
            if df.column(column).is_err() {
                return Err(LoaderError::MissingColumn {
                    table,
                    column: *column,
                });
            }
        }
        Ok(())
    }

    fn clean_text(column: &Column) -> Result<Column, LoaderError> {
        let ca = column.str()?;
        let values: Vec<Option<&str>> = ca
            .into_iter()
            .map(|v| v.filter(|s| !is_missing_sentinel(s)))
            .collect();
        Ok(Column::new(column.name().clone(), values))
    }

    fn coerce_float(column: &Column) -> Result<Column, LoaderError> {
        let ca = column.str()?;
        let values: Vec<Option<f64>> = ca.into_iter().map(|v| v.and_then(parse_number)).collect();
        Ok(Column::new(column.name().clone(), values))
    }

    fn coerce_count(column: &Column) -> Result<Column, LoaderError> {
        let ca = column.str()?;
        let values: Vec<Option<i64>> = ca.into_iter().map(|v| v.and_then(parse_count)).collect();
        Ok(Column::new(column.name().clone(), values))
    }
}
