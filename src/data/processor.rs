//! Data Processor Module
//! Filters loaded tables by the user's selection and reshapes wide counter
//! columns into long format (melt).

use super::schema::{MEASURE_NAME, STATE};
use crate::taxonomy::MeasureGroup;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Stack operation requires at least one value column")]
    MissingValueColumns,
}

/// What the user picked in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub group: MeasureGroup,
    /// Measure names to keep. Expected to belong to `group`, not checked.
    pub measures: Vec<String>,
    /// State codes to keep. Empty means every state.
    pub states: Vec<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::for_group(MeasureGroup::default())
    }
}

impl Selection {
    pub fn new(group: MeasureGroup, measures: Vec<String>, states: Vec<String>) -> Self {
        Self {
            group,
            measures,
            states,
        }
    }

    /// Startup selection for a group: its first measure, all states.
    pub fn for_group(group: MeasureGroup) -> Self {
        Self {
            group,
            measures: group
                .measures()
                .first()
                .map(|m| vec![m.to_string()])
                .unwrap_or_default(),
            states: Vec::new(),
        }
    }

    /// Switch group, resetting measures to the group default but keeping states.
    pub fn change_group(&mut self, group: MeasureGroup) {
        if self.group != group {
            let states = std::mem::take(&mut self.states);
            *self = Self::for_group(group);
            self.states = states;
        }
    }
}

/// Handles filtering and reshaping operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep rows whose measure is selected and, when states are selected,
    /// whose state is one of them. Works on both hospital and state tables.
    pub fn filter(df: &DataFrame, selection: &Selection) -> Result<DataFrame, ProcessorError> {
        let measures: HashSet<&str> = selection.measures.iter().map(String::as_str).collect();
        let states: HashSet<&str> = selection.states.iter().map(String::as_str).collect();

        let measure_ca = df.column(MEASURE_NAME)?.str()?;
        let state_ca = df.column(STATE)?.str()?;

        let mask: BooleanChunked = measure_ca
            .into_iter()
            .zip(state_ca.into_iter())
            .map(|(measure, state)| {
                let keep_measure = measure.is_some_and(|m| measures.contains(m));
                let keep_state = states.is_empty() || state.is_some_and(|s| states.contains(s));
                keep_measure && keep_state
            })
            .collect();

        let filtered = df.filter(&mask)?;
        debug!(
            group = %selection.group,
            measures = measures.len(),
            states = states.len(),
            rows_in = df.height(),
            rows_out = filtered.height(),
            "filtered table"
        );
        Ok(filtered)
    }

    /// Drop rows where every one of `columns` is null.
    pub fn drop_rows_all_null(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, ProcessorError> {
        let mut keep = BooleanChunked::full(PlSmallStr::EMPTY, false, df.height());
        for name in columns {
            let present = df.column(name)?.as_materialized_series().is_not_null();
            keep = &keep | &present;
        }
        Ok(df.filter(&keep)?)
    }

    /// Transform wide counter columns to long format (melt).
    ///
    /// Output columns: `id_cols..., var_name, value_name`. Rows are emitted
    /// value column by value column, preserving row order within each.
    /// Null values are kept.
    pub fn stack_to_long(
        df: &DataFrame,
        id_cols: &[&str],
        value_cols: &[&str],
        var_name: &str,
        value_name: &str,
    ) -> Result<DataFrame, ProcessorError> {
        if value_cols.is_empty() {
            return Err(ProcessorError::MissingValueColumns);
        }

        let height = df.height();
        let id_cas = id_cols
            .iter()
            .map(|name| Ok(df.column(name)?.str()?))
            .collect::<Result<Vec<_>, PolarsError>>()?;

        let mut ids: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(height * value_cols.len()); id_cols.len()];
        let mut variables: Vec<String> = Vec::with_capacity(height * value_cols.len());
        let mut values: Vec<Option<i64>> = Vec::with_capacity(height * value_cols.len());

        for value_col in value_cols {
            let value_i64 = df.column(value_col)?.cast(&DataType::Int64)?;
            let value_ca = value_i64.i64()?;

            for i in 0..height {
                for (out, ca) in ids.iter_mut().zip(&id_cas) {
                    out.push(ca.get(i).map(str::to_string));
                }
                variables.push(value_col.to_string());
                values.push(value_ca.get(i));
            }
        }

        let mut columns: Vec<Column> = id_cols
            .iter()
            .zip(ids)
            .map(|(name, vals)| Column::new((*name).into(), vals))
            .collect();
        columns.push(Column::new(var_name.into(), variables));
        columns.push(Column::new(value_name.into(), values));

        Ok(DataFrame::new(columns)?)
    }
}
