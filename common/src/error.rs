use std::num::ParseFloatError;

use thiserror::Error;

use crate::table::COLUMN_COUNT;

/// Failures while reading a results file into a [`crate::table::MeasurementTable`]
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    MissingField {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: field {field} is not a number: {value:?}")]
    InvalidNumber {
        line: u64,
        field: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Mismatches between a table and what a chart expects of it
#[derive(Error, Debug, PartialEq)]
pub enum ChartError {
    #[error("Column {column} has {found} values, expected {expected} (one per trace)")]
    ColumnLength {
        column: usize,
        expected: usize,
        found: usize,
    },
    #[error("The {palette} palette has {available} entries, {} are required", COLUMN_COUNT)]
    PaletteExhausted {
        palette: &'static str,
        available: usize,
    },
    #[error("Invalid {axis} range [{min}, {max}]")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}
