use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ChartError, TableError};

/// Number of numeric series per row
pub const COLUMN_COUNT: usize = 3;
/// Index of the first numeric field, fields before it are the trace name and an unused field
pub const FIRST_VALUE_FIELD: usize = 2;

/// Throughput values parsed from a results file.
///
/// `columns[j][i]` is the value of series `j` for trace `i`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MeasurementTable {
    labels: Vec<String>,
    traces: Vec<String>,
    columns: [Vec<f64>; COLUMN_COUNT],
}

impl MeasurementTable {
    pub fn new(
        labels: Vec<String>,
        traces: Vec<String>,
        columns: [Vec<f64>; COLUMN_COUNT],
    ) -> Result<Self, ChartError> {
        let table = Self {
            labels,
            traces,
            columns,
        };
        table.validate()?;
        Ok(table)
    }

    /// Reads the results file at `path`. The file is closed once the read pass ends.
    pub fn from_path(path: &Path, separator: char) -> Result<Self, TableError> {
        let file = File::open(path)?;
        Self::from_reader(file, separator)
    }

    /// Parses a header line followed by data rows.
    ///
    /// The first line is the header, and its fields from [`FIRST_VALUE_FIELD`] onwards are
    /// the column labels. Each data row contributes its first field as a trace name and
    /// the [`COLUMN_COUNT`] fields starting at [`FIRST_VALUE_FIELD`] as values. Blank lines
    /// after the header are skipped but still counted in error line numbers.
    pub fn from_reader<R: Read>(reader: R, separator: char) -> Result<Self, TableError> {
        let mut lines = BufReader::new(reader).lines();
        let mut table = Self::default();
        if let Some(header) = lines.next() {
            table.labels = header?
                .split(separator)
                .skip(FIRST_VALUE_FIELD)
                .map(str::to_owned)
                .collect();
        }

        let expected = FIRST_VALUE_FIELD + COLUMN_COUNT;
        for (index, text) in lines.enumerate() {
            let text = text?;
            let line = index as u64 + 2;
            if text.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = text.split(separator).collect();
            if fields.len() < expected {
                return Err(TableError::MissingField {
                    line,
                    expected,
                    found: fields.len(),
                });
            }
            if fields.len() > expected {
                warn!(
                    "Line {line}: ignoring {} fields after the last value",
                    fields.len() - expected
                );
            }

            for (j, column) in table.columns.iter_mut().enumerate() {
                let field = FIRST_VALUE_FIELD + j;
                let value = fields[field];
                let parsed =
                    value
                        .trim()
                        .parse::<f64>()
                        .map_err(|source| TableError::InvalidNumber {
                            line,
                            field,
                            value: value.to_owned(),
                            source,
                        })?;
                column.push(parsed);
            }
            table.traces.push(fields[0].to_owned());
        }

        debug!("labels={:?} traces={:?}", table.labels, table.traces);
        Ok(table)
    }

    /// Checks that every column holds one value per trace
    pub fn validate(&self) -> Result<(), ChartError> {
        for (column, values) in self.columns.iter().enumerate() {
            if values.len() != self.traces.len() {
                return Err(ChartError::ColumnLength {
                    column,
                    expected: self.traces.len(),
                    found: values.len(),
                });
            }
        }
        Ok(())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn traces(&self) -> &[String] {
        &self.traces
    }

    pub fn columns(&self) -> &[Vec<f64>; COLUMN_COUNT] {
        &self.columns
    }

    pub fn column(&self, j: usize) -> Option<&[f64]> {
        self.columns.get(j).map(Vec::as_slice)
    }

    /// Number of traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Iterates over `(trace, values)` in file order
    pub fn rows(&self) -> impl Iterator<Item = (&str, [f64; COLUMN_COUNT])> + '_ {
        self.traces.iter().enumerate().map(|(i, trace)| {
            (
                trace.as_str(),
                std::array::from_fn(|j| self.columns[j].get(i).copied().unwrap_or(f64::NAN)),
            )
        })
    }
}
