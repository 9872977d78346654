//! Full-row duplicate detection.

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::table::Table;
use crate::types::{DuplicateResult, RecordRow};

/// Maximum number of duplicated rows returned as examples.
pub const MAX_DUPLICATE_EXAMPLES: usize = 10;

/// Detects rows that are identical across every column.
pub struct DuplicateDetector;

impl DuplicateDetector {
    /// Mark every row that has at least one identical twin.
    ///
    /// All copies of a duplicated row are marked, not just the repeats, and
    /// missing values compare equal to each other.
    pub fn duplicate_mask(table: &Table) -> Result<Vec<bool>> {
        let height = table.height();
        if height == 0 || table.width() == 0 {
            return Ok(vec![false; height]);
        }

        let columns = table
            .column_names()
            .map(|name| table.nulled_column(name).map(Column::from))
            .collect::<Result<Vec<_>>>()?;

        let duplicated = DataFrame::new(columns)?.is_duplicated()?;
        Ok(duplicated.into_iter().map(|d| d.unwrap_or(false)).collect())
    }

    /// Count duplicated rows and collect up to [`MAX_DUPLICATE_EXAMPLES`] of
    /// them in original row order.
    pub fn detect_duplicates(table: &Table) -> Result<DuplicateResult> {
        let mask = Self::duplicate_mask(table)?;
        let count = mask.iter().filter(|d| **d).count();

        let mut examples = Vec::new();
        for row in mask
            .iter()
            .enumerate()
            .filter_map(|(row, duplicated)| duplicated.then_some(row))
            .take(MAX_DUPLICATE_EXAMPLES)
        {
            examples.push(Self::row_record(table, row)?);
        }

        debug!("Found {} duplicated rows", count);
        Ok(DuplicateResult { count, examples })
    }

    fn row_record(table: &Table, row: usize) -> Result<RecordRow> {
        let mut record = RecordRow::new();
        for name in table.column_names() {
            record.insert(name.to_string(), table.value_json(name, row)?);
        }
        Ok(record)
    }
}
