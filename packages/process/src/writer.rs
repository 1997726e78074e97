//! Output artifacts: the flattened CSV and the two JSON summaries.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use yelp_digest_business_models::{CategoryCount, Column, NormalizedBusiness, RegionSummary};

use crate::ProcessError;

/// File name of the flattened business export.
pub const BUSINESSES_CSV: &str = "businesses.csv";

/// File name of the per-state summary.
pub const STATES_SUMMARY_JSON: &str = "states_summary.json";

/// File name of the category ranking.
pub const TOP_CATEGORIES_JSON: &str = "top_categories.json";

/// Streams [`NormalizedBusiness`] rows into a CSV file.
///
/// The header row is written on creation, so an input without records still
/// produces a file with the full header.
pub struct BusinessCsvWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: u64,
}

impl BusinessCsvWriter {
    /// Creates (or truncates) `path` and writes the header row.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Csv`] if the file cannot be created or the
    /// header cannot be written.
    pub fn create(path: &Path) -> Result<Self, ProcessError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| ProcessError::csv(path, e))?;

        writer
            .write_record(Column::header())
            .map_err(|e| ProcessError::csv(path, e))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Csv`] if the row cannot be written.
    pub fn write(&mut self, business: &NormalizedBusiness) -> Result<(), ProcessError> {
        self.writer
            .serialize(business)
            .map_err(|e| ProcessError::csv(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of data rows written.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Io`] if the flush fails.
    pub fn finish(mut self) -> Result<u64, ProcessError> {
        self.writer
            .flush()
            .map_err(|e| ProcessError::io(&self.path, e))?;
        log::debug!("Wrote {} rows to {}", self.rows, self.path.display());
        Ok(self.rows)
    }
}

/// Writes `value` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ProcessError`] if the file cannot be created, serialized into,
/// or flushed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ProcessError> {
    let file = File::create(path).map_err(|e| ProcessError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value).map_err(|e| ProcessError::json(path, e))?;
    out.flush().map_err(|e| ProcessError::io(path, e))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Writes the per-state summary object.
///
/// # Errors
///
/// See [`write_json`].
pub fn write_states_summary(
    path: &Path,
    regions: &IndexMap<String, RegionSummary>,
) -> Result<(), ProcessError> {
    write_json(path, regions)
}

/// Writes the ranked category list.
///
/// # Errors
///
/// See [`write_json`].
pub fn write_top_categories(path: &Path, ranking: &[CategoryCount]) -> Result<(), ProcessError> {
    write_json(path, ranking)
}
