#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Single-pass processing of the Yelp academic business dump.
//!
//! The input is a JSON-lines file of business objects. One forward pass
//! reads each line ([`reader`]), projects it onto the fixed export schema
//! ([`normalize`]), appends it to `businesses.csv` ([`writer`]) and feeds the
//! per-state and per-category accumulators ([`aggregate`]). Once the pass is
//! done the two summaries are written as JSON.
//!
//! [`run`] wraps this with input discovery ([`paths`]), reuse of an existing
//! export, and the per-state diagnostic in [`query`].

pub mod aggregate;
pub mod normalize;
pub mod paths;
pub mod progress;
pub mod query;
pub mod reader;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use yelp_digest_business_models::{ProcessResult, StateReport, TOP_CATEGORIES_LIMIT};

use crate::aggregate::Aggregator;
use crate::progress::ProgressCallback;
use crate::writer::BusinessCsvWriter;

/// Errors that abort a processing run.
///
/// Malformed input lines are not errors; the reader skips them.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// I/O error reading or writing a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV read/write error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// JSON serialization error.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// Path to the JSON file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The business dump could not be found in any expected location.
    #[error("Could not find {file} in expected locations: {searched:?}")]
    InputNotFound {
        /// File name that was looked for.
        file: &'static str,
        /// Every path that was searched, in order.
        searched: Vec<PathBuf>,
    },

    /// A CSV being read back lacks a required column.
    #[error("CSV {path} has no `{column}` column")]
    MissingColumn {
        /// Path to the CSV file.
        path: String,
        /// Name of the missing column.
        column: &'static str,
    },
}

impl ProcessError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Inputs for one processing pass over an already located file.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// JSON-lines business dump to read.
    pub input: PathBuf,
    /// Directory receiving the three output artifacts.
    pub output_dir: PathBuf,
    /// Length cap for the category ranking.
    pub top_categories: usize,
}

/// Reads `options.input` once and writes the CSV export plus both
/// summaries into `options.output_dir`.
///
/// # Errors
///
/// Returns [`ProcessError`] if the input cannot be opened or read, or if any
/// output cannot be written. Files already written are left in place.
pub fn process_business_file(
    options: &ProcessOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ProcessResult, ProcessError> {
    let start = Instant::now();

    paths::ensure_dir(&options.output_dir)
        .map_err(|e| ProcessError::io(&options.output_dir, e))?;

    let businesses_csv = options.output_dir.join(writer::BUSINESSES_CSV);
    let states_summary = options.output_dir.join(writer::STATES_SUMMARY_JSON);
    let top_categories = options.output_dir.join(writer::TOP_CATEGORIES_JSON);

    log::info!("Processing {}", options.input.display());
    let mut records = reader::open(&options.input)?;
    let mut csv = BusinessCsvWriter::create(&businesses_csv)?;
    let mut aggregator = Aggregator::default();

    // Progress is measured in bytes of input.
    match std::fs::metadata(&options.input) {
        Ok(meta) => progress.set_total(meta.len()),
        Err(e) => log::debug!("No size for {}: {e}", options.input.display()),
    }
    progress.set_message("Reading businesses".to_string());

    while let Some(record) = records.next() {
        let record = record.map_err(|e| ProcessError::io(&options.input, e))?;
        let business = normalize::normalize_business(&record);
        csv.write(&business)?;
        aggregator.record(&business);
        progress.set_position(records.bytes_read());
    }

    let rows_written = csv.finish()?;
    log::info!(
        "Wrote {rows_written} rows from {} lines ({} states, {} categories)",
        records.line_number(),
        aggregator.regions().len(),
        aggregator.categories().len()
    );

    progress.set_message("Writing summaries".to_string());
    let summaries = aggregator.finalize(options.top_categories);
    writer::write_states_summary(&states_summary, &summaries.regions)?;
    writer::write_top_categories(&top_categories, &summaries.top_categories)?;

    progress.finish(format!("processed {rows_written} businesses"));

    Ok(ProcessResult {
        businesses_csv,
        states_summary,
        top_categories,
        rows_written,
        duration: start.elapsed(),
    })
}

/// Locates the business dump under `data_dir` (or its parent) and processes
/// it into `output_dir`.
///
/// # Errors
///
/// Returns [`ProcessError::InputNotFound`] before touching `output_dir` if
/// the dump cannot be located, or any error from
/// [`process_business_file`].
pub fn process_raw(
    data_dir: &Path,
    output_dir: &Path,
    top_categories: usize,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ProcessResult, ProcessError> {
    let input = paths::locate_business_json(data_dir)?;
    process_business_file(
        &ProcessOptions {
            input,
            output_dir: output_dir.to_path_buf(),
            top_categories,
        },
        progress,
    )
}

/// Options for a full [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory searched for the business dump.
    pub data_dir: PathBuf,
    /// Directory holding the processed outputs.
    pub output_dir: PathBuf,
    /// Reprocess the raw dump even if `businesses.csv` already exists.
    pub force: bool,
    /// State code reported on after processing.
    pub state: String,
    /// Length cap for the category ranking.
    pub top_categories: usize,
    /// Also write `<state>_restaurants.json` for the map front end.
    pub map_points: bool,
}

impl RunOptions {
    /// Default options rooted at `data_dir`, writing to `<data_dir>/processed`.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            output_dir: paths::processed_dir(&data_dir),
            data_dir,
            force: false,
            state: "CA".to_string(),
            top_categories: TOP_CATEGORIES_LIMIT,
            map_points: false,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(paths::data_dir())
    }
}

/// What a [`run`] did.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Set when the raw dump was (re)processed; `None` when an existing
    /// export was reused.
    pub processed: Option<ProcessResult>,
    /// Diagnostic report for [`RunOptions::state`].
    pub report: StateReport,
    /// Path of the map points file, when requested.
    pub map_points: Option<PathBuf>,
}

/// Processes the raw dump if needed, then reports on one state.
///
/// # Errors
///
/// Returns [`ProcessError`] if processing fails or the export cannot be
/// read back.
pub fn run(
    options: &RunOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunOutcome, ProcessError> {
    let csv_path = options.output_dir.join(writer::BUSINESSES_CSV);

    let processed = if options.force || !csv_path.is_file() {
        Some(process_raw(
            &options.data_dir,
            &options.output_dir,
            options.top_categories,
            progress,
        )?)
    } else {
        log::info!("Reusing existing export {}", csv_path.display());
        progress.finish_and_clear();
        None
    };

    let report = query::businesses_in_state(&csv_path, &options.state)?;

    let map_points = if options.map_points {
        let path = query::map_points_path(&options.output_dir, &options.state);
        query::write_map_points(&report, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(RunOutcome {
        processed,
        report,
        map_points,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use indexmap::IndexMap;
    use yelp_digest_business_models::{CategoryCount, RegionSummary};

    use super::*;
    use crate::progress::null_progress;

    const THREE_BUSINESSES: &str = r#"{"business_id":"a","name":"Sushi One","city":"Santa Barbara","state":"CA","stars":4.0,"review_count":10,"latitude":34.4,"longitude":-119.7,"is_open":1,"categories":"Sushi Bars, Japanese, Restaurants","attributes":{"RestaurantsPriceRange2":"2"},"hours":{"Monday":"11:0-21:0"}}
{"business_id":"b","name":"Taco Two","city":"Goleta","state":"CA","stars":5.0,"review_count":20,"categories":["Mexican","Restaurants"]}
{"business_id":"c","name":"Deli Three","city":"New York","state":"NY","stars":3.0,"review_count":5,"categories":"Delis"}
"#;

    fn options(dir: &Path, input: PathBuf) -> ProcessOptions {
        ProcessOptions {
            input,
            output_dir: dir.join("processed"),
            top_categories: TOP_CATEGORIES_LIMIT,
        }
    }

    fn read_states(path: &Path) -> IndexMap<String, RegionSummary> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn end_to_end_region_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("business.json");
        std::fs::write(&input, THREE_BUSINESSES).unwrap();

        let result = process_business_file(&options(tmp.path(), input), &null_progress()).unwrap();
        assert_eq!(result.rows_written, 3);

        let states = read_states(&result.states_summary);
        assert_eq!(states.keys().collect::<Vec<_>>(), vec!["CA", "NY"]);
        assert_eq!(
            states["CA"],
            RegionSummary {
                business_count: 2,
                average_stars: 4.5,
                total_reviews: 30,
            }
        );
        assert_eq!(
            states["NY"],
            RegionSummary {
                business_count: 1,
                average_stars: 3.0,
                total_reviews: 5,
            }
        );

        let categories: Vec<CategoryCount> =
            serde_json::from_str(&std::fs::read_to_string(&result.top_categories).unwrap())
                .unwrap();
        assert_eq!(categories[0].category, "Restaurants");
        assert_eq!(categories[0].count, 2);
        assert_eq!(categories.len(), 5);
    }

    #[derive(Default)]
    struct RecordingProgress {
        total: Mutex<Option<u64>>,
        positions: Mutex<Vec<u64>>,
        messages: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            *self.total.lock().unwrap() = Some(total);
        }
        fn set_position(&self, pos: u64) {
            self.positions.lock().unwrap().push(pos);
        }
        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
        fn finish(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
        fn finish_and_clear(&self) {}
    }

    #[test]
    fn progress_tracks_bytes_of_input() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("business.json");
        std::fs::write(&input, THREE_BUSINESSES).unwrap();

        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        process_business_file(&options(tmp.path(), input), &progress).unwrap();

        let size = THREE_BUSINESSES.len() as u64;
        assert_eq!(*recorder.total.lock().unwrap(), Some(size));
        let positions = recorder.positions.lock().unwrap().clone();
        assert_eq!(positions.len(), 3);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(positions.last(), Some(&size));

        let messages = recorder.messages.lock().unwrap().clone();
        assert_eq!(messages[0], "Reading businesses");
        assert_eq!(messages[1], "Writing summaries");
        assert_eq!(messages[2], "processed 3 businesses");
    }

    #[test]
    fn rows_follow_input_order() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("business.json");
        std::fs::write(&input, THREE_BUSINESSES).unwrap();

        let result = process_business_file(&options(tmp.path(), input), &null_progress()).unwrap();

        let mut reader = csv::Reader::from_path(&result.businesses_csv).unwrap();
        let ids: Vec<String> = reader
            .records()
            .map(|r| r.unwrap().get(0).unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_line_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("business.json");
        std::fs::write(
            &input,
            "{\"business_id\":\"ok\",\"state\":\"AZ\",\"stars\":2.5}\n{\"business_id\": oops\n",
        )
        .unwrap();

        let result = process_business_file(&options(tmp.path(), input), &null_progress()).unwrap();
        assert_eq!(result.rows_written, 1);
        assert_eq!(read_states(&result.states_summary)["AZ"].business_count, 1);
    }

    #[test]
    fn rows_without_state_are_not_summarized() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("business.json");
        std::fs::write(
            &input,
            "{\"business_id\":\"x\",\"stars\":5.0}\n{\"business_id\":\"y\",\"state\":\"\"}\n",
        )
        .unwrap();

        let result = process_business_file(&options(tmp.path(), input), &null_progress()).unwrap();
        assert_eq!(result.rows_written, 2);
        assert!(read_states(&result.states_summary).is_empty());
    }

    #[test]
    fn missing_input_leaves_no_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        let output_dir = data_dir.join("processed");

        let err = process_raw(
            &data_dir,
            &output_dir,
            TOP_CATEGORIES_LIMIT,
            &null_progress(),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::InputNotFound { .. }));
        assert!(!output_dir.exists());
    }

    #[test]
    fn run_processes_then_reuses_export() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");
        let dataset = data_dir.join("yelp_dataset");
        std::fs::create_dir_all(&dataset).unwrap();
        let input = dataset.join(paths::BUSINESS_JSON);
        std::fs::write(&input, THREE_BUSINESSES).unwrap();

        let mut options = RunOptions::new(data_dir);
        options.map_points = true;

        let first = run(&options, &null_progress()).unwrap();
        assert_eq!(first.processed.as_ref().unwrap().rows_written, 3);
        assert_eq!(first.report.business_count, 2);
        assert_eq!(first.report.restaurants, 2);
        assert_eq!(first.report.with_price_range, 1);

        let points_path = first.map_points.unwrap();
        assert!(points_path.ends_with("ca_restaurants.json"));

        // Drop the raw dump: a second run must reuse the export.
        std::fs::remove_file(&input).unwrap();
        let second = run(&options, &null_progress()).unwrap();
        assert!(second.processed.is_none());
        assert_eq!(second.report, first.report);

        options.force = true;
        assert!(matches!(
            run(&options, &null_progress()),
            Err(ProcessError::InputNotFound { .. })
        ));
    }
}
