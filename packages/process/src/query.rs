//! Diagnostic queries over the processed business CSV.
//!
//! Matching is exact on the state code and plain substring containment on
//! the `attributes` and `categories` text columns.

use std::path::{Path, PathBuf};

use yelp_digest_business_models::{Column, MapPoint, NormalizedBusiness, StateReport};

use crate::{ProcessError, writer};

/// Attribute key counted by [`businesses_in_state`].
pub const PRICE_RANGE_MARKER: &str = "RestaurantsPriceRange2";

/// Category text counted by [`businesses_in_state`].
pub const RESTAURANTS_MARKER: &str = "Restaurants";

/// Loads `csv_path` and reports on the rows whose `state` equals `state`.
///
/// Rows that fail to parse are skipped.
///
/// # Errors
///
/// Returns [`ProcessError::Csv`] if the file cannot be opened or its header
/// read, and [`ProcessError::MissingColumn`] if a required column is absent.
pub fn businesses_in_state(csv_path: &Path, state: &str) -> Result<StateReport, ProcessError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .map_err(|e| ProcessError::csv(csv_path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| ProcessError::csv(csv_path, e))?
        .clone();
    let columns: Vec<String> = headers.iter().map(String::from).collect();

    let column_index = |column: Column| {
        let name = column.as_static_str();
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ProcessError::MissingColumn {
                path: csv_path.display().to_string(),
                column: name,
            })
    };
    let state_idx = column_index(Column::State)?;
    let attributes_idx = column_index(Column::Attributes)?;
    let categories_idx = column_index(Column::Categories)?;

    let mut business_count = 0;
    let mut with_price_range = 0;
    let mut restaurants = 0;
    let mut businesses = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                continue;
            }
        };

        if record.get(state_idx) != Some(state) {
            continue;
        }

        business_count += 1;
        if record
            .get(attributes_idx)
            .is_some_and(|a| a.contains(PRICE_RANGE_MARKER))
        {
            with_price_range += 1;
        }
        if record
            .get(categories_idx)
            .is_some_and(|c| c.contains(RESTAURANTS_MARKER))
        {
            restaurants += 1;
        }

        match record.deserialize::<NormalizedBusiness>(Some(&headers)) {
            Ok(business) => businesses.push(business),
            Err(e) => log::trace!("  row matched {state} but did not parse: {e}"),
        }
    }

    log::info!("Found {business_count} businesses in state {state}.");
    log::info!("state columns: {columns:?}");
    log::info!(
        "Found attributes containing \"{PRICE_RANGE_MARKER}\": {with_price_range} businesses."
    );
    log::info!("Found categories containing \"{RESTAURANTS_MARKER}\": {restaurants} businesses.");

    Ok(StateReport {
        state: state.to_string(),
        columns,
        business_count,
        businesses,
        with_price_range,
        restaurants,
    })
}

/// Path of the map front end's restaurant file for `state`, e.g.
/// `ca_restaurants.json`.
#[must_use]
pub fn map_points_path(dir: &Path, state: &str) -> PathBuf {
    dir.join(format!("{}_restaurants.json", state.to_lowercase()))
}

/// Restaurants from `report` that have both coordinates, in file order.
#[must_use]
pub fn restaurant_points(report: &StateReport) -> Vec<MapPoint> {
    report
        .businesses
        .iter()
        .filter(|b| b.categories.contains(RESTAURANTS_MARKER))
        .filter_map(MapPoint::from_business)
        .collect()
}

/// Writes [`restaurant_points`] to `path` as a JSON array and returns how
/// many points were written.
///
/// # Errors
///
/// Returns [`ProcessError`] if the file cannot be written.
pub fn write_map_points(report: &StateReport, path: &Path) -> Result<usize, ProcessError> {
    let points = restaurant_points(report);
    writer::write_json(path, &points)?;
    log::info!("Wrote {} map points to {}", points.len(), path.display());
    Ok(points.len())
}
