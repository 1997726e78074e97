#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output schema and summary types for the Yelp business digest.
//!
//! Every raw business record is projected onto the fixed 12-column
//! [`NormalizedBusiness`] row. The per-state and per-category aggregates are
//! finalized into [`RegionSummary`] and [`CategoryCount`] values before being
//! written as JSON.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Maximum number of entries kept in the category ranking.
pub const TOP_CATEGORIES_LIMIT: usize = 200;

/// A column of the flattened business export, in header order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    BusinessId,
    Name,
    City,
    State,
    Stars,
    ReviewCount,
    Latitude,
    Longitude,
    IsOpen,
    Categories,
    Attributes,
    Hours,
}

impl Column {
    /// All columns in the order they appear in the CSV header.
    pub const ALL: &[Self] = &[
        Self::BusinessId,
        Self::Name,
        Self::City,
        Self::State,
        Self::Stars,
        Self::ReviewCount,
        Self::Latitude,
        Self::Longitude,
        Self::IsOpen,
        Self::Categories,
        Self::Attributes,
        Self::Hours,
    ];

    /// Returns the header names for every column.
    #[must_use]
    pub fn header() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_static_str()).collect()
    }

    /// The header name of this column.
    #[must_use]
    pub const fn as_static_str(self) -> &'static str {
        match self {
            Self::BusinessId => "business_id",
            Self::Name => "name",
            Self::City => "city",
            Self::State => "state",
            Self::Stars => "stars",
            Self::ReviewCount => "review_count",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::IsOpen => "is_open",
            Self::Categories => "categories",
            Self::Attributes => "attributes",
            Self::Hours => "hours",
        }
    }
}

/// A business record projected onto the fixed export schema.
///
/// Field order matches [`Column::ALL`]. Missing string fields are empty,
/// missing numbers are zero, and missing coordinates stay `None` because zero
/// is a valid coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBusiness {
    /// Yelp business identifier.
    pub business_id: String,
    /// Display name.
    pub name: String,
    /// City name as given by the source.
    pub city: String,
    /// Two-letter state/province code.
    pub state: String,
    /// Average star rating.
    pub stars: f64,
    /// Number of reviews.
    pub review_count: i64,
    /// Latitude (WGS84). `None` if the source lacks it.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` if the source lacks it.
    pub longitude: Option<f64>,
    /// `1` if the business is open, `0` otherwise.
    pub is_open: i64,
    /// Semicolon-joined canonical category list.
    pub categories: String,
    /// JSON text of the `attributes` object.
    pub attributes: String,
    /// JSON text of the `hours` object.
    pub hours: String,
}

/// Finalized per-state statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Number of businesses with this state code.
    pub business_count: u64,
    /// Mean star rating, rounded to three decimals.
    pub average_stars: f64,
    /// Sum of review counts.
    pub total_reviews: i64,
}

/// One entry of the category ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Number of businesses listing it.
    pub count: u64,
}

/// Result of a completed processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Path of the flattened business CSV.
    pub businesses_csv: PathBuf,
    /// Path of the per-state summary JSON.
    pub states_summary: PathBuf,
    /// Path of the category ranking JSON.
    pub top_categories: PathBuf,
    /// Number of data rows written to the CSV.
    pub rows_written: u64,
    /// How long the run took.
    pub duration: Duration,
}

/// Diagnostic summary of the businesses in one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    /// State code that was matched.
    pub state: String,
    /// Header names of the loaded CSV.
    pub columns: Vec<String>,
    /// Number of rows whose state matched.
    pub business_count: usize,
    /// Matched rows that parsed into the export schema, in file order.
    pub businesses: Vec<NormalizedBusiness>,
    /// Matched rows whose attributes mention `RestaurantsPriceRange2`.
    pub with_price_range: usize,
    /// Matched rows whose categories mention `Restaurants`.
    pub restaurants: usize,
}

/// A business plotted on the front-end map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub business_id: String,
    pub name: String,
    pub city: String,
    pub stars: f64,
    pub review_count: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl MapPoint {
    /// Builds a map point from a business, or `None` if either coordinate is
    /// missing.
    #[must_use]
    pub fn from_business(business: &NormalizedBusiness) -> Option<Self> {
        Some(Self {
            business_id: business.business_id.clone(),
            name: business.name.clone(),
            city: business.city.clone(),
            stars: business.stars,
            review_count: business.review_count,
            latitude: business.latitude?,
            longitude: business.longitude?,
        })
    }
}
