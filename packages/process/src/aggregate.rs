//! Running per-state and per-category statistics.
//!
//! Both accumulators are updated once per record and never look at earlier
//! records, so a whole dump is summarized in a single pass.

use indexmap::IndexMap;
use yelp_digest_business_models::{CategoryCount, NormalizedBusiness, RegionSummary};

use crate::normalize::split_categories;

#[derive(Debug, Default, Clone, Copy)]
struct RegionTotals {
    count: u64,
    stars: f64,
    reviews: i64,
}

impl RegionTotals {
    fn add(&mut self, stars: f64, review_count: i64) {
        self.count += 1;
        self.stars += stars;
        // Clamps instead of wrapping on absurd review counts.
        self.reviews = self.reviews.saturating_add(review_count);
    }
}

/// Per-state running totals keyed by state code, in first-seen order.
///
/// A state is present only once at least one record carried it.
#[derive(Debug, Default)]
pub struct RegionAccumulator {
    regions: IndexMap<String, RegionTotals>,
}

impl RegionAccumulator {
    /// Adds one record. Records with an empty state code are ignored.
    pub fn record(&mut self, state: &str, stars: f64, review_count: i64) {
        if state.is_empty() {
            return;
        }

        if let Some(totals) = self.regions.get_mut(state) {
            totals.add(stars, review_count);
        } else {
            let mut totals = RegionTotals::default();
            totals.add(stars, review_count);
            self.regions.insert(state.to_string(), totals);
        }
    }

    /// Number of distinct states seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no state has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Computes the final summary for every state.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn finalize(self) -> IndexMap<String, RegionSummary> {
        self.regions
            .into_iter()
            .map(|(state, totals)| {
                let summary = RegionSummary {
                    business_count: totals.count,
                    average_stars: round3(totals.stars / totals.count as f64),
                    total_reviews: totals.reviews,
                };
                (state, summary)
            })
            .collect()
    }
}

/// Global category occurrence counts.
///
/// Kept in first-seen order so ties in the final ranking go to the earlier
/// category.
#[derive(Debug, Default)]
pub struct CategoryAccumulator {
    tallies: IndexMap<String, u64>,
}

impl CategoryAccumulator {
    /// Counts every category in a canonical `;`-joined string once.
    pub fn record(&mut self, categories: &str) {
        for category in split_categories(categories) {
            if let Some(count) = self.tallies.get_mut(category) {
                *count += 1;
            } else {
                self.tallies.insert(category.to_string(), 1);
            }
        }
    }

    /// Number of distinct categories seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    /// Whether no category has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// The `limit` most frequent categories, by count descending, ties
    /// broken by first appearance.
    #[must_use]
    pub fn top(mut self, limit: usize) -> Vec<CategoryCount> {
        // Stable, so equal counts stay in insertion order.
        self.tallies.sort_by(|_, a, _, b| b.cmp(a));
        self.tallies.truncate(limit);

        self.tallies
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect()
    }
}

/// Finalized output of an [`Aggregator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Summaries {
    /// Per-state summary, keyed by state code in first-seen order.
    pub regions: IndexMap<String, RegionSummary>,
    /// Ranked category counts.
    pub top_categories: Vec<CategoryCount>,
}

/// Both accumulators, fed together from the normalized record stream.
#[derive(Debug, Default)]
pub struct Aggregator {
    regions: RegionAccumulator,
    categories: CategoryAccumulator,
}

impl Aggregator {
    /// Folds one normalized record into the running statistics.
    pub fn record(&mut self, business: &NormalizedBusiness) {
        self.regions
            .record(&business.state, business.stars, business.review_count);
        self.categories.record(&business.categories);
    }

    #[must_use]
    pub const fn regions(&self) -> &RegionAccumulator {
        &self.regions
    }

    #[must_use]
    pub const fn categories(&self) -> &CategoryAccumulator {
        &self.categories
    }

    /// Ends the pass, keeping at most `top_categories` ranked categories.
    #[must_use]
    pub fn finalize(self, top_categories: usize) -> Summaries {
        Summaries {
            regions: self.regions.finalize(),
            top_categories: self.categories.top(top_categories),
        }
    }
}

/// Rounds to three decimal places.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize::normalize_business;

    fn business(state: &str, stars: f64, review_count: i64, categories: &str) -> NormalizedBusiness {
        NormalizedBusiness {
            state: state.to_string(),
            stars,
            review_count,
            categories: categories.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn summarizes_regions() {
        let mut aggregator = Aggregator::default();
        aggregator.record(&business("CA", 4.0, 10, ""));
        aggregator.record(&business("CA", 5.0, 20, ""));
        aggregator.record(&business("NY", 3.0, 5, ""));

        let summaries = aggregator.finalize(200);
        assert_eq!(
            summaries.regions["CA"],
            RegionSummary {
                business_count: 2,
                average_stars: 4.5,
                total_reviews: 30,
            }
        );
        assert_eq!(
            summaries.regions["NY"],
            RegionSummary {
                business_count: 1,
                average_stars: 3.0,
                total_reviews: 5,
            }
        );
    }

    #[test]
    fn huge_review_counts_saturate() {
        let record = normalize_business(&json!({"state": "CA", "review_count": i64::MAX}));
        let mut aggregator = Aggregator::default();
        aggregator.record(&record);
        aggregator.record(&record);

        let summaries = aggregator.finalize(200);
        assert_eq!(summaries.regions["CA"].business_count, 2);
        assert_eq!(summaries.regions["CA"].total_reviews, i64::MAX);
    }

    #[test]
    fn regions_keep_first_seen_order() {
        let mut regions = RegionAccumulator::default();
        for state in ["NV", "AZ", "NV", "PA", "AZ"] {
            regions.record(state, 3.0, 1);
        }
        let states: Vec<String> = regions.finalize().into_keys().collect();
        assert_eq!(states, vec!["NV", "AZ", "PA"]);
    }

    #[test]
    fn empty_state_is_not_counted() {
        let mut regions = RegionAccumulator::default();
        regions.record("", 5.0, 100);
        assert!(regions.is_empty());
        assert!(regions.finalize().is_empty());
    }

    #[test]
    fn average_is_rounded_to_three_decimals() {
        let mut regions = RegionAccumulator::default();
        regions.record("PA", 4.0, 1);
        regions.record("PA", 4.5, 1);
        regions.record("PA", 3.5, 1);
        regions.record("PA", 1.0, 1);
        regions.record("PA", 2.0, 1);
        regions.record("PA", 5.0, 1);
        // 20.0 / 6 = 3.3333...
        let summary = regions.finalize()["PA"];
        assert!((summary.average_stars - 3.333).abs() < 1e-9);
    }

    #[test]
    fn region_counts_add_up_to_stated_rows() {
        let rows = [("CA", 1.0), ("", 2.0), ("NV", 3.0), ("CA", 4.0), ("", 5.0)];
        let mut regions = RegionAccumulator::default();
        for (state, stars) in rows {
            regions.record(state, stars, 0);
        }
        let total: u64 = regions.finalize().values().map(|s| s.business_count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn each_category_token_counts_once_per_record() {
        let mut categories = CategoryAccumulator::default();
        categories.record("Bars;Pubs");
        categories.record("Pubs; ;Bars;Nightlife");
        categories.record("");

        assert_eq!(categories.len(), 3);
        let top = categories.top(200);
        assert_eq!(top[0], CategoryCount { category: "Bars".to_string(), count: 2 });
        assert_eq!(top[1], CategoryCount { category: "Pubs".to_string(), count: 2 });
        assert_eq!(top[2], CategoryCount { category: "Nightlife".to_string(), count: 1 });
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut categories = CategoryAccumulator::default();
        categories.record("Zoos");
        categories.record("Apple Stores");
        categories.record("Museums");
        categories.record("Museums");

        let names: Vec<String> = categories.top(200).into_iter().map(|c| c.category).collect();
        assert_eq!(names, vec!["Museums", "Zoos", "Apple Stores"]);
    }

    #[test]
    fn ranking_is_capped() {
        let mut categories = CategoryAccumulator::default();
        for i in 0..250 {
            categories.record(&format!("Category {i}"));
        }
        categories.record("Category 249");

        let top = categories.top(200);
        assert_eq!(top.len(), 200);
        assert_eq!(top[0].category, "Category 249");
        assert_eq!(top[1].category, "Category 0");
        assert_eq!(top[199].category, "Category 198");
    }

    #[test]
    fn repeated_category_keeps_one_entry() {
        let mut categories = CategoryAccumulator::default();
        for _ in 0..3 {
            categories.record("Coffee & Tea;Cafes");
        }
        categories.record("Cafes");

        assert_eq!(categories.len(), 2);
        let top = categories.top(200);
        assert_eq!(top[0], CategoryCount { category: "Cafes".to_string(), count: 4 });
        assert_eq!(top[1], CategoryCount { category: "Coffee & Tea".to_string(), count: 3 });
    }

    #[test]
    fn ranking_shorter_than_limit() {
        let mut categories = CategoryAccumulator::default();
        categories.record("Cafes;Bakeries");
        assert_eq!(categories.top(200).len(), 2);
    }
}
