//! Review deduplication across the detail page and sorted review listings

use crate::scraper::types::ReviewRecord;
use std::collections::HashSet;
use tracing::debug;

/// Review orderings, each paginated independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Popular reviews
    Activity,
    /// Most recent reviews
    Added,
    RatingHighest,
    RatingLowest,
}

impl SortOrder {
    /// Order in which the sub-crawls run
    pub const ALL: [Self; 4] = [
        Self::Activity,
        Self::Added,
        Self::RatingHighest,
        Self::RatingLowest,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Added => "added",
            Self::RatingHighest => "rating-highest",
            Self::RatingLowest => "rating-lowest",
        }
    }

    /// First page of this ordering for a film address
    #[must_use]
    pub fn reviews_url(&self, film_url: &str) -> String {
        format!("{}/reviews/by/{}/", film_url.trim_end_matches('/'), self.name())
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique reviews collected for one film.
///
/// The first record seen for a key wins. Insertion order is kept so that
/// equally liked reviews stay in the order they were merged.
#[derive(Debug, Clone)]
pub struct ReviewAggregationState {
    keys: HashSet<String>,
    reviews: Vec<ReviewRecord>,
    min_reviews: usize,
    review_limit: usize,
}

impl ReviewAggregationState {
    #[must_use]
    pub fn new(min_reviews: usize, review_limit: usize) -> Self {
        Self {
            keys: HashSet::new(),
            reviews: Vec::new(),
            min_reviews,
            review_limit,
        }
    }

    /// Merge a batch, skipping known keys and stopping at the cap.
    /// Returns how many reviews were new.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = ReviewRecord>) -> usize {
        let mut added = 0;

        for review in batch {
            if self.is_full() {
                debug!("Reached review limit of {}", self.review_limit);
                break;
            }

            if self.keys.insert(review.key()) {
                self.reviews.push(review);
                added += 1;
            }
        }

        added
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Enough reviews that further sort orders are skipped
    #[must_use]
    pub fn has_enough(&self) -> bool {
        self.reviews.len() >= self.min_reviews
    }

    /// Hard cap reached; nothing more will be merged
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.reviews.len() >= self.review_limit
    }

    /// Most liked first, ties in merge order, at most the cap
    #[must_use]
    pub fn into_sorted(self) -> Vec<ReviewRecord> {
        let mut reviews = self.reviews;
        reviews.sort_by(|a, b| b.likes.cmp(&a.likes));
        reviews.truncate(self.review_limit);
        reviews
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: usize, likes: u32) -> ReviewRecord {
        ReviewRecord {
            text: format!("Review number {id} with enough words"),
            rating: String::new(),
            has_rating: false,
            is_liked: false,
            likes,
            url: format!("https://letterboxd.com/user{id}/film/alien/"),
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let mut state = ReviewAggregationState::new(50, 100);
        state.merge([review(1, 5)]);

        let mut duplicate = review(1, 500);
        duplicate.text = "A different text for the same permalink".to_string();
        assert_eq!(state.merge([duplicate, review(2, 1)]), 1);

        let sorted = state.into_sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].likes, 5);
    }

    #[test]
    fn test_text_prefix_key_without_url() {
        let mut state = ReviewAggregationState::new(50, 100);
        let mut a = review(1, 0);
        a.url.clear();
        let mut b = a.clone();
        b.likes = 9;

        assert_eq!(state.merge([a, b]), 1);
    }

    #[test]
    fn test_merge_stops_at_cap() {
        let mut state = ReviewAggregationState::new(3, 4);
        let added = state.merge((0..10).map(|i| review(i, 0)));

        assert_eq!(added, 4);
        assert!(state.is_full());
        assert_eq!(state.merge([review(99, 1000)]), 0);
        assert_eq!(state.into_sorted().len(), 4);
    }

    #[test]
    fn test_has_enough_threshold() {
        let mut state = ReviewAggregationState::new(2, 10);
        state.merge([review(1, 0)]);
        assert!(!state.has_enough());
        state.merge([review(2, 0)]);
        assert!(state.has_enough());
        assert!(!state.is_full());
    }

    #[test]
    fn test_sorted_by_likes_stable() {
        let mut state = ReviewAggregationState::new(50, 100);
        state.merge([review(1, 3), review(2, 10), review(3, 3), review(4, 0)]);

        let sorted = state.into_sorted();
        let likes: Vec<u32> = sorted.iter().map(|r| r.likes).collect();
        assert_eq!(likes, vec![10, 3, 3, 0]);
        assert!(sorted[1].url.contains("user1"));
        assert!(sorted[2].url.contains("user3"));
    }

    #[test]
    fn test_never_exceeds_cap_across_batches() {
        let mut state = ReviewAggregationState::new(50, 100);
        for batch in 0..8 {
            state.merge((0..30).map(|i| review(batch * 30 + i, i as u32)));
        }

        let sorted = state.into_sorted();
        assert_eq!(sorted.len(), 100);
        assert!(sorted.windows(2).all(|w| w[0].likes >= w[1].likes));
        let keys: HashSet<String> = sorted.iter().map(ReviewRecord::key).collect();
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn test_sort_order_urls() {
        assert_eq!(
            SortOrder::RatingLowest.reviews_url("https://letterboxd.com/film/alien/"),
            "https://letterboxd.com/film/alien/reviews/by/rating-lowest/"
        );
        assert_eq!(SortOrder::ALL[0], SortOrder::Activity);
    }
}
