//! Aggregate statistics over the book collection.
//!
//! Pure functions over a slice of records, no persistence involved. The shell fetches
//! current rows from the catalog store and hands them here for summarizing.

use crate::catalog::types::{Book, ReadStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of a collection: totals, reading-status breakdown, mean rating, and the
/// genre and rating distributions used for the statistics view.
#[non_exhaustive]
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LibraryStats {
    pub total_books: usize,
    pub status_counts: BTreeMap<ReadStatus, usize>,
    /// Mean rating rounded to one decimal place; `None` for an empty collection.
    pub mean_rating: Option<f64>,
    /// Sum over all records, missing page counts counting as zero.
    pub total_pages: i64,
    /// Books per genre. Records without a genre are not counted.
    pub genre_counts: BTreeMap<String, usize>,
    /// Books per rating value, sorted by rating ascending.
    pub rating_counts: Vec<(i64, usize)>,
}

/// Summarize `books` into a [`LibraryStats`].
#[allow(
    clippy::cast_precision_loss,
    reason = "Rating sums for a personal collection are far below 2^52"
)]
#[must_use]
pub fn summarize(books: &[Book]) -> LibraryStats {
    let mut status_counts: BTreeMap<ReadStatus, usize> = BTreeMap::new();
    let mut genre_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut rating_histogram: BTreeMap<i64, usize> = BTreeMap::new();
    let mut total_pages = 0_i64;
    let mut rating_sum = 0_i64;

    for book in books {
        *status_counts.entry(book.read_status).or_insert(0) += 1;
        if let Some(genre) = &book.genre {
            *genre_counts.entry(genre.clone()).or_insert(0) += 1;
        }
        *rating_histogram.entry(book.rating).or_insert(0) += 1;
        total_pages += book.pages.unwrap_or(0);
        rating_sum += book.rating;
    }

    let mean_rating = if books.is_empty() {
        None
    } else {
        let mean = rating_sum as f64 / books.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    };

    LibraryStats {
        total_books: books.len(),
        status_counts,
        mean_rating,
        total_pages,
        genre_counts,
        rating_counts: rating_histogram.into_iter().collect(),
    }
}

/// Count of records with the given reading status, 0 when none have it.
#[must_use]
#[inline]
pub fn status_count(stats: &LibraryStats, status: ReadStatus) -> usize {
    stats.status_counts.get(&status).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn book(title: &str, genre: Option<&str>, pages: Option<i64>, status: ReadStatus, rating: i64) -> Book {
        Book::new(
            0,
            title.to_owned(),
            None,
            None,
            genre.map(str::to_owned),
            pages,
            None,
            None,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status,
            rating,
            None,
        )
    }

    #[test]
    fn mean_rating_rounds_to_one_decimal() {
        let books = vec![
            book("a", None, None, ReadStatus::Unread, 3),
            book("b", None, None, ReadStatus::Unread, 4),
            book("c", None, None, ReadStatus::Unread, 5),
        ];

        let stats = summarize(&books);
        assert_eq!(stats.mean_rating, Some(4.0));

        let books = vec![
            book("a", None, None, ReadStatus::Unread, 3),
            book("b", None, None, ReadStatus::Unread, 4),
            book("c", None, None, ReadStatus::Unread, 4),
        ];
        let stats = summarize(&books);
        assert_eq!(stats.mean_rating, Some(3.7));
    }

    #[test]
    fn empty_collection_has_no_mean_and_zero_pages() {
        let stats = summarize(&[]);

        assert_eq!(stats.total_books, 0);
        assert_eq!(stats.mean_rating, None);
        assert_eq!(stats.total_pages, 0);
        assert!(stats.status_counts.is_empty());
        assert!(stats.genre_counts.is_empty());
        assert!(stats.rating_counts.is_empty());
    }

    #[test]
    fn missing_pages_count_as_zero() {
        let books = vec![
            book("a", None, Some(300), ReadStatus::Finished, 4),
            book("b", None, None, ReadStatus::Unread, 2),
            book("c", None, Some(150), ReadStatus::Reading, 3),
        ];

        let stats = summarize(&books);
        assert_eq!(stats.total_pages, 450);
    }

    #[test]
    fn status_breakdown_counts_every_state() {
        let books = vec![
            book("a", None, None, ReadStatus::Finished, 5),
            book("b", None, None, ReadStatus::Finished, 4),
            book("c", None, None, ReadStatus::Unread, 1),
            book("d", None, None, ReadStatus::Reading, 2),
        ];

        let stats = summarize(&books);
        assert_eq!(status_count(&stats, ReadStatus::Finished), 2);
        assert_eq!(status_count(&stats, ReadStatus::Unread), 1);
        assert_eq!(status_count(&stats, ReadStatus::Reading), 1);
    }

    #[test]
    fn genre_distribution_skips_missing_genres() {
        let books = vec![
            book("a", Some("Fantasy"), None, ReadStatus::Unread, 3),
            book("b", Some("Fantasy"), None, ReadStatus::Unread, 3),
            book("c", Some("History"), None, ReadStatus::Unread, 3),
            book("d", None, None, ReadStatus::Unread, 3),
        ];

        let stats = summarize(&books);
        assert_eq!(stats.genre_counts.len(), 2);
        assert_eq!(stats.genre_counts.get("Fantasy"), Some(&2));
        assert_eq!(stats.genre_counts.get("History"), Some(&1));
    }

    #[test]
    fn rating_distribution_is_sorted_ascending() {
        let books = vec![
            book("a", None, None, ReadStatus::Unread, 5),
            book("b", None, None, ReadStatus::Unread, 1),
            book("c", None, None, ReadStatus::Unread, 5),
            book("d", None, None, ReadStatus::Unread, 3),
        ];

        let stats = summarize(&books);
        assert_eq!(stats.rating_counts, vec![(1, 1), (3, 1), (5, 2)]);
    }

    #[test]
    fn stats_serialize_for_the_shell() {
        let books = vec![book("a", Some("Fantasy"), Some(100), ReadStatus::Finished, 5)];

        let json = serde_json::to_value(summarize(&books)).unwrap();
        assert_eq!(json["total_books"], 1);
        assert_eq!(json["status_counts"]["Finished"], 1);
        assert_eq!(json["mean_rating"], 5.0);
    }
}
