//! Translation of request parameters into store filters.
//!
//! Bucket widths differ by endpoint: ratings always use a bucket of 1, count
//! fields use 100 on the combined filter and 50 on the single-field routes.

use shelf_db::{Filter, NumericField, TextField};
use thiserror::Error;

use super::models::FilterBooksQuery;
use crate::utils::non_empty;

/// Bucket width for `average_rating` on every endpoint.
pub const RATING_BUCKET: f64 = 1.0;
/// Bucket width for count fields on `/filterbooks`.
pub const COMBINED_COUNT_BUCKET: f64 = 100.0;
/// Bucket width for count fields on the single-field routes.
pub const SINGLE_COUNT_BUCKET: f64 = 50.0;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("'{value}' is not a valid number for {parameter}")]
    InvalidNumber {
        parameter: &'static str,
        value: String,
    },

    #[error("search text is too long")]
    InvalidPattern(#[from] regex::Error),
}

/// Parse a numeric parameter, rejecting anything that is not a finite number.
pub fn parse_number(parameter: &'static str, raw: &str) -> Result<f64, FilterError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FilterError::InvalidNumber {
            parameter,
            value: raw.to_string(),
        })
}

fn with_bucket(
    filter: Filter,
    field: NumericField,
    raw: Option<&str>,
    width: f64,
) -> Result<Filter, FilterError> {
    match non_empty(raw) {
        Some(raw) => {
            let start = parse_number(field.as_str(), raw)?;
            Ok(filter.bucket(field, start, width))
        }
        None => Ok(filter),
    }
}

fn with_substring(
    filter: Filter,
    field: TextField,
    raw: Option<&str>,
) -> Result<Filter, FilterError> {
    match non_empty(raw) {
        Some(needle) => Ok(filter.contains(field, needle)?),
        None => Ok(filter),
    }
}

/// Conjunction of every parameter supplied to `/filterbooks`.
pub fn combined_filter(query: &FilterBooksQuery) -> Result<Filter, FilterError> {
    let mut filter = Filter::all();

    filter = with_substring(filter, TextField::Title, query.title.as_deref())?;
    filter = with_substring(filter, TextField::Authors, query.authors.as_deref())?;
    filter = with_bucket(
        filter,
        NumericField::AverageRating,
        query.average_rating.as_deref(),
        RATING_BUCKET,
    )?;
    filter = with_bucket(
        filter,
        NumericField::NumPages,
        query.num_pages.as_deref(),
        COMBINED_COUNT_BUCKET,
    )?;
    filter = with_bucket(
        filter,
        NumericField::RatingsCount,
        query.ratings_count.as_deref(),
        COMBINED_COUNT_BUCKET,
    )?;
    filter = with_bucket(
        filter,
        NumericField::TextReviewsCount,
        query.text_reviews_count.as_deref(),
        COMBINED_COUNT_BUCKET,
    )?;

    if let Some(code) = non_empty(query.language_code.as_deref()) {
        filter = filter.equals(TextField::LanguageCode, code);
    }

    Ok(filter)
}

/// Title search; a missing title matches everything.
pub fn title_filter(title: Option<&str>) -> Result<Filter, FilterError> {
    with_substring(Filter::all(), TextField::Title, title)
}

pub fn authors_filter(authors: &str) -> Result<Filter, FilterError> {
    Ok(Filter::all().contains(TextField::Authors, authors)?)
}

pub fn rating_filter(raw: &str) -> Result<Filter, FilterError> {
    let start = parse_number(NumericField::AverageRating.as_str(), raw)?;
    Ok(Filter::all().bucket(NumericField::AverageRating, start, RATING_BUCKET))
}

/// Single-field count lookup (`num_pages`, `ratings_count`, `text_reviews_count`).
pub fn count_filter(field: NumericField, raw: &str) -> Result<Filter, FilterError> {
    let start = parse_number(field.as_str(), raw)?;
    Ok(Filter::all().bucket(field, start, SINGLE_COUNT_BUCKET))
}

pub fn language_filter(code: &str) -> Filter {
    Filter::all().equals(TextField::LanguageCode, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shelf_db::{Book, BookId, Condition, NewBook};

    fn book(pages: i64, ratings: i64, reviews: i64) -> Book {
        NewBook {
            title: Some("Bill Bryson's African Diary".to_string()),
            authors: Some("Bill Bryson".to_string()),
            average_rating: Some(4.2),
            language_code: Some("eng".to_string()),
            num_pages: Some(pages),
            ratings_count: Some(ratings),
            text_reviews_count: Some(reviews),
            ..Default::default()
        }
        .into_book(BookId::generate())
    }

    fn bucket_of(filter: &Filter) -> (NumericField, f64, f64) {
        match filter.conditions() {
            [Condition::Within { field, range }] => (*field, range.start, range.end),
            other => panic!("expected one range condition, got {other:?}"),
        }
    }

    #[rstest]
    #[case("200", 200.0)]
    #[case(" 42 ", 42.0)]
    #[case("3.5", 3.5)]
    #[case("-1", -1.0)]
    fn parses_numbers(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_number("num_pages", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("NaN")]
    #[case("inf")]
    #[case("12pages")]
    fn rejects_malformed_numbers(#[case] raw: &str) {
        let err = parse_number("num_pages", raw).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidNumber {
                parameter: "num_pages",
                ..
            }
        ));
    }

    #[test]
    fn empty_query_matches_everything() {
        let filter = combined_filter(&FilterBooksQuery::default()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn blank_values_are_omitted() {
        let query = FilterBooksQuery {
            title: Some(String::new()),
            num_pages: Some(String::new()),
            ..Default::default()
        };
        assert!(combined_filter(&query).unwrap().is_empty());
    }

    #[rstest]
    #[case(NumericField::NumPages)]
    #[case(NumericField::RatingsCount)]
    #[case(NumericField::TextReviewsCount)]
    fn combined_counts_use_hundred_wide_buckets(#[case] field: NumericField) {
        let mut query = FilterBooksQuery::default();
        let value = Some("200".to_string());
        match field {
            NumericField::NumPages => query.num_pages = value,
            NumericField::RatingsCount => query.ratings_count = value,
            NumericField::TextReviewsCount => query.text_reviews_count = value,
            NumericField::AverageRating => unreachable!(),
        }

        let filter = combined_filter(&query).unwrap();
        assert_eq!(bucket_of(&filter), (field, 200.0, 300.0));
    }

    #[rstest]
    #[case(NumericField::NumPages)]
    #[case(NumericField::RatingsCount)]
    #[case(NumericField::TextReviewsCount)]
    fn single_field_counts_use_fifty_wide_buckets(#[case] field: NumericField) {
        let filter = count_filter(field, "100").unwrap();
        assert_eq!(bucket_of(&filter), (field, 100.0, 150.0));
    }

    #[test]
    fn rating_bucket_is_one_wide_everywhere() {
        let filter = rating_filter("4").unwrap();
        assert_eq!(bucket_of(&filter), (NumericField::AverageRating, 4.0, 5.0));

        let query = FilterBooksQuery {
            average_rating: Some("3".to_string()),
            ..Default::default()
        };
        let filter = combined_filter(&query).unwrap();
        assert_eq!(bucket_of(&filter), (NumericField::AverageRating, 3.0, 4.0));
    }

    #[test]
    fn combined_filter_is_conjunctive() {
        let query = FilterBooksQuery {
            average_rating: Some("4".to_string()),
            num_pages: Some("200".to_string()),
            ..Default::default()
        };
        let filter = combined_filter(&query).unwrap();
        assert_eq!(filter.conditions().len(), 2);

        assert!(filter.matches(&book(250, 0, 0)));
        assert!(!filter.matches(&book(300, 0, 0)));
    }

    #[test]
    fn combined_filter_reports_offending_parameter() {
        let query = FilterBooksQuery {
            ratings_count: Some("lots".to_string()),
            ..Default::default()
        };
        let err = combined_filter(&query).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'lots' is not a valid number for ratings_count"
        );
    }

    #[test]
    fn authors_match_ignores_case() {
        let filter = authors_filter("bill").unwrap();
        assert!(filter.matches(&book(1, 1, 1)));
    }

    #[test]
    fn single_field_bucket_excludes_upper_edge() {
        let filter = count_filter(NumericField::RatingsCount, "1000").unwrap();
        assert!(filter.matches(&book(1, 1000, 1)));
        assert!(filter.matches(&book(1, 1049, 1)));
        assert!(!filter.matches(&book(1, 1050, 1)));
    }

    #[test]
    fn language_match_is_exact() {
        assert!(language_filter("eng").matches(&book(1, 1, 1)));
        assert!(!language_filter("ENG").matches(&book(1, 1, 1)));
    }

    #[test]
    fn missing_title_matches_everything() {
        assert!(title_filter(None).unwrap().is_empty());
        assert!(!title_filter(Some("diary")).unwrap().is_empty());
    }
}
