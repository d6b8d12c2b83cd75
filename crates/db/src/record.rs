//! Book record types as held by the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{NumericField, TextField};
use crate::store::StoreError;

/// Store-assigned identifier of a book.
///
/// Identifiers are UUIDv7 minted from a process-wide counter, so ordering by
/// id follows insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    /// Mint a fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Error returned when a string is not a valid book identifier.
#[derive(Debug, thiserror::Error)]
#[error("'{input}' is not a valid book id")]
pub struct InvalidBookId {
    input: String,
}

impl FromStr for BookId {
    type Err = InvalidBookId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self).map_err(|_| InvalidBookId {
            input: s.to_string(),
        })
    }
}

/// A stored book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_reviews_count: Option<i64>,
}

impl Book {
    /// Value of a text field, if set.
    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => self.title.as_deref(),
            TextField::Authors => self.authors.as_deref(),
            TextField::LanguageCode => self.language_code.as_deref(),
        }
    }

    /// Value of a numeric field widened to `f64`, if set.
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::AverageRating => self.average_rating,
            NumericField::NumPages => self.num_pages.map(|v| v as f64),
            NumericField::RatingsCount => self.ratings_count.map(|v| v as f64),
            NumericField::TextReviewsCount => self.text_reviews_count.map(|v| v as f64),
        }
    }

    /// Check the record against the collection schema.
    pub fn validate(&self) -> Result<(), StoreError> {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => {}
            _ => return Err(StoreError::validation("title", "is required")),
        }

        if let Some(rating) = self.average_rating {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(StoreError::validation(
                    "average_rating",
                    "must be between 0 and 5",
                ));
            }
        }

        let counts = [
            ("num_pages", self.num_pages),
            ("ratings_count", self.ratings_count),
            ("text_reviews_count", self.text_reviews_count),
        ];
        for (field, value) in counts {
            if matches!(value, Some(v) if v < 0) {
                return Err(StoreError::validation(field, "must not be negative"));
            }
        }

        Ok(())
    }
}

/// Field values for a book that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub isbn13: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub num_pages: Option<i64>,
    #[serde(default)]
    pub ratings_count: Option<i64>,
    #[serde(default)]
    pub text_reviews_count: Option<i64>,
}

impl NewBook {
    /// Attach an identifier, producing the record to store.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            authors: self.authors,
            average_rating: self.average_rating,
            isbn: self.isbn,
            isbn13: self.isbn13,
            language_code: self.language_code,
            num_pages: self.num_pages,
            ratings_count: self.ratings_count,
            text_reviews_count: self.text_reviews_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> Book {
        NewBook {
            title: Some(title.to_string()),
            ..Default::default()
        }
        .into_book(BookId::generate())
    }

    #[test]
    fn book_id_round_trips_through_display() {
        let id = BookId::generate();
        let parsed: BookId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_book_id_is_rejected() {
        let err = "not-an-id".parse::<BookId>().unwrap_err();
        assert_eq!(err.to_string(), "'not-an-id' is not a valid book id");
    }

    #[test]
    fn generated_ids_sort_in_creation_order() {
        let first = BookId::generate();
        let second = BookId::generate();
        assert!(first < second);
    }

    #[test]
    fn missing_fields_are_omitted_from_json() {
        let book = titled("Notes from a Small Island");
        let json = serde_json::to_value(&book).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["title"], "Notes from a Small Island");
        assert_eq!(object["id"], book.id.to_string());
    }

    #[test]
    fn validate_requires_title() {
        let book = NewBook::default().into_book(BookId::generate());
        assert!(matches!(
            book.validate(),
            Err(StoreError::Validation { field: "title", .. })
        ));

        let blank = titled("   ");
        assert!(blank.validate().is_err());
    }

    #[test]
    fn validate_checks_rating_and_counts() {
        let mut book = titled("Bryson's Dictionary of Troublesome Words");
        book.average_rating = Some(5.5);
        assert!(book.validate().is_err());

        book.average_rating = Some(3.93);
        book.num_pages = Some(-1);
        assert!(matches!(
            book.validate(),
            Err(StoreError::Validation {
                field: "num_pages",
                ..
            })
        ));

        book.num_pages = Some(0);
        assert!(book.validate().is_ok());
    }

    #[test]
    fn numeric_accessor_widens_integers() {
        let mut book = titled("A Short History of Nearly Everything");
        book.num_pages = Some(544);
        assert_eq!(book.numeric(NumericField::NumPages), Some(544.0));
        assert_eq!(book.numeric(NumericField::AverageRating), None);
    }
}
