//! Declarative, conjunctive filters over book records.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::record::Book;

/// Text columns of the book collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Authors,
    LanguageCode,
}

impl TextField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Authors => "authors",
            TextField::LanguageCode => "language_code",
        }
    }
}

/// Numeric columns of the book collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    AverageRating,
    NumPages,
    RatingsCount,
    TextReviewsCount,
}

impl NumericField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::AverageRating => "average_rating",
            NumericField::NumPages => "num_pages",
            NumericField::RatingsCount => "ratings_count",
            NumericField::TextReviewsCount => "text_reviews_count",
        }
    }
}

/// A single predicate on one field.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Unanchored, case-insensitive literal substring match.
    Contains { field: TextField, pattern: Regex },
    /// Exact string equality.
    Equals { field: TextField, value: String },
    /// Half-open numeric range `[start, end)`.
    Within {
        field: NumericField,
        range: Range<f64>,
    },
}

impl Condition {
    /// Records missing the field never match.
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Condition::Contains { field, pattern } => {
                book.text(*field).is_some_and(|text| pattern.is_match(text))
            }
            Condition::Equals { field, value } => book.text(*field) == Some(value.as_str()),
            Condition::Within { field, range } => {
                book.numeric(*field).is_some_and(|x| range.contains(&x))
            }
        }
    }
}

/// Conjunction of conditions. An empty filter matches every record.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field` to contain `needle`, ignoring case.
    ///
    /// The needle is matched literally; pattern metacharacters carry no meaning.
    pub fn contains(mut self, field: TextField, needle: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()?;
        self.conditions.push(Condition::Contains { field, pattern });
        Ok(self)
    }

    /// Require `field` to equal `value` exactly.
    pub fn equals(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Equals {
            field,
            value: value.into(),
        });
        self
    }

    /// Require `field` to fall in the bucket `[start, start + width)`.
    pub fn bucket(mut self, field: NumericField, start: f64, width: f64) -> Self {
        self.conditions.push(Condition::Within {
            field,
            range: start..start + width,
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.conditions.iter().all(|condition| condition.matches(book))
    }
}
