use serde::{Deserialize, Deserializer, Serialize};
use shelf_db::Book;

/// Query string of the combined filter endpoint.
///
/// Values stay raw strings so numeric ones can be rejected with a useful message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterBooksQuery {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub average_rating: Option<String>,
    pub num_pages: Option<String>,
    pub ratings_count: Option<String>,
    pub text_reviews_count: Option<String>,
    pub language_code: Option<String>,
}

/// Query string of the title search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

/// Confirmation returned after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Partial update of a book.
///
/// Each field has three states: absent (`None`, keep the stored value),
/// `null` (`Some(None)`, clear it), or a value (`Some(Some(v))`, replace it).
/// Fields outside this allow-list are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub authors: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub average_rating: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub isbn13: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub language_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub num_pages: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub ratings_count: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub text_reviews_count: Option<Option<i64>>,
}

/// Marks a field as present, keeping `null` distinct from absent.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn merge<T>(slot: &mut Option<T>, update: Option<Option<T>>) {
    if let Some(value) = update {
        *slot = value;
    }
}

impl BookPatch {
    /// Apply the patch to `book`. The id is never touched.
    pub fn apply(self, book: &mut Book) {
        merge(&mut book.title, self.title);
        merge(&mut book.authors, self.authors);
        merge(&mut book.average_rating, self.average_rating);
        merge(&mut book.isbn, self.isbn);
        merge(&mut book.isbn13, self.isbn13);
        merge(&mut book.language_code, self.language_code);
        merge(&mut book.num_pages, self.num_pages);
        merge(&mut book.ratings_count, self.ratings_count);
        merge(&mut book.text_reviews_count, self.text_reviews_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_db::{BookId, NewBook};

    fn stored() -> Book {
        NewBook {
            title: Some("Test".to_string()),
            authors: Some("A. Author".to_string()),
            num_pages: Some(150),
            isbn: Some("0439785960".to_string()),
            ..Default::default()
        }
        .into_book(BookId::generate())
    }

    #[test]
    fn absent_fields_are_preserved() {
        let mut book = stored();
        let original = book.clone();

        let patch: BookPatch = serde_json::from_str(r#"{"num_pages": 160}"#).unwrap();
        patch.apply(&mut book);

        assert_eq!(book.num_pages, Some(160));
        assert_eq!(book.title, original.title);
        assert_eq!(book.authors, original.authors);
        assert_eq!(book.isbn, original.isbn);
        assert_eq!(book.id, original.id);
    }

    #[test]
    fn null_clears_and_zero_is_a_value() {
        let mut book = stored();
        let patch: BookPatch =
            serde_json::from_str(r#"{"isbn": null, "num_pages": 0, "authors": ""}"#).unwrap();
        patch.apply(&mut book);

        assert_eq!(book.isbn, None);
        assert_eq!(book.num_pages, Some(0));
        assert_eq!(book.authors.as_deref(), Some(""));
    }

    #[test]
    fn unknown_fields_and_id_are_ignored() {
        let mut book = stored();
        let id = book.id;
        let patch: BookPatch =
            serde_json::from_str(r#"{"id": "x", "publisher": "Scholastic"}"#).unwrap();
        assert_eq!(patch, BookPatch::default());

        patch.apply(&mut book);
        assert_eq!(book.id, id);
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let result = serde_json::from_str::<BookPatch>(r#"{"num_pages": "many"}"#);
        assert!(result.is_err());
    }
}
