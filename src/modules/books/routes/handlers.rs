//! Request handlers of the books module.
//!
//! Every handler converts its failures locally; store errors become 500s with
//! an endpoint-specific message and never escape the request.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use shelf_db::{
    Book, BookId, BookStore, Filter, FindOptions, InvalidBookId, NewBook, NumericField, SortKey,
    SortOrder, StoreError,
};
use shelf_http::error::AppError;

use super::{describe_routes, RouteDescription};
use crate::modules::books::filter::{self, FilterError};
use crate::modules::books::models::{BookPatch, DeleteResponse, FilterBooksQuery, TitleQuery};

const TARGET: &str = "shelf.books";

/// Shared handler state.
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
    /// Cap applied to every list endpoint.
    pub max_results: usize,
}

impl BooksState {
    pub fn new(store: Arc<dyn BookStore>, max_results: usize) -> Self {
        Self { store, max_results }
    }

    fn capped(&self) -> FindOptions {
        FindOptions::new().limit(self.max_results)
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

fn store_failure(err: StoreError) -> AppError {
    tracing::error!(target: TARGET, error = %err, "record store failure");
    AppError::internal("Internal server error")
}

fn parse_id(raw: &str) -> Result<BookId, AppError> {
    raw.parse()
        .map_err(|err: InvalidBookId| AppError::bad_request(format!("Invalid ID: {err}")))
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::bad_request(format!("Invalid request: {}", rejection.body_text()))
}

/// Unwrap query parameters, keeping extractor failures in the JSON error shape.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    let Query(params) = query.map_err(|rejection| {
        AppError::bad_request(format!("Invalid query: {}", rejection.body_text()))
    })?;
    Ok(params)
}

fn path_segment(path: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    let Path(segment) = path.map_err(|rejection| {
        AppError::bad_request(format!("Invalid path: {}", rejection.body_text()))
    })?;
    Ok(segment)
}

/// Run a single-field lookup; an empty result is a 404.
async fn find_some(
    state: &BooksState,
    filter: Filter,
    options: FindOptions,
    not_found: &'static str,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state
        .store
        .find(&filter, &options)
        .await
        .map_err(store_failure)?;

    if books.is_empty() {
        return Err(AppError::not_found(not_found));
    }
    Ok(Json(books))
}

/// `GET /`
pub async fn list_routes() -> Json<Vec<RouteDescription>> {
    Json(describe_routes())
}

/// `GET /filterbooks`; an empty result is an empty list.
pub async fn filter_books(
    State(state): State<BooksState>,
    query: Result<Query<FilterBooksQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let query = query_params(query)?;
    let filter = filter::combined_filter(&query)?;
    tracing::debug!(target: TARGET, conditions = filter.conditions().len(), "filtering books");

    let books = state
        .store
        .find(&filter, &state.capped())
        .await
        .map_err(store_failure)?;
    Ok(Json(books))
}

/// `GET /books/?title=`; sorted by title, an empty result is an empty list.
pub async fn search_by_title(
    State(state): State<BooksState>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let query = query_params(query)?;
    let filter = filter::title_filter(query.title.as_deref())?;
    let options = state.capped().sort_by(SortKey::Title, SortOrder::Ascending);

    let books = state
        .store
        .find(&filter, &options)
        .await
        .map_err(store_failure)?;
    Ok(Json(books))
}

/// `GET /books/{id}`
pub async fn get_book(
    State(state): State<BooksState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let id = path_segment(id)?;
    let id = parse_id(&id)?;

    match state.store.find_by_id(&id).await.map_err(store_failure)? {
        Some(book) => Ok(Json(book)),
        None => Err(AppError::not_found("ID Not found")),
    }
}

/// `GET /books/authors/{authors}`
pub async fn by_authors(
    State(state): State<BooksState>,
    authors: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let authors = path_segment(authors)?;
    let filter = filter::authors_filter(&authors)?;
    let options = state.capped();
    find_some(&state, filter, options, "Author not found").await
}

/// `GET /books/average_rating/{average_rating}`
pub async fn by_average_rating(
    State(state): State<BooksState>,
    rating: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let rating = path_segment(rating)?;
    let filter = filter::rating_filter(&rating)?;
    let options = state.capped();
    find_some(&state, filter, options, "No results for this rating").await
}

async fn by_pages(
    state: BooksState,
    pages: &str,
    order: SortOrder,
) -> Result<Json<Vec<Book>>, AppError> {
    let filter = filter::count_filter(NumericField::NumPages, pages)?;
    let options = state.capped().sort_by(SortKey::NumPages, order);
    find_some(
        &state,
        filter,
        options,
        "Book with this amount of pages not found",
    )
    .await
}

/// `GET /books/pages_asc/{num_pages}`
pub async fn pages_ascending(
    State(state): State<BooksState>,
    pages: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let pages = path_segment(pages)?;
    by_pages(state, &pages, SortOrder::Ascending).await
}

/// `GET /books/pages_desc/{num_pages}`
pub async fn pages_descending(
    State(state): State<BooksState>,
    pages: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let pages = path_segment(pages)?;
    by_pages(state, &pages, SortOrder::Descending).await
}

/// `GET /books/ratings_count/{ratings_count}`
pub async fn by_ratings_count(
    State(state): State<BooksState>,
    count: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let count = path_segment(count)?;
    let filter = filter::count_filter(NumericField::RatingsCount, &count)?;
    let options = state.capped();
    find_some(&state, filter, options, "Rating count not found").await
}

/// `GET /books/text_reviews_count/{text_reviews_count}`
pub async fn by_text_reviews_count(
    State(state): State<BooksState>,
    count: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let count = path_segment(count)?;
    let filter = filter::count_filter(NumericField::TextReviewsCount, &count)?;
    let options = state.capped();
    find_some(&state, filter, options, "Text reviews not found").await
}

/// `GET /books/language_code/{language_code}`
pub async fn by_language_code(
    State(state): State<BooksState>,
    code: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let code = path_segment(code)?;
    let filter = filter::language_filter(&code);
    let options = state.capped();
    find_some(&state, filter, options, "Language code not found").await
}

/// `POST /books/add/`
pub async fn create_book(
    State(state): State<BooksState>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(new_book) = body.map_err(invalid_body)?;

    match state.store.insert(new_book).await {
        Ok(book) => {
            tracing::info!(target: TARGET, id = %book.id, "book created");
            Ok((StatusCode::CREATED, Json(book)))
        }
        Err(err) if err.is_validation() => {
            Err(AppError::bad_request(format!("Invalid request: {err}")))
        }
        Err(err) => Err(store_failure(err)),
    }
}

/// `PUT /books/update/{id}`
pub async fn update_book(
    State(state): State<BooksState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = path_segment(id)?;
    let id = parse_id(&id)?;
    let Json(patch) = body.map_err(invalid_body)?;

    let updating = |err: StoreError| {
        tracing::error!(target: TARGET, %id, error = %err, "update failed");
        AppError::internal(format!("Error updating book: {err}"))
    };

    let Some(mut book) = state.store.find_by_id(&id).await.map_err(updating)? else {
        return Err(AppError::not_found("Book not found"));
    };

    patch.apply(&mut book);

    match state.store.replace(book).await {
        Ok(Some(book)) => {
            tracing::info!(target: TARGET, %id, "book updated");
            Ok(Json(book))
        }
        Ok(None) => Err(AppError::not_found("Book not found")),
        Err(err) if err.is_validation() => {
            Err(AppError::bad_request(format!("Invalid request: {err}")))
        }
        Err(err) => Err(updating(err)),
    }
}

/// `DELETE /books/delete/{id}`
pub async fn delete_book(
    State(state): State<BooksState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = path_segment(id)?;
    let id = parse_id(&id)?;

    let removed = state.store.delete(&id).await.map_err(|err| {
        tracing::error!(target: TARGET, %id, error = %err, "delete failed");
        AppError::internal(format!("Error deleting book: {err}"))
    })?;

    match removed {
        Some(_) => {
            tracing::info!(target: TARGET, %id, "book deleted");
            Ok(Json(DeleteResponse {
                message: "Book deleted".to_string(),
            }))
        }
        None => Err(AppError::not_found("Book not found")),
    }
}
