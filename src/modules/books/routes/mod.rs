//! Route table of the books module.
//!
//! `ROUTES` is the single source for router binding, the `/` route listing,
//! the OpenAPI fragment, and the CLI `routes` command.

pub mod handlers;

use axum::{
    handler::Handler,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use serde::Serialize;

use handlers::BooksState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn filter(&self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
        }
    }

    fn bind<H, T>(&self, handler: H) -> MethodRouter<BooksState>
    where
        H: Handler<T, BooksState>,
        T: 'static,
    {
        on(self.filter(), handler)
    }
}

/// Operations exposed by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListRoutes,
    FilterBooks,
    SearchByTitle,
    GetById,
    ByAuthors,
    ByAverageRating,
    PagesAscending,
    PagesDescending,
    ByRatingsCount,
    ByTextReviewsCount,
    ByLanguageCode,
    Create,
    Update,
    Delete,
}

impl Endpoint {
    fn method_router(&self, method: HttpMethod) -> MethodRouter<BooksState> {
        match self {
            Endpoint::ListRoutes => method.bind(handlers::list_routes),
            Endpoint::FilterBooks => method.bind(handlers::filter_books),
            Endpoint::SearchByTitle => method.bind(handlers::search_by_title),
            Endpoint::GetById => method.bind(handlers::get_book),
            Endpoint::ByAuthors => method.bind(handlers::by_authors),
            Endpoint::ByAverageRating => method.bind(handlers::by_average_rating),
            Endpoint::PagesAscending => method.bind(handlers::pages_ascending),
            Endpoint::PagesDescending => method.bind(handlers::pages_descending),
            Endpoint::ByRatingsCount => method.bind(handlers::by_ratings_count),
            Endpoint::ByTextReviewsCount => method.bind(handlers::by_text_reviews_count),
            Endpoint::ByLanguageCode => method.bind(handlers::by_language_code),
            Endpoint::Create => method.bind(handlers::create_book),
            Endpoint::Update => method.bind(handlers::update_book),
            Endpoint::Delete => method.bind(handlers::delete_book),
        }
    }
}

/// Documentation of one query-string parameter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QueryParameter {
    pub name: &'static str,
    pub description: &'static str,
}

/// One registered route.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub endpoint: Endpoint,
    pub method: HttpMethod,
    pub path: &'static str,
    pub summary: &'static str,
    pub query_parameters: &'static [QueryParameter],
}

/// Entry of the `/` route listing.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDescription {
    pub path: &'static str,
    pub methods: Vec<&'static str>,
    #[serde(rename = "queryParameters", skip_serializing_if = "Option::is_none")]
    pub query_parameters: Option<&'static [QueryParameter]>,
}

const FILTER_PARAMETERS: &[QueryParameter] = &[
    QueryParameter {
        name: "title",
        description: "Filter by title. Example: /filterbooks?title=Neither Here nor There: Travels in Europe. Can be chained with other parameters. Example: /filterbooks?title=Neither Here nor There: Travels in Europe&language_code=eng",
    },
    QueryParameter {
        name: "authors",
        description: "Filter by authors. Example: /filterbooks?authors=bill. Can be chained with other parameters. Example: /filterbooks?authors=bill&average_rating=3",
    },
    QueryParameter {
        name: "average_rating",
        description: "Filter by average rating. Example: /filterbooks?average_rating=3. Can be chained with other parameters. Example: /filterbooks?average_rating=3&num_pages=200",
    },
    QueryParameter {
        name: "num_pages",
        description: "Filter by number of pages. Example: /filterbooks?num_pages=200. Can be chained with other parameters. Example: /filterbooks?num_pages=200&ratings_count=1000&text_reviews_count=200",
    },
    QueryParameter {
        name: "ratings_count",
        description: "Filter by ratings count. Example: /filterbooks?ratings_count=1000. Can be chained with other parameters. Example: /filterbooks?ratings_count=1000&text_reviews_count=200",
    },
    QueryParameter {
        name: "text_reviews_count",
        description: "Filter by text reviews count. Example: /filterbooks?text_reviews_count=200. Can be chained with other parameters. Example: /filterbooks?text_reviews_count=200&language_code=eng&average_rating=4",
    },
    QueryParameter {
        name: "language_code",
        description: "Filter by language code. Example: /filterbooks?language_code=eng. Can be chained with other parameters. Example: /filterbooks?language_code=eng&average_rating=4",
    },
];

const fn route(
    endpoint: Endpoint,
    method: HttpMethod,
    path: &'static str,
    summary: &'static str,
) -> RouteSpec {
    RouteSpec {
        endpoint,
        method,
        path,
        summary,
        query_parameters: &[],
    }
}

pub const ROUTES: &[RouteSpec] = &[
    route(Endpoint::ListRoutes, HttpMethod::Get, "/", "List routes"),
    RouteSpec {
        query_parameters: FILTER_PARAMETERS,
        ..route(
            Endpoint::FilterBooks,
            HttpMethod::Get,
            "/filterbooks",
            "Filter books by any combination of fields",
        )
    },
    route(
        Endpoint::SearchByTitle,
        HttpMethod::Get,
        "/books/",
        "Search books by title",
    ),
    route(
        Endpoint::GetById,
        HttpMethod::Get,
        "/books/{id}",
        "Get a book by id",
    ),
    route(
        Endpoint::ByAuthors,
        HttpMethod::Get,
        "/books/authors/{authors}",
        "Find books by author",
    ),
    route(
        Endpoint::ByAverageRating,
        HttpMethod::Get,
        "/books/average_rating/{average_rating}",
        "Find books by average rating",
    ),
    route(
        Endpoint::PagesAscending,
        HttpMethod::Get,
        "/books/pages_asc/{num_pages}",
        "Find books by page count, ascending",
    ),
    route(
        Endpoint::PagesDescending,
        HttpMethod::Get,
        "/books/pages_desc/{num_pages}",
        "Find books by page count, descending",
    ),
    route(
        Endpoint::ByRatingsCount,
        HttpMethod::Get,
        "/books/ratings_count/{ratings_count}",
        "Find books by ratings count",
    ),
    route(
        Endpoint::ByTextReviewsCount,
        HttpMethod::Get,
        "/books/text_reviews_count/{text_reviews_count}",
        "Find books by text reviews count",
    ),
    route(
        Endpoint::ByLanguageCode,
        HttpMethod::Get,
        "/books/language_code/{language_code}",
        "Find books by language code",
    ),
    route(Endpoint::Create, HttpMethod::Post, "/books/add/", "Add a book"),
    route(
        Endpoint::Update,
        HttpMethod::Put,
        "/books/update/{id}",
        "Update a book",
    ),
    route(
        Endpoint::Delete,
        HttpMethod::Delete,
        "/books/delete/{id}",
        "Delete a book",
    ),
];

/// Describe every route; only routes with documented query parameters carry them.
pub fn describe_routes() -> Vec<RouteDescription> {
    ROUTES
        .iter()
        .map(|spec| RouteDescription {
            path: spec.path,
            methods: vec![spec.method.as_str()],
            query_parameters: (!spec.query_parameters.is_empty()).then_some(spec.query_parameters),
        })
        .collect()
}

/// Bind every route of the table to its handler.
pub fn router(state: BooksState) -> Router {
    ROUTES
        .iter()
        .fold(Router::new(), |router, spec| {
            router.route(spec.path, spec.endpoint.method_router(spec.method))
        })
        .with_state(state)
}
