pub mod filter;
pub mod models;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use shelf_db::BookStore;
use shelf_kernel::{InitCtx, Module};

use routes::{handlers::BooksState, Endpoint, ROUTES};

/// Books module: filtered search and CRUD over the book collection
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>, max_results: usize) -> Self {
        Self {
            state: BooksState::new(store, max_results),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn base_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(seed_path) = &ctx.settings.database.seed_path {
            let existing = self.state.store.count().await?;
            if existing > 0 {
                tracing::info!(
                    module = self.name(),
                    existing,
                    "store already populated; skipping seed"
                );
            } else {
                let seeded = seed_store(self.state.store.as_ref(), seed_path).await?;
                tracing::info!(
                    module = self.name(),
                    seeded,
                    path = %seed_path.display(),
                    "book store seeded"
                );
            }
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            max_results = self.state.max_results,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut paths = serde_json::Map::new();
        for spec in ROUTES {
            let item = paths
                .entry(spec.path.to_string())
                .or_insert_with(|| json!({}));
            item[spec.method.as_str().to_lowercase()] = operation(spec);
        }

        Some(json!({
            "paths": paths,
            "components": {
                "schemas": {
                    "Book": book_schema(true),
                    "NewBook": book_schema(false),
                    "DeleteResponse": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    },
                    "RouteDescription": route_description_schema()
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let stored = self.state.store.count().await?;
        tracing::info!(module = self.name(), stored, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Insert every valid record of the seed file; invalid ones are logged and skipped.
pub async fn seed_store(store: &dyn BookStore, path: &std::path::Path) -> anyhow::Result<usize> {
    let books = shelf_db::load_seed_file(path)
        .with_context(|| format!("failed to load seed data from {}", path.display()))?;

    let mut inserted = 0;
    for (index, book) in books.into_iter().enumerate() {
        match store.insert(book).await {
            Ok(_) => inserted += 1,
            Err(err) if err.is_validation() => {
                tracing::warn!(index, error = %err, "skipping invalid seed record");
            }
            Err(err) => return Err(err).context("record store rejected seed data"),
        }
    }

    Ok(inserted)
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn operation(spec: &routes::RouteSpec) -> Value {
    let book_ref = json!({ "$ref": "#/components/schemas/Book" });
    let book_list = json!({ "type": "array", "items": book_ref });

    let mut parameters: Vec<Value> = spec
        .path
        .split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| {
            json!({
                "name": name,
                "in": "path",
                "required": true,
                "schema": { "type": "string" }
            })
        })
        .collect();

    let query_parameters = spec.query_parameters.iter().map(|p| (p.name, p.description));
    let title_parameter = (spec.endpoint == Endpoint::SearchByTitle)
        .then_some(("title", "Case-insensitive substring of the title"));
    parameters.extend(query_parameters.chain(title_parameter).map(|(name, description)| {
        json!({
            "name": name,
            "in": "query",
            "required": false,
            "description": description,
            "schema": { "type": "string" }
        })
    }));

    let mut responses = serde_json::Map::new();
    match spec.endpoint {
        Endpoint::ListRoutes => {
            responses.insert(
                "200".into(),
                json_response(
                    "Registered routes",
                    json!({
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/RouteDescription" }
                    }),
                ),
            );
        }
        Endpoint::FilterBooks | Endpoint::SearchByTitle => {
            responses.insert("200".into(), json_response("Matching books", book_list));
            responses.insert("400".into(), error_response("Malformed parameter"));
        }
        Endpoint::GetById => {
            responses.insert("200".into(), json_response("The book", book_ref));
            responses.insert("400".into(), error_response("Malformed id"));
            responses.insert("404".into(), error_response("Book not found"));
        }
        Endpoint::Create => {
            responses.insert("201".into(), json_response("Created book", book_ref));
            responses.insert("400".into(), error_response("Invalid request"));
        }
        Endpoint::Update => {
            responses.insert("200".into(), json_response("Updated book", book_ref));
            responses.insert("400".into(), error_response("Invalid request"));
            responses.insert("404".into(), error_response("Book not found"));
        }
        Endpoint::Delete => {
            responses.insert(
                "200".into(),
                json_response(
                    "Deletion confirmation",
                    json!({ "$ref": "#/components/schemas/DeleteResponse" }),
                ),
            );
            responses.insert("400".into(), error_response("Malformed id"));
            responses.insert("404".into(), error_response("Book not found"));
        }
        _ => {
            responses.insert("200".into(), json_response("Matching books", book_list));
            responses.insert("400".into(), error_response("Malformed parameter"));
            responses.insert("404".into(), error_response("No matching books"));
        }
    }
    responses.insert("500".into(), error_response("Internal server error"));

    let mut operation = json!({
        "summary": spec.summary,
        "tags": ["Books"],
        "parameters": parameters,
        "responses": responses,
    });

    if matches!(spec.endpoint, Endpoint::Create | Endpoint::Update) {
        operation["requestBody"] = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/NewBook" }
                }
            }
        });
    }

    operation
}

fn route_description_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": { "type": "string" },
            "methods": { "type": "array", "items": { "type": "string" } },
            "queryParameters": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["name", "description"]
                }
            }
        },
        "required": ["path", "methods"]
    })
}

fn book_schema(with_id: bool) -> Value {
    let mut properties = json!({
        "title": { "type": "string" },
        "authors": { "type": "string" },
        "average_rating": { "type": "number" },
        "isbn": { "type": "string" },
        "isbn13": { "type": "string" },
        "language_code": { "type": "string" },
        "num_pages": { "type": "integer" },
        "ratings_count": { "type": "integer" },
        "text_reviews_count": { "type": "integer" }
    });

    let required = if with_id {
        properties["id"] = json!({ "type": "string", "format": "uuid" });
        json!(["id"])
    } else {
        json!(["title"])
    };

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn BookStore>, max_results: usize) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, max_results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_db::InMemoryBookStore;
    use shelf_kernel::Settings;
    use std::io::Write;

    #[test]
    fn openapi_covers_every_route() {
        let module = BooksModule::new(Arc::new(InMemoryBookStore::new()), 100);
        let spec = module.openapi().unwrap();

        for route in ROUTES {
            let method = route.method.as_str().to_lowercase();
            assert!(
                spec["paths"][route.path][&method].is_object(),
                "missing {} {}",
                method,
                route.path
            );
        }

        let get_by_id = &spec["paths"]["/books/{id}"]["get"];
        assert_eq!(get_by_id["parameters"][0]["name"], "id");
        assert_eq!(get_by_id["parameters"][0]["in"], "path");

        let filter = &spec["paths"]["/filterbooks"]["get"];
        assert_eq!(filter["parameters"].as_array().unwrap().len(), 7);

        let search = &spec["paths"]["/books/"]["get"];
        assert_eq!(search["parameters"][0]["name"], "title");
    }

    #[tokio::test]
    async fn init_seeds_empty_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Harry Potter and the Half-Blood Prince", "num_pages": 652}}, {{"authors": "no title"}}]"#
        )
        .unwrap();

        let store = Arc::new(InMemoryBookStore::new());
        let module = BooksModule::new(store.clone(), 100);

        let mut settings = Settings::default();
        settings.database.seed_path = Some(file.path().to_path_buf());
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        // A populated store is left alone.
        module.init(&ctx).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn init_fails_on_missing_seed_file() {
        let module = BooksModule::new(Arc::new(InMemoryBookStore::new()), 100);
        let mut settings = Settings::default();
        settings.database.seed_path = Some("/no/such/seed.json".into());
        let ctx = InitCtx {
            settings: &settings,
        };

        assert!(module.init(&ctx).await.is_err());
    }
}
