//! Bookshelf application library
//!
//! Wires the record store, the books module, and the HTTP server together.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use shelf_db::{BookStore, InMemoryBookStore};
use shelf_kernel::{InitCtx, ModuleRegistry, Settings};

/// Re-export commonly used types
pub use modules::*;

/// Build a registry with every module bound to `store`
pub fn build_registry(store: Arc<dyn BookStore>, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings);
    registry
}

/// Run the service until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store: Arc<dyn BookStore> = Arc::new(InMemoryBookStore::new());
    let registry = build_registry(store, &settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_modules(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_modules(&ctx)
        .await
        .context("module startup failed")?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry
        .stop_modules()
        .await
        .context("module shutdown failed")?;

    served
}
