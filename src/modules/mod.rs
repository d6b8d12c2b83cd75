pub mod books;

use std::sync::Arc;

use shelf_db::BookStore;
use shelf_kernel::{ModuleRegistry, Settings};

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn BookStore>, settings: &Settings) {
    registry.register(books::create_module(store, settings.books.max_results));
}
