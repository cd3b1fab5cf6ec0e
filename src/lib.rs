pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod resolver;
pub mod search_manager;
pub mod templates;
pub mod url_generator;
pub mod utils;

// Re-export commonly used types
pub use catalog::{ConfigLookup, StaticCatalog};
pub use config::AppConfig;
pub use fetcher::{ApiFetcher, FetchError, Fetcher};
pub use orchestrator::resolve_and_fetch;
pub use resolver::{find_best_match, PatternResolver};
pub use search_manager::{search_by_label, SearchByLabelResponse, SearchManager};
pub use templates::download_config_template;
pub use url_generator::generate_target_urls;
pub use utils::error::{AppError, Result};
