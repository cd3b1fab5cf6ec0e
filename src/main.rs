use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ex_search::config::LoggingConfig;
use ex_search::models::{PreviewRequest, PreviewResponse};
use ex_search::url_generator::generate_target_urls;
use ex_search::{download_config_template, ApiFetcher, AppConfig, SearchManager, StaticCatalog};

#[derive(Parser)]
#[command(name = "ex-search", about = "Preview label and product page scraping configs", version)]
struct Cli {
    /// Catalog JSON file; overrides `catalog.path` from the config.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the search URLs generated for keywords.
    Urls {
        #[arg(long)]
        base_url: String,
        /// Query parameter name.
        #[arg(long)]
        query: String,
        #[arg(long, default_value = "utf-8")]
        encoding: String,
        keywords: Vec<String>,
    },

    /// Find the product page config responsible for a URL.
    Resolve { url: String },

    /// Fetch a batch of URLs with a saved or submitted config.
    Preview(PreviewArgs),

    /// Search one keyword through a saved label.
    Search { label_id: i64, keyword: String },

    /// Print an example download config.
    Template {
        /// Download type: nodriver, selenium, httpx or empty.
        #[arg(default_value = "")]
        option_type: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PreviewSelector {
    /// Saved label id.
    #[arg(long)]
    label: Option<i64>,
    /// Saved product page id.
    #[arg(long)]
    product_page: Option<i64>,
    /// JSON file holding a complete preview request.
    #[arg(long)]
    request: Option<PathBuf>,
}

#[derive(Args)]
struct PreviewArgs {
    #[command(flatten)]
    selector: PreviewSelector,
    /// Keyword to expand through the label (repeatable).
    #[arg(long = "keyword")]
    keywords: Vec<String>,
    /// Target URL (repeatable).
    #[arg(long = "url")]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging)?;

    info!("Starting ex-search");

    match cli.command {
        Commands::Urls {
            base_url,
            query,
            encoding,
            keywords,
        } => print_json(&generate_target_urls(&base_url, &query, &keywords, &encoding)?),
        Commands::Template { option_type } => {
            print_json(&download_config_template(&option_type)?)
        }
        Commands::Resolve { url } => {
            let manager = build_manager(cli.catalog, &config).await?;
            match manager.resolve_url(&url).await? {
                Some(page) => print_json(&page),
                None => bail!("No product page config matches {}", url),
            }
        }
        Commands::Search { label_id, keyword } => {
            let manager = build_manager(cli.catalog, &config).await?;
            print_json(&manager.search_by_label(label_id, &keyword).await?)
        }
        Commands::Preview(args) => {
            let manager = build_manager(cli.catalog, &config).await?;
            print_json(&preview(&manager, args).await?)
        }
    }
}

async fn build_manager(catalog: Option<PathBuf>, config: &AppConfig) -> Result<SearchManager> {
    let catalog_path = catalog.or_else(|| config.catalog.path.as_ref().map(PathBuf::from));
    let catalog = match catalog_path {
        Some(path) => StaticCatalog::load(&path)
            .await
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => {
            warn!("No catalog configured, saved configs are unavailable");
            StaticCatalog::default()
        }
    };
    let fetcher = ApiFetcher::new(config.api.clone())?;
    Ok(SearchManager::new(Arc::new(fetcher), Arc::new(catalog)))
}

async fn preview(manager: &SearchManager, args: PreviewArgs) -> Result<PreviewResponse> {
    let PreviewArgs {
        selector,
        keywords,
        urls,
    } = args;

    if let Some(id) = selector.label {
        return Ok(manager.preview_label(id, &urls, &keywords).await?);
    }
    if let Some(id) = selector.product_page {
        return Ok(manager.preview_product_page(id, &urls).await?);
    }
    let Some(path) = selector.request else {
        bail!("One of --label, --product-page or --request is required");
    };
    let json = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let request: PreviewRequest = serde_json::from_str(&json)?;
    Ok(manager.preview(&request).await?)
}

fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ex_search={}", logging.level)));

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "ex-search.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to initialise tracing")?;

    Ok(guard)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
