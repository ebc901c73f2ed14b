mod catalog;
mod inspect;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use petprice_core::{load_sources, AppConfig, TrustPolicy};
use petprice_db::ProductMetadata;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "petprice")]
#[command(about = "Pet-supply price comparison catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build canonical product groups from the store and print them as JSON
    Catalog {
        /// Only include products whose name contains this term
        #[arg(long)]
        search: Option<String>,
    },
    /// Resolve scraped search results for one product and store the offer
    Resolve {
        /// Product the offer belongs to
        #[arg(long)]
        product_id: i64,
        /// Store the candidates were scraped from (e.g. Petz)
        #[arg(long)]
        source: String,
        /// Name of the product being searched for
        #[arg(long)]
        target: String,
        /// Explicit size of the target (e.g. "10,1 kg")
        #[arg(long)]
        weight: Option<String>,
        /// JSON file with the raw search results
        #[arg(long)]
        candidates: PathBuf,
        /// Print the decision without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve a JSON batch of scrape jobs, pausing between items
    ResolveBatch {
        /// JSON file with an array of jobs
        #[arg(long)]
        file: PathBuf,
        /// Print the decisions without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show how a product name is grouped, labelled and sized
    Inspect {
        /// Raw product name
        name: String,
    },
    /// Apply pending database migrations
    Migrate,
    /// Update name, brand or cover image of a stored product
    Metadata {
        /// Product to update
        #[arg(long)]
        product_id: i64,
        /// New product name
        #[arg(long)]
        name: Option<String>,
        /// New brand
        #[arg(long)]
        brand: Option<String>,
        /// New cover image; only http(s) URLs are stored
        #[arg(long)]
        image_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = petprice_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Catalog { search }) => {
            let policy = load_trust_policy(&config)?;
            let pool = petprice_db::connect_pool_from_config(&config).await?;
            catalog::run_catalog(&pool, &policy, search.as_deref()).await?;
        }
        Some(Commands::Resolve {
            product_id,
            source,
            target,
            weight,
            candidates,
            dry_run,
        }) => {
            let job = resolve::ResolveJob {
                product_id,
                source,
                target,
                weight,
                candidates: resolve::read_candidates(&candidates)?,
            };
            resolve::run_resolve(&config, job, dry_run).await?;
        }
        Some(Commands::ResolveBatch { file, dry_run }) => {
            let jobs = resolve::read_jobs(&file)?;
            resolve::run_resolve_batch(&config, jobs, dry_run).await?;
        }
        Some(Commands::Inspect { name }) => {
            let report = inspect::inspect_name(&name);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some(Commands::Migrate) => {
            let pool = petprice_db::connect_pool_from_config(&config).await?;
            let applied = petprice_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
        Some(Commands::Metadata {
            product_id,
            name,
            brand,
            image_url,
        }) => {
            let metadata = ProductMetadata {
                name,
                brand,
                cover_image_url: image_url,
            };
            let pool = petprice_db::connect_pool_from_config(&config).await?;
            petprice_db::upsert_product_metadata(&pool, product_id, &metadata).await?;
            tracing::info!(product_id, "product metadata updated");
        }
        None => println!("petprice: no command given, see --help"),
    }

    Ok(())
}

/// Trust policy from the sources file, or the built-in ranking when the file
/// does not exist.
fn load_trust_policy(config: &AppConfig) -> anyhow::Result<TrustPolicy> {
    if !config.sources_path.exists() {
        tracing::info!(
            path = %config.sources_path.display(),
            "sources file not found; using built-in trusted sources"
        );
        return Ok(TrustPolicy::default());
    }
    Ok(load_sources(&config.sources_path)?.trust_policy())
}
