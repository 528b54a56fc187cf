//! WordPress Migration CLI
//!
//! CLI tool for migrating WordPress content into a Sanity dataset.
//! Pedantic lints relaxed for CLI ergonomics.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wp_migrate::{CollectionType, MigrationConfig, MigrationOutcome, Pipeline};

#[derive(Parser)]
#[command(name = "wp-migrate")]
#[command(author = "Aktier.se <dev@aktier.se>")]
#[command(version)]
#[command(about = "Migrate WordPress content into a Sanity dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Settings that override the configuration file.
#[derive(clap::Args, Default)]
struct Overrides {
    /// Collection to migrate (posts, pages, categories, tags, users)
    #[arg(long, global = true)]
    collection: Option<CollectionType>,

    /// Concurrent record transforms per page
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Dry run mode (don't write to destination)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Sanity API token
    #[arg(long, env = "SANITY_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut MigrationConfig) {
        if let Some(collection) = self.collection {
            config.options.collection = collection;
        }
        if let Some(workers) = self.workers {
            config.options.workers = workers;
        }
        if self.dry_run {
            config.options.dry_run = true;
        }
        if let Some(token) = &self.token {
            config.destination.token = Some(token.clone());
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run migration from config file
    Run,

    /// Validate configuration file
    Validate,

    /// Generate example configuration
    Init {
        /// Output file path
        #[arg(short, long, default_value = "migration.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Init { output }) => generate_config(&output),
        Some(Commands::Validate) => validate_config(&require_config(cli.config)?, &cli.overrides),
        Some(Commands::Run) => run_migration(&require_config(cli.config)?, &cli.overrides).await,
        None => {
            // Default: run migration if config provided
            if let Some(config) = cli.config {
                run_migration(&config, &cli.overrides).await
            } else {
                eprintln!("Usage: wp-migrate --config <FILE> or wp-migrate <COMMAND>");
                eprintln!("Try 'wp-migrate --help' for more information.");
                std::process::exit(1);
            }
        }
    }
}

fn require_config(config: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    config.ok_or_else(|| anyhow::anyhow!("--config <FILE> is required"))
}

fn load_config(config_path: &Path, overrides: &Overrides) -> anyhow::Result<MigrationConfig> {
    info!("Loading configuration from {:?}", config_path);

    let mut config = MigrationConfig::from_file(config_path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run_migration(config_path: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(config_path, overrides)?;
    let collection = config.options.collection;

    let pipeline = Pipeline::new(config)?;
    let stats = pipeline.run().await?;

    match &stats.outcome {
        MigrationOutcome::Completed => println!("\nMigration complete: {}", collection),
        MigrationOutcome::AuthorNotFound => {
            println!("\nNo matching author found, nothing migrated")
        }
        MigrationOutcome::Aborted { page, reason } => {
            println!("\nMigration stopped at page {}: {}", page, reason)
        }
    }
    println!("   Pages:      {}", stats.pages);
    println!("   Documents:  {}", stats.documents);
    println!("   Media:      {} cached", stats.cached_media);
    println!("   Duration:   {:.2}s", stats.duration_secs);
    println!("   Throughput: {:.0} docs/sec", stats.throughput());

    if let MigrationOutcome::Aborted { page, .. } = stats.outcome {
        anyhow::bail!("migration aborted at page {}", page);
    }
    Ok(())
}

fn validate_config(config_path: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(config_path, overrides)?;

    println!("Configuration is valid!");
    println!("   Source:      {}", config.source.base_url);
    if config.options.dry_run {
        println!("   Destination: (dry run)");
    } else {
        println!(
            "   Destination: {} / {}",
            config.destination.host(),
            config.destination.dataset
        );
    }
    println!("   Collection:  {}", config.options.collection);
    println!("   Workers:     {}", config.options.workers);

    Ok(())
}

fn generate_config(output: &Path) -> anyhow::Result<()> {
    std::fs::write(output, CONFIG_TEMPLATE)?;
    println!("Generated configuration: {:?}", output);
    println!(
        "   Edit the file and run: wp-migrate run --config {:?}",
        output
    );

    Ok(())
}

const CONFIG_TEMPLATE: &str = r#"# WordPress -> Sanity migration configuration
source:
  base_url: https://example.com/wp-json/wp/v2
  per_page: 100  # WordPress caps this at 100

destination:
  project_id: your-project-id
  dataset: production
  # token: prefer the SANITY_API_TOKEN environment variable
  api_version: "2021-06-07"
  # api_host: http://localhost:3333  # override the API host

options:
  collection: posts  # posts, pages, categories, tags or users
  workers: 5
  image_concurrency: 2
  preseed_media_cache: true
  dry_run: false
  progress: true
  # Restrict posts to one author; the id is tried first, then the names.
  # author:
  #   id: 42
  #   names: ["Editorial", "redaktionen"]
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_template_parses_and_validates_as_dry_run() {
        let mut config: MigrationConfig = serde_yaml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.options.collection, CollectionType::Posts);
        assert_eq!(config.options.workers, 5);

        Overrides {
            collection: Some(CollectionType::Tags),
            dry_run: true,
            ..Overrides::default()
        }
        .apply(&mut config);
        assert_eq!(config.options.collection, CollectionType::Tags);
        assert!(config.validate().is_ok());
    }
}
