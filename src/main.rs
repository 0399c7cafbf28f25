use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ml_listing_scraper::cli::{self, Cli, Command};
use ml_listing_scraper::config::Config;
use ml_listing_scraper::export::export_records;
use ml_listing_scraper::fetcher::HttpFetcher;
use ml_listing_scraper::input::load_links;
use ml_listing_scraper::pagination::{export_stem, slugify};
use ml_listing_scraper::pipeline::{self, Schedule};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ml_listing_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::from_env().context("Failed to load configuration")?;
    cli.apply(&mut cfg).context("Invalid command-line options")?;

    let fetcher =
        HttpFetcher::new(&cfg.user_agent, cfg.timeout).context("Failed to build HTTP client")?;

    let (records, out) = match &cli.command {
        Command::Search { country, query, .. } => {
            let country = cli::resolve_country(*country)?;
            let query = cli::resolve_query(query.clone())?;
            tracing::info!(%country, %query, "Starting search scrape");

            let records = pipeline::scrape_search(
                &fetcher,
                country.base_url(),
                &query,
                cfg.max_pages,
                cfg.page_delay,
            );
            (records, cli.output_path(&export_stem(&slugify(&query))))
        }
        Command::Links { input, parallel, .. } => {
            let links = load_links(input);
            let schedule = if *parallel {
                Schedule::Parallel { workers: cfg.workers }
            } else {
                Schedule::Sequential { delay: cfg.page_delay }
            };

            let records = pipeline::scrape_product_pages(&fetcher, &links, schedule)
                .context("Failed to start worker pool")?;
            (records, cli.output_path("extracted_data"))
        }
    };

    export_records(records.records(), &out, cli.common.format)
        .with_context(|| format!("Failed to export records to {}", out.display()))?;
    println!("Dados exportados para {} com sucesso!", out.display());

    Ok(())
}
