use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::config::Config;
use crate::export::OutputFormat;
use crate::pagination::Country;

pub const DEFAULT_LINKS_FILE: &str = "data/ml_links.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "data";

#[derive(Debug, Parser)]
#[command(
    name = "ml_listing_scraper",
    version,
    about = "Collects Mercado Livre listings (search results or product pages) into a CSV snapshot"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Output file (defaults depend on the command)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub out: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Pause between sequential fetches
    #[arg(long, global = true, value_name = "MS")]
    pub delay_ms: Option<u64>,

    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the search-result pages of a product query
    Search {
        /// Country number from the menu (1 = Brasil); asked interactively when omitted
        #[arg(long, value_name = "N")]
        country: Option<u32>,

        /// Product query; asked interactively when omitted
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,
    },
    /// Scrape the product pages listed in a `;`-separated file with a `post link` column
    Links {
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_LINKS_FILE)]
        input: PathBuf,

        /// Fetch on a worker pool instead of one page at a time
        #[arg(long)]
        parallel: bool,

        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },
}

impl Cli {
    /// Applies flag overrides on top of the environment configuration.
    pub fn apply(&self, cfg: &mut Config) -> anyhow::Result<()> {
        if let Some(ms) = self.common.delay_ms {
            cfg.page_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.common.timeout_secs {
            cfg.timeout = Duration::from_secs(secs);
        }
        match &self.command {
            Command::Search { max_pages: Some(n), .. } => cfg.max_pages = *n,
            Command::Links { workers: Some(n), .. } => cfg.workers = *n,
            _ => {}
        }
        cfg.validate()
    }

    pub fn output_path(&self, stem: &str) -> PathBuf {
        self.common.out.clone().unwrap_or_else(|| {
            let ext = self.common.format.extension();
            PathBuf::from(DEFAULT_OUTPUT_DIR).join(format!("{stem}.{ext}"))
        })
    }
}

pub fn resolve_country(option: Option<u32>) -> anyhow::Result<Country> {
    match option {
        Some(n) => Country::from_menu(n)
            .ok_or_else(|| anyhow!("Escolha um número válido: {n} não é um país disponível")),
        None => prompt_country(),
    }
}

pub fn resolve_query(query: Option<String>) -> anyhow::Result<String> {
    match query.filter(|q| !q.trim().is_empty()) {
        Some(q) => Ok(q),
        None => prompt_query(),
    }
}

fn prompt_country() -> anyhow::Result<Country> {
    let labels: Vec<String> = Country::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Escolha o país")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Country::ALL[idx])
}

fn prompt_query() -> anyhow::Result<String> {
    let query: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Digite o produto")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Digite um produto")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(query)
}
