//! Mercado Livre listing scraper: search-result and product pages to normalized
//! records, exported as a `;`-separated snapshot.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod identifier;
pub mod input;
pub mod models;
pub mod pagination;
pub mod parser;
pub mod pipeline;
pub mod price;

pub use collector::RecordCollector;
pub use models::{AdType, Extraction, ListingRecord, Outcome, PageKind};
