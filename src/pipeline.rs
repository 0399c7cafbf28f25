use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use rayon::ThreadPoolBuildError;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::collector::RecordCollector;
use crate::fetcher::PageFetcher;
use crate::models::{Extraction, ListingRecord, Outcome};
use crate::pagination::{page_urls, slugify};
use crate::parser::{extract_detail_page, extract_listing_page};

/// How product pages of a batch are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One fetch at a time, blocking for `delay` between fetches.
    Sequential { delay: Duration },
    /// A pool of `workers` threads, no pacing. Results keep input order.
    Parallel { workers: usize },
}

/// Walks the result pages of `query` until a page has no listings or
/// `max_pages` pages were visited.
#[instrument(skip(fetcher, base_url, delay))]
pub fn scrape_search<F: PageFetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    query: &str,
    max_pages: usize,
    delay: Duration,
) -> RecordCollector {
    let urls = page_urls(base_url, &slugify(query), max_pages);
    scrape_result_pages(fetcher, &urls, delay)
}

pub fn scrape_result_pages<F: PageFetcher + ?Sized>(
    fetcher: &F,
    urls: &[String],
    delay: Duration,
) -> RecordCollector {
    let mut collector = RecordCollector::new();

    for (i, url) in urls.iter().enumerate() {
        let page = i + 1;
        if i > 0 {
            pause(delay);
        }

        let html = match fetcher.fetch(url) {
            Ok(html) => html,
            Err(e) => {
                warn!(page, timed_out = e.is_timeout(), error = %e, "Result page unavailable");
                collector.push(Extraction::unavailable(url, e.to_string(), now()).record);
                continue;
            }
        };

        let extractions = extract_listing_page(&html, url);
        if extractions.is_empty() {
            info!(page, url = %url, "No listings on page, search finished");
            break;
        }

        info!(page, url = %url, listings = extractions.len(), "Scraping result page");
        for extraction in extractions {
            log_outcome(&extraction);
            collector.push(extraction.record);
        }
    }

    info!(records = collector.len(), "Search scrape done");
    collector
}

/// Fetches and extracts every product page in `urls`. A failed fetch yields an
/// unavailable record for that URL; the batch always produces one record per URL.
#[instrument(skip(fetcher, urls), fields(links = urls.len()))]
pub fn scrape_product_pages<F: PageFetcher + ?Sized>(
    fetcher: &F,
    urls: &[String],
    schedule: Schedule,
) -> Result<RecordCollector, ThreadPoolBuildError> {
    if urls.is_empty() {
        warn!("No links to process");
        return Ok(RecordCollector::new());
    }

    let collector: RecordCollector = match schedule {
        Schedule::Sequential { delay } => {
            let mut collector = RecordCollector::new();
            for (i, url) in urls.iter().enumerate() {
                if i > 0 {
                    pause(delay);
                }
                info!(link = i + 1, total = urls.len(), url = %url, "Processing link");
                collector.push(scrape_product(fetcher, url).record);
            }
            collector
        }
        Schedule::Parallel { workers } => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
            info!(workers, "Processing links in parallel");
            let records: Vec<ListingRecord> = pool.install(|| {
                urls.par_iter()
                    .map(|url| scrape_product(fetcher, url).record)
                    .collect()
            });
            records.into_iter().collect()
        }
    };

    info!(records = collector.len(), "Batch scrape done");
    Ok(collector)
}

fn scrape_product<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Extraction {
    let extraction = match fetcher.fetch(url) {
        Ok(html) => extract_detail_page(&html, url),
        Err(e) => {
            debug!(url, timed_out = e.is_timeout(), "Fetch failed");
            Extraction::unavailable(url, e.to_string(), now())
        }
    };
    log_outcome(&extraction);
    extraction
}

fn log_outcome(extraction: &Extraction) {
    let url = extraction.record.listing_url.as_deref().unwrap_or("-");
    match &extraction.outcome {
        Outcome::Complete => debug!(url, "Extracted listing"),
        Outcome::Partial { missing } => info!(url, ?missing, "Extracted listing with gaps"),
        Outcome::Unavailable { reason } => warn!(url, %reason, "Listing unavailable"),
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
