use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::identifier::extract_listing_id;
use crate::price::format_currency;

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const MISSING: &str = "N/A";
const MISSING_PRICE: &str = "NA";
const NO_DISCOUNT: &str = "0%";

/// Which kind of page a record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// One `li` entry of a search-results page.
    Listing,
    /// A full product page.
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdType {
    Premium,
    Classic,
}

impl AdType {
    pub fn as_str(self) -> &'static str {
        match self {
            AdType::Premium => "Premium",
            AdType::Classic => "Classic",
        }
    }
}

/// One listing as captured at `scraped_at`. Absent values stay `None` until
/// the record is rendered with [`ListingRecord::to_row`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub listing_id: Option<String>,
    pub title: Option<String>,
    pub seller_name: Option<String>,
    pub seller_sales_label: Option<String>,
    pub ad_type: Option<AdType>,
    pub price_previous: Option<f64>,
    pub price_current: Option<f64>,
    pub discount_label: Option<String>,
    pub installments_label: Option<String>,
    pub availability_label: Option<String>,
    pub listing_url: Option<String>,
    pub image_url: Option<String>,
    pub scraped_at: NaiveDateTime,
}

impl ListingRecord {
    /// Record with every field absent.
    pub fn empty(scraped_at: NaiveDateTime) -> Self {
        Self {
            listing_id: None,
            title: None,
            seller_name: None,
            seller_sales_label: None,
            ad_type: None,
            price_previous: None,
            price_current: None,
            discount_label: None,
            installments_label: None,
            availability_label: None,
            listing_url: None,
            image_url: None,
            scraped_at,
        }
    }

    /// Stand-in for a page that could not be fetched. Only the URL (and the id
    /// derived from it) is known.
    pub fn unavailable(url: &str, scraped_at: NaiveDateTime) -> Self {
        Self {
            listing_id: extract_listing_id(url),
            listing_url: Some(url.to_string()),
            ..Self::empty(scraped_at)
        }
    }

    pub fn to_row(&self) -> RecordRow {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_else(|| MISSING.to_string())
        }

        RecordRow {
            listing_id: text(&self.listing_id),
            title: text(&self.title),
            seller_name: text(&self.seller_name),
            seller_sales_label: text(&self.seller_sales_label),
            ad_type: self
                .ad_type
                .map_or(MISSING, AdType::as_str)
                .to_string(),
            price_previous: self
                .price_previous
                .map_or_else(|| MISSING.to_string(), format_currency),
            price_current: self
                .price_current
                .map_or_else(|| MISSING_PRICE.to_string(), format_currency),
            discount_label: self
                .discount_label
                .clone()
                .unwrap_or_else(|| NO_DISCOUNT.to_string()),
            installments_label: text(&self.installments_label),
            availability_label: text(&self.availability_label),
            listing_url: text(&self.listing_url),
            image_url: text(&self.image_url),
            scraped_at: self.scraped_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Header of the exported file, in [`RecordRow`] field order.
pub const COLUMNS: [&str; 13] = [
    "listing_id",
    "title",
    "seller_name",
    "seller_sales_label",
    "ad_type",
    "price_previous",
    "price_current",
    "discount_label",
    "installments_label",
    "availability_label",
    "listing_url",
    "image_url",
    "scraped_at",
];

/// Output view of a [`ListingRecord`]: every column filled, sentinels included.
/// Field order is the column order of the exported file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub listing_id: String,
    pub title: String,
    pub seller_name: String,
    pub seller_sales_label: String,
    pub ad_type: String,
    pub price_previous: String,
    pub price_current: String,
    pub discount_label: String,
    pub installments_label: String,
    pub availability_label: String,
    pub listing_url: String,
    pub image_url: String,
    pub scraped_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Complete,
    Partial { missing: Vec<&'static str> },
    Unavailable { reason: String },
}

/// A record together with how well its extraction went.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: ListingRecord,
    pub outcome: Outcome,
}

impl Extraction {
    pub fn unavailable(url: &str, reason: impl Into<String>, scraped_at: NaiveDateTime) -> Self {
        Self {
            record: ListingRecord::unavailable(url, scraped_at),
            outcome: Outcome::Unavailable {
                reason: reason.into(),
            },
        }
    }
}
