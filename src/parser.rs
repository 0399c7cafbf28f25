use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::identifier::extract_listing_id;
use crate::models::{AdType, Extraction, ListingRecord, Outcome, PageKind};
use crate::price::parse_price;

/// Listing sellers are rendered as `Por <name>`.
const SELLER_LABEL_LEN: usize = 4;
const INTEREST_FREE: &str = "sem juros";
const PAUSED: &str = "Anúncio pausado";

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static FRAGMENT: LazyLock<Selector> = LazyLock::new(|| sel("li.ui-search-layout__item"));
static FRACTION: LazyLock<Selector> = LazyLock::new(|| sel("span.andes-money-amount__fraction"));
static CENTS: LazyLock<Selector> = LazyLock::new(|| sel("span.andes-money-amount__cents"));

static SELLER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(vendido por|loja oficial)\s*").unwrap());
static SALES_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^mercadolíder\s\|\s").unwrap());

enum InstallmentRule {
    /// Two badge variants; the positive one marks an interest-free (premium) ad.
    Badges { interest_free: Selector, standard: Selector },
    /// One subtitle block whose wording decides the ad type.
    Subtitle(Selector),
}

struct AvailabilityRule {
    explicit: Selector,
    single: Selector,
    shipping_message: Selector,
}

struct Rules {
    title: Selector,
    seller: Selector,
    seller_sales: Option<Selector>,
    price_previous: Selector,
    price_fraction: Selector,
    price_current: Selector,
    discount: Selector,
    installments: InstallmentRule,
    availability: Option<AvailabilityRule>,
    link: Option<Selector>,
    image: Option<Selector>,
}

static LISTING_RULES: LazyLock<Rules> = LazyLock::new(|| Rules {
    title: sel("h2.poly-box.poly-component__title"),
    seller: sel("span.poly-component__seller"),
    seller_sales: None,
    price_previous: sel(
        "s.andes-money-amount.andes-money-amount--previous.andes-money-amount--cents-comma",
    ),
    price_fraction: sel("span.andes-money-amount__fraction"),
    price_current: sel("span.andes-money-amount.andes-money-amount--cents-superscript"),
    discount: sel("span.andes-money-amount__discount"),
    installments: InstallmentRule::Badges {
        interest_free: sel("span.poly-price__installments.poly-text-positive"),
        standard: sel("span.poly-price__installments.poly-text-primary"),
    },
    availability: None,
    link: Some(sel("a[href]")),
    image: Some(sel("img")),
});

static DETAIL_RULES: LazyLock<Rules> = LazyLock::new(|| Rules {
    title: sel("h1.ui-pdp-title"),
    seller: sel("div.ui-seller-data-header__title-container"),
    seller_sales: Some(sel(
        "p.ui-pdp-color--BLACK.ui-pdp-size--XSMALL.ui-pdp-family--SEMIBOLD.ui-seller-data-status__info-title",
    )),
    price_previous: sel(
        "s.andes-money-amount.ui-pdp-price__part.ui-pdp-price__original-value.andes-money-amount--previous.andes-money-amount--cents-superscript.andes-money-amount--compact",
    ),
    price_fraction: sel("span.andes-money-amount__fraction"),
    price_current: sel(
        "span.andes-money-amount.ui-pdp-price__part.andes-money-amount--cents-superscript.andes-money-amount--compact",
    ),
    discount: sel("span.andes-money-amount__discount"),
    installments: InstallmentRule::Subtitle(sel("div.ui-pdp-price__subtitles")),
    availability: Some(AvailabilityRule {
        explicit: sel("span.ui-pdp-buybox__quantity__available"),
        single: sel("div.ui-pdp-buybox__quantity"),
        shipping_message: sel("div.ui-vip-shipping-message__text"),
    }),
    link: None,
    image: None,
});

/// Turns one listing fragment, or one product page, into a [`ListingRecord`].
///
/// Every lookup is independent: a missing element leaves its field `None` and
/// is reported through [`Outcome::Partial`], never as an error.
pub struct FieldExtractor {
    kind: PageKind,
    rules: &'static Rules,
}

impl FieldExtractor {
    pub fn new(kind: PageKind) -> Self {
        let rules: &'static Rules = match kind {
            PageKind::Listing => &*LISTING_RULES,
            PageKind::Detail => &*DETAIL_RULES,
        };
        Self { kind, rules }
    }

    /// `page_url` resolves relative links; for product pages it is also the
    /// listing URL itself.
    pub fn extract(&self, root: ElementRef<'_>, page_url: Option<&str>) -> Extraction {
        self.extract_at(root, page_url, Local::now().naive_local())
    }

    pub fn extract_at(
        &self,
        root: ElementRef<'_>,
        page_url: Option<&str>,
        scraped_at: NaiveDateTime,
    ) -> Extraction {
        let rules = self.rules;
        let mut record = ListingRecord::empty(scraped_at);

        record.title = first_text(root, &rules.title).map(|t| capitalize(&t));

        record.seller_name = first_text(root, &rules.seller)
            .map(|raw| match self.kind {
                PageKind::Listing => drop_chars(&raw, SELLER_LABEL_LEN),
                PageKind::Detail => strip_prefix(&SELLER_PREFIX, &raw),
            })
            .filter(|s| !s.is_empty())
            .map(|s| capitalize(&s));

        record.seller_sales_label = rules
            .seller_sales
            .as_ref()
            .and_then(|s| first_text(root, s))
            .map(|raw| strip_prefix(&SALES_PREFIX, &raw))
            .filter(|s| !s.is_empty())
            .map(|s| capitalize(&s));

        let current = price_text(root, &rules.price_current);

        // Without a discount there is no struck-through price; the current
        // amount (or failing that, the bare fraction) stands in.
        let previous = price_text(root, &rules.price_previous)
            .or_else(|| current.clone())
            .or_else(|| price_text(root, &rules.price_fraction));
        record.price_previous = Some(previous.as_deref().map_or(0.0, parse_price));

        record.price_current = current.as_deref().map(parse_price);

        record.discount_label = first_text(root, &rules.discount);

        let (installments, ad_type) = installment_terms(root, &rules.installments);
        record.installments_label = installments;
        record.ad_type = ad_type;

        record.availability_label = rules.availability.as_ref().and_then(|a| availability(root, a));

        record.listing_url = match &rules.link {
            Some(link) => root
                .select(link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve(page_url, href)),
            None => page_url.map(str::to_string),
        };
        record.listing_id = record.listing_url.as_deref().and_then(extract_listing_id);

        // Lazy-loaded thumbnails keep a placeholder in `src`.
        record.image_url = rules
            .image
            .as_ref()
            .and_then(|s| root.select(s).next())
            .and_then(|img| {
                let attrs = img.value();
                attrs.attr("data-src").or_else(|| attrs.attr("src"))
            })
            .and_then(|src| resolve(page_url, src));

        let outcome = outcome_of(&record);
        Extraction { record, outcome }
    }
}

/// Search-result entries of a results page, in document order.
pub fn listing_fragments(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.select(&FRAGMENT).collect()
}

/// Parses a search-results page and extracts every entry on it.
pub fn extract_listing_page(html: &str, page_url: &str) -> Vec<Extraction> {
    let doc = Html::parse_document(html);
    let extractor = FieldExtractor::new(PageKind::Listing);

    listing_fragments(&doc)
        .into_iter()
        .map(|fragment| extractor.extract(fragment, Some(page_url)))
        .collect()
}

pub fn extract_detail_page(html: &str, page_url: &str) -> Extraction {
    let doc = Html::parse_document(html);
    FieldExtractor::new(PageKind::Detail).extract(doc.root_element(), Some(page_url))
}

fn installment_terms(
    root: ElementRef<'_>,
    rule: &InstallmentRule,
) -> (Option<String>, Option<AdType>) {
    match rule {
        InstallmentRule::Badges { interest_free, standard } => {
            if let Some(text) = first_text(root, interest_free) {
                (Some(text), Some(AdType::Premium))
            } else if let Some(text) = first_text(root, standard) {
                (Some(text), Some(AdType::Classic))
            } else {
                (None, None)
            }
        }
        InstallmentRule::Subtitle(subtitle) => match first_text(root, subtitle) {
            Some(text) => {
                let ad_type = if text.to_lowercase().contains(INTEREST_FREE) {
                    AdType::Premium
                } else {
                    AdType::Classic
                };
                (Some(text), Some(ad_type))
            }
            None => (None, None),
        },
    }
}

fn availability(root: ElementRef<'_>, rule: &AvailabilityRule) -> Option<String> {
    first_text(root, &rule.explicit)
        .or_else(|| first_text(root, &rule.single))
        .or_else(|| {
            first_text(root, &rule.shipping_message)
                .filter(|t| t.contains(PAUSED))
                .map(|_| PAUSED.to_string())
        })
        .map(|t| t.replace(['(', ')'], "").trim().to_string())
        .filter(|t| !t.is_empty())
}

fn outcome_of(record: &ListingRecord) -> Outcome {
    let mut missing = Vec::new();
    if record.title.is_none() {
        missing.push("title");
    }
    if record.seller_name.is_none() {
        missing.push("seller_name");
    }
    if record.price_current.is_none() {
        missing.push("price_current");
    }
    if record.listing_url.is_none() {
        missing.push("listing_url");
    }

    if missing.is_empty() {
        Outcome::Complete
    } else {
        Outcome::Partial { missing }
    }
}

/// Whitespace-collapsed text of the first match; `None` if absent or blank.
fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = element_text(root.select(selector).next()?);
    (!text.is_empty()).then_some(text)
}

/// Price amounts split the cents into a superscript span with no separator,
/// so the amount is rebuilt as `<fraction>,<cents>` when that markup is present.
fn price_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let el = root.select(selector).next()?;
    match el.select(&FRACTION).next() {
        Some(fraction) => {
            let mut text = element_text(fraction);
            if let Some(cents) = el.select(&CENTS).next() {
                text.push(',');
                text.push_str(&element_text(cents));
            }
            Some(text)
        }
        None => Some(element_text(el)).filter(|t| !t.is_empty()),
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve(base: Option<&str>, link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    match Url::parse(link) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base
            .and_then(|b| Url::parse(b).ok())
            .and_then(|b| b.join(link).ok())
            .map(|url| url.to_string()),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn drop_chars(text: &str, n: usize) -> String {
    text.chars().skip(n).collect::<String>().trim().to_string()
}

fn strip_prefix(prefix: &Regex, text: &str) -> String {
    prefix.replace(text, "").trim().to_string()
}
