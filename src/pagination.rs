//! Search-results URLs: one base per country, then `_Desde_<offset>_NoIndex_True`
//! pages of 50 entries each.

use std::fmt;

pub const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Brazil,
}

impl Country {
    pub const ALL: [Country; 1] = [Country::Brazil];

    /// Menu number as shown to the operator (1-based).
    pub fn from_menu(option: u32) -> Option<Self> {
        match option {
            1 => Some(Country::Brazil),
            _ => None,
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Country::Brazil => "https://lista.mercadolivre.com.br/",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Country::Brazil => write!(f, "Brasil"),
        }
    }
}

/// `Smart TV 4K` -> `smart-tv-4k`.
pub fn slugify(query: &str) -> String {
    query.trim().replace(' ', "-").to_lowercase()
}

/// First page plus offset pages (51, 101, ...) until `max_pages` URLs exist.
pub fn page_urls(base_url: &str, slug: &str, max_pages: usize) -> Vec<String> {
    (0..max_pages)
        .map(|page| {
            if page == 0 {
                format!("{base_url}{slug}")
            } else {
                let offset = page * PAGE_SIZE + 1;
                format!("{base_url}{slug}_Desde_{offset}_NoIndex_True")
            }
        })
        .collect()
}

/// Default export name for a search: `data/ml_<first 10 chars of slug>.csv`.
pub fn export_stem(slug: &str) -> String {
    let short: String = slug.chars().take(10).collect();
    format!("ml_{short}")
}
