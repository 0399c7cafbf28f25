use std::sync::LazyLock;

use regex::Regex;

static EXACT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"MLB-.{10}").unwrap());
static LOOSE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"MLB[^#]*").unwrap());

/// Derives the listing key (`MLB-1234567890`) from a listing URL.
///
/// The dashed 14-character form wins; otherwise everything from the first
/// `MLB` up to a `#` fragment marker is taken. `None` when the URL carries no
/// `MLB` marker at all.
pub fn extract_listing_id(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    EXACT_ID
        .find(url)
        .or_else(|| LOOSE_ID.find(url))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_id_is_cut_to_fourteen_chars() {
        let url = "https://produto.mercadolivre.com.br/MLB-1234567890-produto";
        assert_eq!(extract_listing_id(url).as_deref(), Some("MLB-1234567890"));
    }

    #[test]
    fn loose_id_stops_at_fragment() {
        let url = "https://www.mercadolivre.com.br/celular/p/MLB19615324#polycard";
        assert_eq!(extract_listing_id(url).as_deref(), Some("MLB19615324"));
        assert_eq!(
            extract_listing_id("https://x.com/MLB-123#frag").as_deref(),
            Some("MLB-123")
        );
    }

    #[test]
    fn dashed_form_takes_precedence_over_earlier_loose_match() {
        assert_eq!(
            extract_listing_id("https://x.com/MLBU123/MLB-9876543210-item").as_deref(),
            Some("MLB-9876543210")
        );
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(extract_listing_id("https://x.com/no-id-here"), None);
        assert_eq!(extract_listing_id(""), None);
    }
}
