use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::error::InputError;

pub const LINK_COLUMN: &str = "post link";
/// Column name in files written by this tool's own export.
const EXPORT_LINK_COLUMN: &str = "listing_url";

/// Reads the URL column of a `;`-separated file, skipping blank cells.
pub fn read_links(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let csv_err = |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = [LINK_COLUMN, EXPORT_LINK_COLUMN]
        .iter()
        .find_map(|name| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == *name)
        })
        .ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: LINK_COLUMN,
        })?;

    let mut links = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        if let Some(link) = row.get(column).map(str::trim).filter(|l| !l.is_empty()) {
            links.push(link.to_string());
        }
    }

    Ok(links)
}

/// Like [`read_links`], but a missing or malformed file is reported and
/// treated as an empty batch.
pub fn load_links(path: &Path) -> Vec<String> {
    match read_links(path) {
        Ok(links) => {
            info!(count = links.len(), path = %path.display(), "Read links");
            links
        }
        Err(e) => {
            warn!(error = %e, "No links to process");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_post_link_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        fs::write(
            &path,
            "\u{feff}title;post link\nTV;https://a.com/MLB-1\nSem link; \nFone;https://a.com/MLB-2\n",
        )
        .unwrap();

        assert_eq!(
            read_links(&path).unwrap(),
            ["https://a.com/MLB-1", "https://a.com/MLB-2"]
        );
    }

    #[test]
    fn accepts_own_export_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        fs::write(&path, "listing_id;listing_url\nMLB-1;https://a.com/MLB-1\n").unwrap();

        assert_eq!(read_links(&path).unwrap(), ["https://a.com/MLB-1"]);
    }

    #[test]
    fn missing_file_is_an_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        assert!(matches!(read_links(&path), Err(InputError::NotFound(_))));
        assert!(load_links(&path).is_empty());
    }

    #[test]
    fn missing_column_is_an_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "a;b\n1;2\n").unwrap();

        assert!(matches!(
            read_links(&path),
            Err(InputError::MissingColumn { .. })
        ));
        assert!(load_links(&path).is_empty());
    }
}
