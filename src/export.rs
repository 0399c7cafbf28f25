use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::error::ExportError;
use crate::models::{COLUMNS, ListingRecord, RecordRow};

const BOM: &[u8] = "\u{feff}".as_bytes();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `;`-separated, UTF-8 with BOM.
    #[default]
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Writes all records to `path` in one go, replacing any existing file.
pub fn export_records(
    records: &[ListingRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let rows: Vec<RecordRow> = records.iter().map(ListingRecord::to_row).collect();
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);

    match format {
        OutputFormat::Csv => {
            out.write_all(BOM).map_err(io_err)?;
            let mut wtr = WriterBuilder::new()
                .delimiter(b';')
                .has_headers(false)
                .from_writer(out);
            wtr.write_record(COLUMNS)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush().map_err(io_err)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &rows)?;
            out.flush().map_err(io_err)?;
        }
    }

    info!(rows = rows.len(), path = %path.display(), "Exported records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(title: &str) -> ListingRecord {
        let at = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        ListingRecord {
            title: Some(title.to_string()),
            price_previous: Some(1234.5),
            price_current: Some(999.0),
            ..ListingRecord::empty(at)
        }
    }

    #[test]
    fn csv_has_bom_header_and_semicolons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("out.csv");

        export_records(&[record("Tv; 50 pol"), record("Fone")], &path, OutputFormat::Csv).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], COLUMNS.join(";"));
        assert_eq!(
            lines[2],
            "N/A;Fone;N/A;N/A;N/A;R$ 1.234,50;R$ 999,00;0%;N/A;N/A;N/A;N/A;31/01/2024 23:59:59"
        );
        assert!(lines[1].starts_with("N/A;\"Tv; 50 pol\";"));
    }

    #[test]
    fn empty_export_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        export_records(&[], &path, OutputFormat::Csv).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_start_matches('\u{feff}').trim_end(), COLUMNS.join(";"));
    }

    #[test]
    fn json_archive_holds_rendered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        export_records(&[record("Fone")], &path, OutputFormat::Json).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let rows: Vec<RecordRow> = serde_json::from_str(&text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Fone");
        assert_eq!(rows[0].price_current, "R$ 999,00");
        assert_eq!(rows[0].ad_type, "N/A");
    }
}
