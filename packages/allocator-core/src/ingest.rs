//! CSV price-history loading.
//!
//! Turns `Date,Price,Dividend` files into raw observation records. Values are
//! passed through as text; normalization belongs to the return builder.

use crate::returns::{build, BuildOutcome};
use crate::types::RawObservation;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// One asset's raw observations as read from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSource {
    /// Asset identifier (from an `Asset` column, else the file stem)
    pub asset: String,
    pub observations: Vec<RawObservation>,
}

impl AssetSource {
    /// Build the asset's return series.
    pub fn build(&self) -> BuildOutcome {
        build(self.asset.clone(), &self.observations)
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

/// Read observations from CSV data with a header row.
///
/// Headers match case-insensitively: `date`, `price` (or `close`,
/// `adj close`), optional `dividend` and `asset`. `fallback_asset` names the
/// asset when no `asset` cell is filled in.
pub fn read_csv<R: Read>(reader: R, fallback_asset: &str) -> Result<AssetSource> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let date_idx = find_column(&headers, &["date"])
        .ok_or_else(|| Error::Ingest(format!("{fallback_asset}: missing Date column")))?;
    let price_idx = find_column(&headers, &["price", "close", "adj close", "adj_close"])
        .ok_or_else(|| Error::Ingest(format!("{fallback_asset}: missing Price column")))?;
    let dividend_idx = find_column(&headers, &["dividend", "dividends"]);
    let asset_idx = find_column(&headers, &["asset"]);

    let mut asset: Option<String> = None;
    let mut observations = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        if asset.is_none() {
            asset = asset_idx
                .and_then(|idx| record.get(idx))
                .filter(|name| !name.is_empty())
                .map(str::to_string);
        }

        observations.push(RawObservation {
            date: record.get(date_idx).unwrap_or_default().to_string(),
            price: record.get(price_idx).unwrap_or_default().to_string(),
            dividend: dividend_idx
                .and_then(|idx| record.get(idx))
                .map(str::to_string),
        });
    }

    Ok(AssetSource {
        asset: asset.unwrap_or_else(|| fallback_asset.to_string()),
        observations,
    })
}

/// Load one CSV file. The file stem is the fallback asset identifier.
pub fn load_csv(path: impl AsRef<Path>) -> Result<AssetSource> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Ingest(format!("cannot derive asset name from {}", path.display())))?
        .to_string();

    let file = File::open(path)?;
    read_csv(file, &stem)
}

/// List `*.csv` files (any case) in a directory, sorted by name.
pub fn discover_csv_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_basic_csv() {
        let data = "Date,Price,Dividend\n2024-01-02,100,\n2024-01-03,\"1,010.5\",0.3\n";
        let source = read_csv(data.as_bytes(), "spy").unwrap();

        assert_eq!(source.asset, "spy");
        assert_eq!(source.observations.len(), 2);
        assert_eq!(source.observations[1].price, "1,010.5");
        assert_eq!(source.observations[1].dividend.as_deref(), Some("0.3"));
        assert_eq!(source.observations[0].dividend.as_deref(), Some(""));
    }

    #[test]
    fn test_header_aliases_and_bom() {
        let data = "\u{feff}\"date\", CLOSE \n2024-01-02,100\n";
        let source = read_csv(data.as_bytes(), "tlt").unwrap();

        assert_eq!(source.observations[0].price, "100");
        assert_eq!(source.observations[0].dividend, None);
    }

    #[test]
    fn test_asset_column_wins() {
        let data = "Date,Price,Asset\n2024-01-02,100,SHY\n2024-01-03,101,SHY\n";
        let source = read_csv(data.as_bytes(), "ishare1_3").unwrap();
        assert_eq!(source.asset, "SHY");
    }

    #[test]
    fn test_missing_price_column() {
        let data = "Date,Volume\n2024-01-02,100\n";
        let result = read_csv(data.as_bytes(), "x");
        assert!(matches!(result, Err(Error::Ingest(_))));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let data = "Date,Price\n2024-01-02,100\n,\n2024-01-03,101\n";
        let source = read_csv(data.as_bytes(), "x").unwrap();
        assert_eq!(source.observations.len(), 2);
    }

    #[test]
    fn test_load_and_build() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spy.csv");
        fs::write(
            &path,
            "Date,Price,Dividend\n2024年1月3日,'101',\n2024-01-02,100,\n2024-01-04,bad,\n",
        )
        .unwrap();

        let source = load_csv(&path).unwrap();
        assert_eq!(source.asset, "spy");

        let outcome = source.build();
        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_discover_csv_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "Date,Price\n").unwrap();
        fs::write(dir.path().join("a.CSV"), "Date,Price\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = discover_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }
}
