//! CSV discovery and loading for Alert Insights.
//!
//! Turns portal CSV exports into header-keyed [`CsvRow`]s and those rows into
//! [`AlertRecord`]s. Input is raw bytes, so a row with invalid UTF-8 is dropped
//! on its own instead of failing the file. Parsing never fails as a whole:
//! blank lines and rows the CSV reader rejects are skipped.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use insights_core::models::AlertRecord;
use tracing::{debug, warn};

// ── CsvRow ────────────────────────────────────────────────────────────────────

/// One data row keyed by header name, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    cells: IndexMap<String, String>,
}

impl CsvRow {
    /// Cell under `header`, or `None` when the row has no such column.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    /// First non-empty cell among `aliases`.
    pub fn first_present(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias))
            .find(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CsvRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// UTF-8 byte order mark written by some portal exports.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse CSV data with a header row into rows, preserving row order.
///
/// Rows shorter than the header only carry the columns they have; extra
/// trailing cells are ignored. Rows that are not valid UTF-8 are skipped.
pub fn parse_csv(data: impl AsRef<[u8]>) -> Vec<CsvRow> {
    let data = data.as_ref();
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(e) => {
            warn!("Unreadable CSV header row: {}", e);
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0u64;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping malformed CSV row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if is_blank_record(&record) {
            continue;
        }

        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }

    debug!("Parsed {} CSV rows ({} skipped)", rows.len(), skipped);
    rows
}

/// Map a row onto an [`AlertRecord`] using the header alias chains.
pub fn map_to_alert_record(row: &CsvRow) -> AlertRecord {
    AlertRecord::from_lookup(|header| row.get(header))
}

/// Parse alert CSV data straight into records.
pub fn parse_alert_records(data: impl AsRef<[u8]>) -> Vec<AlertRecord> {
    parse_csv(data).iter().map(map_to_alert_record).collect()
}

/// Candidate file names for a numbered export set:
/// `Stem.csv`, `Stem (1).csv`, …, `Stem (count-1).csv`.
pub fn numbered_part_paths(dir: &Path, stem: &str, count: u32) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            if i == 0 {
                dir.join(format!("{}.csv", stem))
            } else {
                dir.join(format!("{} ({}).csv", stem, i))
            }
        })
        .collect()
}

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("CSV directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// A whitespace-only line parses as a single blank cell.
fn is_blank_record(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|cell| cell.trim().is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
