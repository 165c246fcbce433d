//! CSV import of tower and CDR files
//!
//! This module handles:
//! - read_csv_headers: Header row for column selection
//! - import_towers: Stream a tower file into the store
//! - import_cdrs: Stream a CDR file into the store
//!
//! Rows are mapped and saved one at a time so large exports are never held
//! in memory. A malformed row is rejected and counted; it never aborts the
//! import and never gets invented values.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::columns::{CdrMapping, TowerMapping};
use crate::db::RecordStore;
use crate::error::{Error, Result};

const MAX_ERROR_MESSAGES: usize = 10;

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Default, Serialize)]
pub struct ImportResult {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
}

impl ImportResult {
    fn record_error(&mut self, message: String) {
        self.errors += 1;
        if self.error_messages.len() < MAX_ERROR_MESSAGES {
            self.error_messages.push(message);
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn headers_of(reader: &mut csv::Reader<File>) -> Result<Vec<String>> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.is_empty() {
        return Err(Error::Validation("file has no header row".to_string()));
    }
    Ok(headers)
}

fn line_of(record: &csv::StringRecord, fallback: usize) -> u64 {
    record
        .position()
        .map(|p| p.line())
        .unwrap_or(fallback as u64)
}

/// Header row of a CSV file, in column order
pub fn read_csv_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = open_reader(path)?;
    headers_of(&mut reader)
}

// ============================================================================
// Imports
// ============================================================================

/// Import every tower sector in `path` into `case_id`.
///
/// Rows repeating an already stored (cell site, sector) pair for the case
/// are skipped with a warning.
pub async fn import_towers(
    store: &RecordStore,
    case_id: i64,
    path: &Path,
    mapping: &TowerMapping,
) -> Result<ImportResult> {
    store.require_case(case_id).await?;

    let mut reader = open_reader(path)?;
    let headers = headers_of(&mut reader)?;
    let columns = mapping.resolve(&headers)?;

    log::info!("Importing towers for case #{} from {}", case_id, path.display());

    let mut result = ImportResult::default();

    for (i, record) in reader.records().enumerate() {
        result.total_rows += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Tower row {} unreadable: {}", i + 2, e);
                result.record_error(format!("row {}: {}", i + 2, e));
                continue;
            }
        };
        let line = line_of(&record, i + 2);
        let row: Vec<&str> = record.iter().collect();

        let tower = match columns.map_row(case_id, row.as_slice()) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Tower row {} rejected: {}", line, e);
                result.record_error(format!("row {}: {}", line, e));
                continue;
            }
        };

        if store
            .tower_exists(case_id, &tower.cell_site_id, &tower.sector)
            .await?
        {
            log::warn!(
                "Tower row {}: cell site {} sector {} already imported, skipping",
                line,
                tower.cell_site_id,
                tower.sector
            );
            result.skipped += 1;
            continue;
        }

        store.save_tower(&tower).await?;
        result.imported += 1;
        log::debug!("Tower row {} saved ({} / {})", line, tower.cell_site_id, tower.sector);
    }

    log::info!(
        "Tower import: {} imported, {} skipped, {} errors",
        result.imported,
        result.skipped,
        result.errors
    );

    Ok(result)
}

/// Import every call detail record in `path` into `case_id`
pub async fn import_cdrs(
    store: &RecordStore,
    case_id: i64,
    path: &Path,
    mapping: &CdrMapping,
) -> Result<ImportResult> {
    store.require_case(case_id).await?;

    let mut reader = open_reader(path)?;
    let headers = headers_of(&mut reader)?;
    let columns = mapping.resolve(&headers)?;

    log::info!(
        "Importing CDRs for case #{} from {} ({} extra field(s))",
        case_id,
        path.display(),
        columns.extra.len()
    );

    let mut result = ImportResult::default();

    for (i, record) in reader.records().enumerate() {
        result.total_rows += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                log::warn!("CDR row {} unreadable: {}", i + 2, e);
                result.record_error(format!("row {}: {}", i + 2, e));
                continue;
            }
        };
        let line = line_of(&record, i + 2);
        let row: Vec<&str> = record.iter().collect();

        match columns.map_row(case_id, row.as_slice()) {
            Ok(event) => {
                store.save_call_event(&event).await?;
                result.imported += 1;
            }
            Err(e) => {
                log::warn!("CDR row {} rejected: {}", line, e);
                result.record_error(format!("row {}: {}", line, e));
            }
        }
    }

    log::info!(
        "CDR import: {} imported, {} errors",
        result.imported,
        result.errors
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnRef;
    use crate::config::StoreConfig;
    use crate::db::NewCase;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn col(name: &str) -> Option<ColumnRef> {
        Some(ColumnRef::Header(name.to_string()))
    }

    async fn store_with_case() -> (RecordStore, i64) {
        let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();
        let case_id = store
            .save_case(&NewCase {
                case_number: "IMP-1".to_string(),
                agency: "Agency".to_string(),
                agent: "Agent".to_string(),
                analyst: "Analyst".to_string(),
                target_number: "5550300".to_string(),
            })
            .await
            .unwrap();
        (store, case_id)
    }

    fn tower_mapping() -> TowerMapping {
        TowerMapping {
            cell_site: col("Site"),
            latitude: col("Lat"),
            longitude: col("Lon"),
            sector: col("Sec"),
            azimuth: col("Az"),
        }
    }

    #[test]
    fn test_read_headers_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "t.csv", "\u{feff}Site,Sec,Lat\nT1,A,1\n");
        assert_eq!(read_csv_headers(&path).unwrap(), vec!["Site", "Sec", "Lat"]);
    }

    #[test]
    fn test_read_headers_missing_file() {
        let err = read_csv_headers(Path::new("/nonexistent/towers.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[tokio::test]
    async fn test_import_towers() {
        let (store, case_id) = store_with_case().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "towers.csv",
            "Az,Site,Sec,Lat,Lon\n\
             90,T1,A,40.0,-73.0\n\
             210,T1,B,40.0,-73.0\n\
             bad,T2,A,41.0,-74.0\n\
             30,T3\n\
             90,T1,A,40.5,-73.5\n",
        );

        let result = import_towers(&store, case_id, &path, &tower_mapping()).await.unwrap();
        assert_eq!(result.total_rows, 5);
        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 2);
        assert_eq!(result.error_messages.len(), 2);

        let location = store.resolve_tower_location(case_id, "T1", "A").await.unwrap();
        assert_eq!(location.latitude, "40.0");
        assert_eq!(location.azimuth, 90.0);
    }

    #[tokio::test]
    async fn test_import_towers_missing_column_fails_before_rows() {
        let (store, case_id) = store_with_case().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "towers.csv", "Site,Lat,Lon,Az\nT1,1,2,3\n");

        let err = import_towers(&store, case_id, &path, &tower_mapping()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.stats().await.unwrap().tower_count, 0);
    }

    #[tokio::test]
    async fn test_import_into_unknown_case() {
        let (store, _) = store_with_case().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "towers.csv", "Site,Sec,Lat,Lon,Az\nT1,A,1,2,3\n");

        let err = import_towers(&store, 999, &path, &tower_mapping()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_import_cdrs_with_extra_fields() {
        let (store, case_id) = store_with_case().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "cdrs.csv",
            "Start,Calling,Called,Cell,Sector,Dur,Notes\n\
             2024-01-05 13:22,5550300,5551234,T1,A,65,\"first, call\"\n\
             2024-01-05 14:00,5550300,5559876,,,12,no location\n\
             2024-01-05 15:10,5550300\n",
        );

        let mapping = CdrMapping {
            called_number: col("Called"),
            cell_site: col("Cell"),
            sector: col("Sector"),
            calling_number: col("Calling"),
            start_date: ColumnRef::parse("0"),
            duration: ColumnRef::parse("-1"),
            extra: vec![
                ColumnRef::Header("Notes".to_string()),
                ColumnRef::Header("Dur".to_string()),
                ColumnRef::Header("Called".to_string()),
            ],
            ..Default::default()
        };

        let result = import_cdrs(&store, case_id, &path, &mapping).await.unwrap();
        assert_eq!(result.total_rows, 3);
        assert_eq!(result.imported, 2);
        assert_eq!(result.errors, 1);

        let ids = store.list_locatable_call_event_ids(case_id).await.unwrap();
        assert_eq!(ids.len(), 1);

        let event = store.get_call_event_details(ids[0], case_id).await.unwrap();
        assert_eq!(event.called_number, "5551234");
        assert_eq!(event.calling_number, "5550300");
        assert_eq!(event.start_date, "2024-01-05 13:22");
        assert_eq!(event.duration, "");
        assert_eq!(event.extra.len(), 2);
        assert_eq!(event.extra.get("Notes"), Some("first, call"));
        assert_eq!(event.extra.get("Dur"), Some("65"));
        assert_eq!(event.extra.get("Called"), None);
    }
}
