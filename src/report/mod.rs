//! Case map generation
//!
//! Joins a case's locatable call events with the tower sectors that served
//! them and writes a single KML document named after the case number.
//!
//! Mapping is best-effort: a call event whose (cell site, sector) has no
//! tower row is logged and left off the map rather than failing the report.

pub mod kml;

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::db::RecordStore;
use crate::error::{Error, Result};

/// Outcome of one report run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub file_name: String,
    pub path: PathBuf,
    pub placemarks: usize,
    /// Call events left off the map because their tower sector was unknown
    pub skipped: usize,
}

/// Keep only ASCII letters, digits and '-' from the case number and append
/// the map extension
pub fn report_file_name(case_number: &str) -> Result<String> {
    let stem: String = case_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if stem.is_empty() {
        return Err(Error::Validation(format!(
            "case number {:?} has no characters usable in a file name",
            case_number
        )));
    }

    Ok(format!("{}.{}", stem, kml::EXTENSION))
}

pub struct ReportCompiler {
    store: RecordStore,
}

impl ReportCompiler {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Write `<output_dir>/<case number>.kml`, replacing any existing file.
    ///
    /// The document is built in a temporary file in `output_dir` and renamed
    /// over the target only once it is complete, so a failed run leaves the
    /// previous map untouched.
    pub async fn generate_report(&self, case_id: i64, output_dir: &Path) -> Result<ReportSummary> {
        let file_name = report_file_name(&self.store.get_case_number(case_id).await?)?;
        let case = self.store.get_case_details(case_id).await?;
        let path = output_dir.join(&file_name);

        log::info!("Generating map for case {} at {}", case.case_number, path.display());

        let staging = NamedTempFile::new_in(output_dir).map_err(|e| Error::io(output_dir, e))?;
        let mut writer = BufWriter::new(staging);

        kml::write_header(&mut writer, &case).map_err(|e| Error::io(&path, e))?;

        let mut placemarks = 0;
        let mut skipped = 0;

        for cdr_id in self.store.list_locatable_call_event_ids(case_id).await? {
            let event = self.store.get_call_event_details(cdr_id, case_id).await?;

            let tower = match self
                .store
                .resolve_tower_location(case_id, &event.cell_site_id, &event.sector)
                .await
            {
                Ok(t) => t,
                Err(e) if e.is_not_found() => {
                    log::warn!(
                        "CDR #{}: no tower for cell site {} sector {}, leaving it off the map",
                        cdr_id,
                        event.cell_site_id,
                        event.sector
                    );
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            kml::write_placemark(&mut writer, &event, &tower).map_err(|e| Error::io(&path, e))?;
            placemarks += 1;
        }

        kml::write_footer(&mut writer).map_err(|e| Error::io(&path, e))?;
        let staging = writer
            .into_inner()
            .map_err(|e| Error::io(&path, e.into_error()))?;
        staging.persist(&path).map_err(|e| Error::io(&path, e.error))?;

        log::info!(
            "Map {} written: {} placemarks, {} skipped",
            file_name,
            placemarks,
            skipped
        );

        Ok(ReportSummary {
            file_name,
            path,
            placemarks,
            skipped,
        })
    }
}
