// =============================================================================
// Case Workflow - State Machine for a Full Mapping Run
// =============================================================================
//
// Front ends (CLI today, dialogs elsewhere) collect input step by step. This
// module fixes the order those steps happen in and hands each fully resolved
// input to the core:
//
// ```text
// CollectingCase -> AwaitingTowerFile -> MappingTowerColumns
//   -> AwaitingCdrFile -> MappingCdrColumns -> GeneratingReport -> Done
// ```
//
// A step that fails validation leaves the state unchanged so the caller can
// re-collect that input and try again.

use std::path::{Path, PathBuf};

use crate::columns::{CdrMapping, TowerMapping};
use crate::db::{NewCase, RecordStore};
use crate::error::{Error, Result};
use crate::import::{self, ImportResult};
use crate::report::{ReportCompiler, ReportSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowState {
    /// Waiting for the five case attributes
    CollectingCase,
    /// Case saved; waiting for the tower CSV
    AwaitingTowerFile,
    /// Tower headers read; waiting for column assignments
    MappingTowerColumns,
    /// Towers imported; waiting for the CDR CSV
    AwaitingCdrFile,
    /// CDR headers read; waiting for column assignments
    MappingCdrColumns,
    /// CDRs imported; waiting for an output directory
    GeneratingReport,
    /// Map written
    Done,
}

pub struct Workflow {
    store: RecordStore,
    state: WorkflowState,
    case_id: Option<i64>,
    tower_file: Option<PathBuf>,
    cdr_file: Option<PathBuf>,
}

impl Workflow {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            state: WorkflowState::CollectingCase,
            case_id: None,
            tower_file: None,
            cdr_file: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn case_id(&self) -> Option<i64> {
        self.case_id
    }

    fn expect_state(&self, expected: WorkflowState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "workflow is at {:?}, expected {:?}",
                self.state, expected
            )))
        }
    }

    fn current_case(&self) -> Result<i64> {
        self.case_id
            .ok_or_else(|| Error::Validation("no case has been created".to_string()))
    }

    pub async fn submit_case(&mut self, case: &NewCase) -> Result<i64> {
        self.expect_state(WorkflowState::CollectingCase)?;

        let id = self.store.save_case(case).await?;
        self.case_id = Some(id);
        self.state = WorkflowState::AwaitingTowerFile;
        Ok(id)
    }

    /// Returns the tower file's headers for column selection
    pub fn select_tower_file(&mut self, path: &Path) -> Result<Vec<String>> {
        self.expect_state(WorkflowState::AwaitingTowerFile)?;

        let headers = import::read_csv_headers(path)?;
        self.tower_file = Some(path.to_path_buf());
        self.state = WorkflowState::MappingTowerColumns;
        Ok(headers)
    }

    pub async fn map_tower_columns(&mut self, mapping: &TowerMapping) -> Result<ImportResult> {
        self.expect_state(WorkflowState::MappingTowerColumns)?;
        let case_id = self.current_case()?;
        let path = self
            .tower_file
            .clone()
            .ok_or_else(|| Error::Validation("no tower file selected".to_string()))?;

        let result = import::import_towers(&self.store, case_id, &path, mapping).await?;
        self.state = WorkflowState::AwaitingCdrFile;
        Ok(result)
    }

    /// Returns the CDR file's headers for column selection
    pub fn select_cdr_file(&mut self, path: &Path) -> Result<Vec<String>> {
        self.expect_state(WorkflowState::AwaitingCdrFile)?;

        let headers = import::read_csv_headers(path)?;
        self.cdr_file = Some(path.to_path_buf());
        self.state = WorkflowState::MappingCdrColumns;
        Ok(headers)
    }

    pub async fn map_cdr_columns(&mut self, mapping: &CdrMapping) -> Result<ImportResult> {
        self.expect_state(WorkflowState::MappingCdrColumns)?;
        let case_id = self.current_case()?;
        let path = self
            .cdr_file
            .clone()
            .ok_or_else(|| Error::Validation("no CDR file selected".to_string()))?;

        let result = import::import_cdrs(&self.store, case_id, &path, mapping).await?;
        self.state = WorkflowState::GeneratingReport;
        Ok(result)
    }

    pub async fn generate_report(&mut self, output_dir: &Path) -> Result<ReportSummary> {
        self.expect_state(WorkflowState::GeneratingReport)?;
        let case_id = self.current_case()?;

        let summary = ReportCompiler::new(self.store.clone())
            .generate_report(case_id, output_dir)
            .await?;
        self.state = WorkflowState::Done;
        Ok(summary)
    }
}
