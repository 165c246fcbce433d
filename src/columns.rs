//! Column mapping for user-laid-out CSV files
//!
//! Tower and CDR exports arrive with arbitrary column orders. The analyst
//! assigns each logical field to a header (or a column index); this module
//! resolves those assignments against the header row and turns data rows
//! into typed records.

use std::collections::HashSet;

use crate::db::{ExtraFields, NewCallEvent, NewTower};
use crate::error::{Error, Result};

/// A column chosen by header text or by zero-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Header(String),
    Index(usize),
}

impl ColumnRef {
    /// Parse a user selection.
    ///
    /// Digits select by index, a negative number means "not selected" and
    /// returns `None`, anything else names a header.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(n) if n < 0 => None,
            Ok(n) => Some(ColumnRef::Index(n as usize)),
            Err(_) => Some(ColumnRef::Header(text.to_string())),
        }
    }

    /// Position of this column in `headers`, if present
    pub fn resolve(&self, headers: &[String]) -> Option<usize> {
        match self {
            ColumnRef::Index(i) => (*i < headers.len()).then_some(*i),
            ColumnRef::Header(name) => headers
                .iter()
                .position(|h| h == name)
                .or_else(|| headers.iter().position(|h| h.trim() == name.trim())),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRef::Header(name) => write!(f, "\"{}\"", name),
            ColumnRef::Index(i) => write!(f, "column {}", i),
        }
    }
}

/// Resolved positions: one per required field (in request order) plus the
/// surviving extra columns keyed by their header text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub required: Vec<usize>,
    pub extra: Vec<(String, usize)>,
}

/// Resolve required-field and extra-field assignments against a header row.
///
/// Every required field must resolve or the whole mapping fails, naming each
/// missing field. Extra columns that collide with a required column, or whose
/// header is blank, are dropped. When two selected columns share a header,
/// the later one supplies the value.
pub fn map_columns(
    headers: &[String],
    required: &[(&str, Option<&ColumnRef>)],
    extra: &[ColumnRef],
) -> Result<ColumnMap> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for (name, assignment) in required {
        match assignment.and_then(|c| c.resolve(headers)) {
            Some(i) => indices.push(i),
            None => missing.push(*name),
        }
    }

    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )));
    }

    let known: HashSet<usize> = indices.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut names = HashSet::new();
    let mut extra_columns = Vec::new();

    for column in extra {
        let index = column.resolve(headers).ok_or_else(|| {
            Error::Validation(format!("extra field {} is not in the header row", column))
        })?;
        let header = &headers[index];
        if known.contains(&index) || header.trim().is_empty() || !seen.insert(index) {
            log::debug!("Dropping extra field {} (index {})", column, index);
            continue;
        }
        if !names.insert(header.as_str()) {
            log::warn!(
                "Extra field header {:?} repeats at index {}; its value replaces the earlier column",
                header,
                index
            );
        }
        extra_columns.push((header.clone(), index));
    }

    Ok(ColumnMap {
        required: indices,
        extra: extra_columns,
    })
}

fn optional_index(
    headers: &[String],
    name: &str,
    assignment: Option<&ColumnRef>,
) -> Result<Option<usize>> {
    match assignment {
        None => Ok(None),
        Some(column) => column.resolve(headers).map(Some).ok_or_else(|| {
            Error::Validation(format!("{} column {} is not in the header row", name, column))
        }),
    }
}

fn check_width<S: AsRef<str>>(row: &[S], width: usize) -> Result<()> {
    if row.len() < width {
        return Err(Error::Validation(format!(
            "row has {} column(s), expected at least {}",
            row.len(),
            width
        )));
    }
    Ok(())
}

fn cell<S: AsRef<str>>(row: &[S], index: usize) -> String {
    row[index].as_ref().to_string()
}

// ============================================================================
// Towers
// ============================================================================

/// Analyst's column choices for a tower file
#[derive(Debug, Clone, Default)]
pub struct TowerMapping {
    pub cell_site: Option<ColumnRef>,
    pub latitude: Option<ColumnRef>,
    pub longitude: Option<ColumnRef>,
    pub sector: Option<ColumnRef>,
    pub azimuth: Option<ColumnRef>,
}

impl TowerMapping {
    pub fn resolve(&self, headers: &[String]) -> Result<TowerColumns> {
        let map = map_columns(
            headers,
            &[
                ("cell site", self.cell_site.as_ref()),
                ("latitude", self.latitude.as_ref()),
                ("longitude", self.longitude.as_ref()),
                ("sector", self.sector.as_ref()),
                ("azimuth", self.azimuth.as_ref()),
            ],
            &[],
        )?;

        Ok(TowerColumns {
            cell_site: map.required[0],
            latitude: map.required[1],
            longitude: map.required[2],
            sector: map.required[3],
            azimuth: map.required[4],
        })
    }
}

/// Resolved tower column positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerColumns {
    pub cell_site: usize,
    pub latitude: usize,
    pub longitude: usize,
    pub sector: usize,
    pub azimuth: usize,
}

impl TowerColumns {
    fn width(&self) -> usize {
        [self.cell_site, self.latitude, self.longitude, self.sector, self.azimuth]
            .into_iter()
            .max()
            .map_or(0, |m| m + 1)
    }

    pub fn map_row<S: AsRef<str>>(&self, case_id: i64, row: &[S]) -> Result<NewTower> {
        check_width(row, self.width())?;

        let raw_azimuth = row[self.azimuth].as_ref().trim();
        let azimuth = raw_azimuth
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| Error::Validation(format!("invalid azimuth '{}'", raw_azimuth)))?;

        Ok(NewTower {
            case_id,
            cell_site_id: cell(row, self.cell_site),
            sector: cell(row, self.sector),
            latitude: cell(row, self.latitude),
            longitude: cell(row, self.longitude),
            azimuth,
        })
    }
}

// ============================================================================
// CDRs
// ============================================================================

/// Analyst's column choices for a CDR file
#[derive(Debug, Clone, Default)]
pub struct CdrMapping {
    pub called_number: Option<ColumnRef>,
    pub cell_site: Option<ColumnRef>,
    pub sector: Option<ColumnRef>,

    pub calling_number: Option<ColumnRef>,
    pub dialed_digits: Option<ColumnRef>,
    pub direction: Option<ColumnRef>,
    pub start_date: Option<ColumnRef>,
    pub end_date: Option<ColumnRef>,
    pub duration: Option<ColumnRef>,

    /// Columns to carry into the map popup
    pub extra: Vec<ColumnRef>,
}

impl CdrMapping {
    pub fn resolve(&self, headers: &[String]) -> Result<CdrColumns> {
        let map = map_columns(
            headers,
            &[
                ("called number", self.called_number.as_ref()),
                ("cell site", self.cell_site.as_ref()),
                ("sector", self.sector.as_ref()),
            ],
            &self.extra,
        )?;

        Ok(CdrColumns {
            called_number: map.required[0],
            cell_site: map.required[1],
            sector: map.required[2],
            calling_number: optional_index(headers, "calling number", self.calling_number.as_ref())?,
            dialed_digits: optional_index(headers, "dialed digits", self.dialed_digits.as_ref())?,
            direction: optional_index(headers, "direction", self.direction.as_ref())?,
            start_date: optional_index(headers, "start date", self.start_date.as_ref())?,
            end_date: optional_index(headers, "end date", self.end_date.as_ref())?,
            duration: optional_index(headers, "duration", self.duration.as_ref())?,
            extra: map.extra,
        })
    }
}

/// Resolved CDR column positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdrColumns {
    pub called_number: usize,
    pub cell_site: usize,
    pub sector: usize,
    pub calling_number: Option<usize>,
    pub dialed_digits: Option<usize>,
    pub direction: Option<usize>,
    pub start_date: Option<usize>,
    pub end_date: Option<usize>,
    pub duration: Option<usize>,
    pub extra: Vec<(String, usize)>,
}

impl CdrColumns {
    fn width(&self) -> usize {
        let optional = [
            self.calling_number,
            self.dialed_digits,
            self.direction,
            self.start_date,
            self.end_date,
            self.duration,
        ];
        [self.called_number, self.cell_site, self.sector]
            .into_iter()
            .chain(optional.into_iter().flatten())
            .chain(self.extra.iter().map(|(_, i)| *i))
            .max()
            .map_or(0, |m| m + 1)
    }

    pub fn map_row<S: AsRef<str>>(&self, case_id: i64, row: &[S]) -> Result<NewCallEvent> {
        check_width(row, self.width())?;

        let optional = |index: Option<usize>| index.map(|i| cell(row, i)).unwrap_or_default();

        let extra: ExtraFields = self
            .extra
            .iter()
            .map(|(name, i)| (name.clone(), cell(row, *i)))
            .collect();

        Ok(NewCallEvent {
            case_id,
            called_number: cell(row, self.called_number),
            cell_site_id: cell(row, self.cell_site),
            sector: cell(row, self.sector),
            calling_number: optional(self.calling_number),
            dialed_digits: optional(self.dialed_digits),
            direction: optional(self.direction),
            start_date: optional(self.start_date),
            end_date: optional(self.end_date),
            duration: optional(self.duration),
            extra,
        })
    }
}
