// Record types for the case, tower and CDR relations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Case attributes as collected from the analyst
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCase {
    pub case_number: String,
    pub agency: String,
    pub agent: String,
    pub analyst: String,
    pub target_number: String,
}

impl NewCase {
    /// All five attributes are required and must contain more than whitespace
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("case number", &self.case_number),
            ("agency", &self.agency),
            ("agent", &self.agent),
            ("analyst", &self.analyst),
            ("target number", &self.target_number),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "missing required case field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Stored case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    pub id: i64,
    pub case_number: String,
    pub agency: String,
    pub agent: String,
    pub analyst: String,
    pub target_number: String,
}

/// One antenna sector row from a tower import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTower {
    pub case_id: i64,
    pub cell_site_id: String,
    pub sector: String,
    pub latitude: String,
    pub longitude: String,
    pub azimuth: f64,
}

/// Resolved position and bearing of a tower sector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerLocation {
    pub latitude: String,
    pub longitude: String,
    pub azimuth: f64,
}

/// Columns the analyst picked for the map popup, keyed by header text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraFields(BTreeMap<String, String>);

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Blob form stored in `cdrs.extra_fields`
    pub fn to_blob(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn from_blob(blob: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(blob)?))
    }
}

impl FromIterator<(String, String)> for ExtraFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Call detail record as produced by the column mapper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewCallEvent {
    pub case_id: i64,
    pub called_number: String,
    pub cell_site_id: String,
    pub sector: String,

    // Optional known fields, '' when no column was selected
    pub calling_number: String,
    pub dialed_digits: String,
    pub direction: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,

    pub extra: ExtraFields,
}

/// Stored call detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEvent {
    pub id: i64,
    pub case_id: i64,
    pub called_number: String,
    pub cell_site_id: String,
    pub sector: String,
    pub calling_number: String,
    pub dialed_digits: String,
    pub direction: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub extra: ExtraFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> NewCase {
        NewCase {
            case_number: "ABC-123".to_string(),
            agency: "County SO".to_string(),
            agent: "Det. Rivera".to_string(),
            analyst: "J. Park".to_string(),
            target_number: "5550001111".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_case() {
        assert!(sample_case().validate().is_ok());
    }

    #[test]
    fn test_validate_names_missing_fields() {
        let mut case = sample_case();
        case.agency = "   ".to_string();
        case.target_number = String::new();

        match case.validate() {
            Err(Error::Validation(msg)) => {
                assert!(msg.contains("agency"));
                assert!(msg.contains("target number"));
                assert!(!msg.contains("analyst"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_fields_blob() {
        let mut extra = ExtraFields::new();
        extra.insert("Duration", "00:01:05");
        extra.insert("Direction", "MO");
        extra.insert("Note", "has \"quotes\", commas & <tags>");

        let blob = extra.to_blob().unwrap();
        let back = ExtraFields::from_blob(&blob).unwrap();
        assert_eq!(back, extra);
        assert_eq!(back.len(), 3);

        assert!(ExtraFields::from_blob("{}").unwrap().is_empty());
    }

    #[test]
    fn test_extra_fields_corrupt_blob() {
        let err = ExtraFields::from_blob("{\"Duration\":").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
