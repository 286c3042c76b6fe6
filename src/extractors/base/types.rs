// Record types for extracted chart data
//
// Records are detached, serializable values. Field names on the wire follow
// the camelCase shape consumed by the navigation agent and the popup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder for a value the markup does not provide
pub const NOT_AVAILABLE: &str = "N/A";
/// Sentinel returned by the demographics lookups on a miss
pub const UNKNOWN: &str = "Unknown";
/// Lab status when the row carries none
pub const DEFAULT_LAB_STATUS: &str = "Completed";

/// Kinds of data a browsing context may be authoritative for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Medications,
    Labs,
    #[serde(rename = "icdcodes")]
    IcdCodes,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Medications, DataType::Labs, DataType::IcdCodes];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Medications => "medications",
            DataType::Labs => "labs",
            DataType::IcdCodes => "icdcodes",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown data type `{0}`")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medications" => Ok(DataType::Medications),
            "labs" => Ok(DataType::Labs),
            "icdcodes" | "icd_codes" | "icd-codes" => Ok(DataType::IcdCodes),
            _ => Err(UnknownDataType(s.to_string())),
        }
    }
}

/// Medication status. The markup's "historical" label maps to `Discontinued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicationStatus {
    Active,
    Discontinued,
    Unknown,
}

impl MedicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationStatus::Active => "Active",
            MedicationStatus::Discontinued => "Discontinued",
            MedicationStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MedicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    pub drug_name: String,
    pub sig: String,
    pub encounter_date: String,
    pub status: MedicationStatus,
    /// Not present in the markup
    pub provider: String,
    /// Formulation, e.g. "Oral Tablet"
    #[serde(rename = "type")]
    pub form_type: String,
    /// Dose magnitude with unit, e.g. "10 MG"
    pub amount: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabRecord {
    /// "<panel> - <analyte>"
    pub test_name: String,
    pub result: String,
    pub reference_range: String,
    pub units: String,
    pub collection_date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcdCodeRecord {
    pub code: String,
    pub description: String,
    pub date_added: String,
    pub provider: String,
    pub status: String,
}

impl IcdCodeRecord {
    /// The diagnosis card has no per-item status or date; every listed code is active
    pub fn active(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            date_added: String::new(),
            provider: String::new(),
            status: MedicationStatus::Active.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(rename = "patientDOB")]
    pub patient_dob: String,
}

impl Default for Demographics {
    fn default() -> Self {
        Self {
            patient_name: UNKNOWN.to_string(),
            patient_dob: UNKNOWN.to_string(),
        }
    }
}
