//! Extraction configuration
//!
//! The vendor markup is an externally owned, unversioned format, so every
//! structural signature the extractors rely on lives in `MarkupProfile` and
//! can be overridden from JSON without a rebuild. Missing fields keep their
//! defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("markup profile field `{field}` holds an invalid selector: {message}")]
    Selector { field: &'static str, message: String },
}

/// Options for one extractor instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub profile: MarkupProfile,
    /// Run the unit conversion pass over lab rows
    pub convert_units: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            profile: MarkupProfile::default(),
            convert_units: true,
        }
    }
}

impl ExtractionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Structural signatures of the chart markup, as selector strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupProfile {
    /// Present anywhere in a document rendered by this vendor
    pub vendor_signature: String,

    // Medication summary card
    pub medication_card: String,
    pub medication_card_list: String,
    pub medication_card_item: String,
    pub medication_card_name: String,
    pub medication_active_marker: String,
    pub medication_historical_marker: String,

    // Medication print preview
    pub active_print_container: String,
    pub historical_print_container: String,
    pub print_row: String,
    pub print_name: String,
    pub print_sig: String,
    pub print_dose_form: String,
    pub print_date: String,

    // Labs
    pub lab_panel_heading: String,
    pub lab_row: String,
    pub lab_test_name: String,
    pub lab_result: String,
    pub lab_abnormal_icon: String,
    pub lab_reference_range: String,
    pub lab_units: String,
    pub lab_collection_date: String,
    pub lab_status: String,
    pub lab_abnormal_flag: String,

    // Diagnoses
    pub diagnosis_card: String,
    pub diagnosis_item: String,

    // Demographics
    pub patient_name: String,
    pub patient_dob: String,
    pub patient_dob_narrow: String,
}

impl Default for MarkupProfile {
    fn default() -> Self {
        fn s(selector: &str) -> String {
            selector.to_string()
        }

        Self {
            vendor_signature: s(r#"[data-element^="patient-"], [data-element$="-summary-card"], [data-element$="-medications-print"], [data-element^="test-name"]"#),

            medication_card: s(r#"[data-element="medications-summary-card"]"#),
            medication_card_list: s(r#"ul, ol, [data-element="medications-list"]"#),
            medication_card_item: s("li"),
            medication_card_name: s("a"),
            medication_active_marker: s(".active"),
            medication_historical_marker: s(".historical"),

            active_print_container: s(r#"[data-element="active-medications-print"]"#),
            historical_print_container: s(r#"[data-element="historical-medications-print"]"#),
            print_row: s(r#"[data-element="medication-row"]"#),
            print_name: s(r#"[data-element="medication-name"]"#),
            print_sig: s(r#"[data-element="medication-sig"]"#),
            print_dose_form: s(r#"[data-element="medication-strength"]"#),
            print_date: s(r#"[data-element="medication-date"]"#),

            lab_panel_heading: s(r#"[data-element^="test-name"]"#),
            lab_row: s(r#"[data-element^="data-row"]"#),
            lab_test_name: s(r#"[data-element="observation-name"]"#),
            lab_result: s(r#"[data-element="observation-value"]"#),
            lab_abnormal_icon: s(r#"i, svg, [data-element="abnormal-icon"]"#),
            lab_reference_range: s(r#"[data-element="observation-reference-range"]"#),
            lab_units: s(r#"[data-element="observation-units"]"#),
            lab_collection_date: s(r#"[data-element="observation-date"]"#),
            lab_status: s(r#"[data-element="observation-status"]"#),
            lab_abnormal_flag: s(r#"[data-element="observation-flag"]"#),

            diagnosis_card: s(r#"[data-element="diagnoses-summary-card"]"#),
            diagnosis_item: s(r#"[data-element="diagnosis-text"]"#),

            patient_name: s(r#"[data-element="patient-name"]"#),
            patient_dob: s(r#"[data-element="patient-dob"]"#),
            patient_dob_narrow: s(r#".patient-header-narrow [data-element="birth-date"]"#),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ExtractionConfig::from_json_str(
            r#"{"convert_units": false, "profile": {"patient_name": ".banner .name"}}"#,
        )
        .unwrap();
        assert!(!config.convert_units);
        assert_eq!(config.profile.patient_name, ".banner .name");
        assert_eq!(
            config.profile.patient_dob,
            MarkupProfile::default().patient_dob
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = ExtractionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ExtractionConfig::default());
        assert!(config.convert_units);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"profile": {{"lab_row": "tr.observation"}}}}"#).unwrap();

        let config = ExtractionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.profile.lab_row, "tr.observation");
    }

    #[test]
    fn test_missing_file_and_bad_json() {
        let missing = ExtractionConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let bad = ExtractionConfig::from_json_str("{ not json");
        assert!(matches!(bad, Err(ConfigError::Json(_))));
    }
}
