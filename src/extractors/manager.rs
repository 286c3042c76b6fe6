//! ExtractorRegistry - vendor lookup and single-frame extraction
//!
//! The registry holds one `ChartExtractor` per supported EHR variant and picks
//! one by markup signature. `extract_frame` runs the gate and every extractor
//! over a single browsing context; merging frames is left to the caller.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ExtractionConfig};
use crate::dom::Document;
use crate::extractors::base::{
    ChartExtractor, Component, DataType, Demographics, EventLog, EventSink, ExtractionEvent,
    IcdCodeRecord, LabRecord, MedicationRecord,
};
use crate::extractors::practice_fusion::PracticeFusionExtractor;

/// Registered chart extractors, in detection order
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ChartExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ExtractorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Every built-in vendor with its default markup profile
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PracticeFusionExtractor::default()));
        registry
    }

    /// Every built-in vendor configured from `config`
    pub fn with_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.register(Box::new(PracticeFusionExtractor::new(config)?));
        Ok(registry)
    }

    /// Add an extractor. A vendor already present is replaced in place.
    pub fn register(&mut self, extractor: Box<dyn ChartExtractor>) {
        match self
            .extractors
            .iter()
            .position(|existing| existing.vendor() == extractor.vendor())
        {
            Some(index) => self.extractors[index] = extractor,
            None => self.extractors.push(extractor),
        }
    }

    /// First extractor whose vendor signature appears in `doc`
    pub fn detect(&self, doc: &Document) -> Option<&dyn ChartExtractor> {
        self.extractors
            .iter()
            .find(|extractor| extractor.matches_markup(doc))
            .map(|extractor| extractor.as_ref())
    }

    /// `detect`, or the first registered extractor when no signature matches.
    /// Frames without chart markup (ads, blank frames) still get an extractor,
    /// whose gate then answers false for every data type.
    pub fn detect_or_default(&self, doc: &Document) -> Option<&dyn ChartExtractor> {
        self.detect(doc)
            .or_else(|| self.extractors.first().map(|extractor| extractor.as_ref()))
    }

    pub fn get(&self, vendor: &str) -> Option<&dyn ChartExtractor> {
        self.extractors
            .iter()
            .find(|extractor| extractor.vendor() == vendor)
            .map(|extractor| extractor.as_ref())
    }

    pub fn vendors(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.vendor()).collect()
    }

    /// Parse `html` and extract one frame with the detected vendor
    pub fn extract_frame_html(&self, html: &str) -> Result<FrameReport, anyhow::Error> {
        let doc = Document::parse(html);
        let extractor = self
            .detect_or_default(&doc)
            .ok_or_else(|| anyhow::anyhow!("No chart extractors registered"))?;
        Ok(extract_frame(extractor, &doc))
    }
}

/// A fatal extraction failure for one data type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameFailure {
    pub data_type: DataType,
    pub message: String,
}

/// Everything one browsing context produced.
///
/// A `None` list means the frame gate said this context is not authoritative
/// for that data type; `Some(vec![])` means it is, and nothing was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub vendor: String,
    pub patient: Demographics,
    pub medications: Option<Vec<MedicationRecord>>,
    pub labs: Option<Vec<LabRecord>>,
    pub icd_codes: Option<Vec<IcdCodeRecord>>,
    pub failures: Vec<FrameFailure>,
    pub events: Vec<ExtractionEvent>,
}

impl FrameReport {
    /// True when no data type failed fatally
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether the gate let `data_type` run in this frame (failed runs included)
    pub fn is_authoritative(&self, data_type: DataType) -> bool {
        let extracted = match data_type {
            DataType::Medications => self.medications.is_some(),
            DataType::Labs => self.labs.is_some(),
            DataType::IcdCodes => self.icd_codes.is_some(),
        };
        extracted || self.failures.iter().any(|f| f.data_type == data_type)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Run the gate and then the matching extractor for every data type
pub fn extract_frame(extractor: &dyn ChartExtractor, doc: &Document) -> FrameReport {
    let log = EventLog::new();
    let mut report = FrameReport {
        vendor: extractor.vendor().to_string(),
        patient: extractor.extract_demographics(doc),
        medications: None,
        labs: None,
        icd_codes: None,
        failures: Vec::new(),
        events: Vec::new(),
    };

    for data_type in DataType::ALL {
        if !extractor.should_extract_here(doc, data_type) {
            log.emit(
                ExtractionEvent::debug(Component::FrameGate, "not authoritative in this frame")
                    .for_data_type(data_type),
            );
            continue;
        }

        match data_type {
            DataType::Medications => match extractor.extract_medications(doc, &log) {
                Ok(records) => report.medications = Some(records),
                Err(e) => report.failures.push(FrameFailure {
                    data_type,
                    message: e.to_string(),
                }),
            },
            DataType::Labs => report.labs = Some(extractor.extract_labs(doc, &log)),
            DataType::IcdCodes => report.icd_codes = Some(extractor.extract_icd_codes(doc, &log)),
        }
    }

    report.events = log.into_events();
    tracing::debug!(
        vendor = %report.vendor,
        failures = report.failures.len(),
        events = report.events.len(),
        "Extracted frame"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;
    use crate::extractors::base::{ExtractError, Severity};
    use crate::extractors::practice_fusion::VENDOR;

    /// Always claims labs and fails medications
    struct BrokenVendor;

    impl ChartExtractor for BrokenVendor {
        fn vendor(&self) -> &'static str {
            "broken"
        }
        fn matches_markup(&self, doc: &Document) -> bool {
            doc.exists(&Selector::parse(".broken-ehr").unwrap())
        }
        fn can_run(&self, _doc: &Document, data_type: DataType) -> bool {
            data_type != DataType::IcdCodes
        }
        fn extract_medications(
            &self,
            _doc: &Document,
            _events: &dyn EventSink,
        ) -> Result<Vec<MedicationRecord>, ExtractError> {
            Err(ExtractError::MissingContainer {
                data_type: DataType::Medications,
                container: "ul".to_string(),
            })
        }
        fn extract_labs(&self, _doc: &Document, _events: &dyn EventSink) -> Vec<LabRecord> {
            Vec::new()
        }
        fn extract_icd_codes(&self, _doc: &Document, _events: &dyn EventSink) -> Vec<IcdCodeRecord> {
            Vec::new()
        }
        fn extract_patient_name(&self, _doc: &Document) -> String {
            "Broken".to_string()
        }
        fn extract_patient_dob(&self, _doc: &Document) -> String {
            "Broken".to_string()
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ExtractorRegistry::with_defaults();
        assert_eq!(registry.vendors(), vec![VENDOR]);

        registry.register(Box::new(BrokenVendor));
        registry.register(Box::new(PracticeFusionExtractor::default()));
        assert_eq!(registry.vendors(), vec![VENDOR, "broken"]);
        assert!(registry.get("broken").is_some());
        assert!(registry.get("epic").is_none());

        let doc = Document::parse(r#"<div class="broken-ehr"></div>"#);
        assert_eq!(registry.detect(&doc).map(|e| e.vendor()), Some("broken"));

        let blank = Document::parse("<p>nothing</p>");
        assert!(registry.detect(&blank).is_none());
        assert_eq!(
            registry.detect_or_default(&blank).map(|e| e.vendor()),
            Some(VENDOR)
        );
        assert!(ExtractorRegistry::new().detect_or_default(&blank).is_none());
    }

    #[test]
    fn test_frame_report_for_chart() {
        let registry = ExtractorRegistry::with_defaults();
        let report = registry
            .extract_frame_html(
                r#"<span data-element="patient-name">Ada Lovelace</span>
                   <div data-element="diagnoses-summary-card">
                     <p data-element="diagnosis-text">(J45.909) Asthma</p>
                     <p data-element="diagnosis-text">no code</p>
                   </div>"#,
            )
            .unwrap();

        assert_eq!(report.vendor, VENDOR);
        assert_eq!(report.patient.patient_name, "Ada Lovelace");
        assert!(report.medications.is_none());
        assert!(report.labs.is_none());
        assert_eq!(report.icd_codes.as_ref().map(Vec::len), Some(1));
        assert!(report.is_complete());
        assert!(report.is_authoritative(DataType::IcdCodes));
        assert!(!report.is_authoritative(DataType::Labs));

        let gate_events = report
            .events
            .iter()
            .filter(|e| e.component == Component::FrameGate)
            .count();
        assert_eq!(gate_events, 2);
        assert!(report
            .events
            .iter()
            .any(|e| e.severity == Severity::Warn && e.component == Component::IcdCodes));
    }

    #[test]
    fn test_fatal_failure_is_recorded() {
        let doc = Document::parse("<div></div>");
        let report = extract_frame(&BrokenVendor, &doc);

        assert!(!report.is_complete());
        assert_eq!(report.failures[0].data_type, DataType::Medications);
        assert!(report.medications.is_none());
        assert!(report.is_authoritative(DataType::Medications));
        assert_eq!(report.labs, Some(Vec::new()));
    }

    #[test]
    fn test_frame_report_json() {
        let registry = ExtractorRegistry::with_defaults();
        let report = registry.extract_frame_html("<p>ad</p>").unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["vendor"], VENDOR);
        assert_eq!(json["patient"]["patientName"], "Unknown");
        assert_eq!(json["patient"]["patientDOB"], "Unknown");
        assert!(json["medications"].is_null());
        assert!(json["icdCodes"].is_null());
        assert_eq!(json["failures"], serde_json::json!([]));
    }

    #[test]
    fn test_with_config_rejects_bad_profile() {
        let config =
            ExtractionConfig::from_json_str(r#"{"profile": {"lab_row": "[x"}}"#).unwrap();
        assert!(ExtractorRegistry::with_config(&config).is_err());
        assert!(ExtractorRegistry::with_config(&ExtractionConfig::default()).is_ok());
    }
}
