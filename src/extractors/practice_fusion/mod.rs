// Practice Fusion Extractor
//
// Reads medications, labs, diagnoses and the patient header out of a rendered
// Practice Fusion chart. All structural signatures come from the configured
// MarkupProfile.

use once_cell::sync::Lazy;

use crate::config::{ConfigError, ExtractionConfig};
use crate::dom::Document;
use crate::extractors::base::{
    ChartExtractor, DataType, EventSink, ExtractError, IcdCodeRecord, LabRecord, MedicationRecord,
};

// Private modules
mod demographics;
mod gate;
mod helpers;
mod icd;
mod labs;
mod medications;
mod profile;

pub mod conversion;

pub use conversion::{ConversionRule, Transform, UnitConverter, CONVERSION_RULES};

use profile::CompiledProfile;

/// Registry key
pub const VENDOR: &str = "practice_fusion";

static DEFAULT_PROFILE: Lazy<CompiledProfile> = Lazy::new(|| {
    CompiledProfile::compile(&ExtractionConfig::default().profile)
        .expect("default markup profile must compile")
});

#[derive(Debug, Clone)]
pub struct PracticeFusionExtractor {
    profile: CompiledProfile,
    converter: Option<UnitConverter>,
}

impl Default for PracticeFusionExtractor {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.clone(),
            converter: Some(UnitConverter::new()),
        }
    }
}

impl PracticeFusionExtractor {
    /// Build from a config; fails when a profile selector does not parse
    pub fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let profile = CompiledProfile::compile(&config.profile)?;
        Ok(Self {
            profile,
            converter: config.convert_units.then(UnitConverter::new),
        })
    }
}

impl ChartExtractor for PracticeFusionExtractor {
    fn vendor(&self) -> &'static str {
        VENDOR
    }

    fn matches_markup(&self, doc: &Document) -> bool {
        doc.exists(&self.profile.vendor_signature)
    }

    fn can_run(&self, doc: &Document, data_type: DataType) -> bool {
        gate::can_run(&self.profile, doc, data_type)
    }

    fn extract_medications(
        &self,
        doc: &Document,
        events: &dyn EventSink,
    ) -> Result<Vec<MedicationRecord>, ExtractError> {
        let records = medications::extract(&self.profile, doc, events)?;
        tracing::debug!("Extracted {} medications", records.len());
        Ok(records)
    }

    fn extract_labs(&self, doc: &Document, events: &dyn EventSink) -> Vec<LabRecord> {
        let records = labs::extract(&self.profile, doc, events, self.converter.as_ref());
        tracing::debug!("Extracted {} lab results", records.len());
        records
    }

    fn extract_icd_codes(&self, doc: &Document, events: &dyn EventSink) -> Vec<IcdCodeRecord> {
        let records = icd::extract(&self.profile, doc, events);
        tracing::debug!("Extracted {} ICD codes", records.len());
        records
    }

    fn extract_patient_name(&self, doc: &Document) -> String {
        demographics::patient_name(&self.profile, doc)
    }

    fn extract_patient_dob(&self, doc: &Document) -> String {
        demographics::patient_dob(&self.profile, doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{EventLog, MedicationStatus, Severity, UNKNOWN};

    const CHART: &str = r#"
        <html><body>
          <div class="patient-header">
            <span data-element="patient-name">John Q. Public</span>
            <span data-element="patient-dob">02/29/1960</span>
          </div>
          <div data-element="medications-summary-card">
            <ul>
              <li class="active"><a href="/meds/lisinopril">Lisinopril</a>10 MG<br>Oral<br>Tablet</li>
            </ul>
          </div>
          <div data-element="diagnoses-summary-card">
            <div data-element="diagnosis-text">(I10) Essential hypertension</div>
          </div>
          <section class="results">
            <h2 data-element="test-name-0">CBC</h2>
            <div data-element="data-row-0">
              <span data-element="observation-name">ABSOLUTE NEUTROPHILS</span>
              <span data-element="observation-value">4500</span>
            </div>
          </section>
        </body></html>
    "#;

    const AD_FRAME: &str = r#"<html><body><div class="banner"><a href="https://ads.example">Sale</a></div></body></html>"#;

    fn doc(html: &str) -> Document {
        Document::parse(html)
    }

    #[test]
    fn test_can_run_equals_should_extract_here() {
        let extractor = PracticeFusionExtractor::default();
        for html in [CHART, AD_FRAME, "", "<div data-element=\"test-name\">x</div>"] {
            let doc = doc(html);
            for data_type in DataType::ALL {
                assert_eq!(
                    extractor.can_run(&doc, data_type),
                    extractor.should_extract_here(&doc, data_type)
                );
            }
            for tag in ["medications", "labs", "icdcodes", "vitals", ""] {
                assert_eq!(
                    extractor.can_run_tag(&doc, tag),
                    extractor.should_extract_here_tag(&doc, tag)
                );
            }
        }
    }

    #[test]
    fn test_unknown_data_type_is_never_runnable() {
        let extractor = PracticeFusionExtractor::default();
        let doc = doc(CHART);
        assert!(extractor.can_run_tag(&doc, "labs"));
        assert!(!extractor.can_run_tag(&doc, "vitals"));
    }

    #[test]
    fn test_full_chart() {
        let extractor = PracticeFusionExtractor::default();
        let doc = doc(CHART);
        let log = EventLog::new();

        assert!(extractor.matches_markup(&doc));

        let medications = extractor.extract_medications(&doc, &log).unwrap();
        assert_eq!(medications.len(), 1);
        assert_eq!(medications[0].status, MedicationStatus::Active);
        assert_eq!(medications[0].sig, "10 MG Oral Tablet");

        let labs = extractor.extract_labs(&doc, &log);
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].test_name, "CBC - ABSOLUTE NEUTROPHILS");
        assert_eq!(labs[0].result, "4.5");

        let codes = extractor.extract_icd_codes(&doc, &log);
        assert_eq!(codes, vec![IcdCodeRecord::active("I10", "Essential hypertension")]);

        let demographics = extractor.extract_demographics(&doc);
        assert_eq!(demographics.patient_name, "John Q. Public");
        assert_eq!(demographics.patient_dob, "02/29/1960");

        assert!(log.at_least(Severity::Warn).is_empty());
    }

    #[test]
    fn test_ad_frame_yields_nothing() {
        let extractor = PracticeFusionExtractor::default();
        let doc = doc(AD_FRAME);
        let log = EventLog::new();

        assert!(!extractor.matches_markup(&doc));
        assert!(extractor.extract_medications(&doc, &log).unwrap().is_empty());
        assert!(extractor.extract_labs(&doc, &log).is_empty());
        assert!(extractor.extract_icd_codes(&doc, &log).is_empty());
        assert_eq!(extractor.extract_patient_name(&doc), UNKNOWN);
        assert_eq!(extractor.extract_patient_dob(&doc), UNKNOWN);
        assert!(log.is_empty());
    }

    #[test]
    fn test_config_controls_profile_and_conversion() {
        let config = ExtractionConfig::from_json_str(
            r#"{"convert_units": false, "profile": {"patient_name": ".banner a"}}"#,
        )
        .unwrap();
        let extractor = PracticeFusionExtractor::new(&config).unwrap();

        assert_eq!(extractor.extract_patient_name(&doc(AD_FRAME)), "Sale");
        let labs = extractor.extract_labs(&doc(CHART), &EventLog::new());
        assert_eq!(labs[0].result, "4500");
    }

    #[test]
    fn test_deeply_nested_header() {
        let depth = 5_000;
        let markup = format!(
            "{}<span data-element=\"patient-name\">Deep Patient</span>",
            "<div>".repeat(depth)
        );
        let extractor = PracticeFusionExtractor::default();
        assert_eq!(extractor.extract_patient_name(&doc(&markup)), "Deep Patient");
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let config = ExtractionConfig::from_json_str(r#"{"profile": {"diagnosis_item": ""}}"#)
            .unwrap();
        assert!(matches!(
            PracticeFusionExtractor::new(&config),
            Err(ConfigError::Selector {
                field: "diagnosis_item",
                ..
            })
        ));
    }
}
