// ChartExtractor - the capability set one EHR vendor variant provides
//
// The dispatcher calls the gate once per browsing context and data type, and
// only runs the matching extract_* when the gate answers true.

use std::str::FromStr;

use super::error::ExtractError;
use super::events::EventSink;
use super::types::{DataType, Demographics, IcdCodeRecord, LabRecord, MedicationRecord};
use crate::dom::Document;

pub trait ChartExtractor: Send + Sync {
    /// Registry key, e.g. "practice_fusion"
    fn vendor(&self) -> &'static str;

    /// True when the document carries this vendor's markup signature
    fn matches_markup(&self, doc: &Document) -> bool;

    /// Frame gate: does this context hold authoritative markup for `data_type`?
    /// Must be side-effect free.
    fn can_run(&self, doc: &Document, data_type: DataType) -> bool;

    /// Per-context suppression check used when extraction is broadcast to
    /// every frame. Same rule set as `can_run`.
    fn should_extract_here(&self, doc: &Document, data_type: DataType) -> bool {
        self.can_run(doc, data_type)
    }

    /// `can_run` over a raw tag; unknown tags are never runnable
    fn can_run_tag(&self, doc: &Document, data_type: &str) -> bool {
        DataType::from_str(data_type)
            .map(|data_type| self.can_run(doc, data_type))
            .unwrap_or(false)
    }

    fn should_extract_here_tag(&self, doc: &Document, data_type: &str) -> bool {
        DataType::from_str(data_type)
            .map(|data_type| self.should_extract_here(doc, data_type))
            .unwrap_or(false)
    }

    fn extract_medications(
        &self,
        doc: &Document,
        events: &dyn EventSink,
    ) -> Result<Vec<MedicationRecord>, ExtractError>;

    fn extract_labs(&self, doc: &Document, events: &dyn EventSink) -> Vec<LabRecord>;

    fn extract_icd_codes(&self, doc: &Document, events: &dyn EventSink) -> Vec<IcdCodeRecord>;

    fn extract_patient_name(&self, doc: &Document) -> String;

    fn extract_patient_dob(&self, doc: &Document) -> String;

    fn extract_demographics(&self, doc: &Document) -> Demographics {
        Demographics {
            patient_name: self.extract_patient_name(doc),
            patient_dob: self.extract_patient_dob(doc),
        }
    }
}
