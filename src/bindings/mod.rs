// PyO3 Bindings Module
//
// Python surface over the chart extractors. Built only with the `python`
// feature; records are wrapped in read-only PyO3 classes.

mod api;
mod frame_report;
mod records;

// Re-export for lib.rs
pub use api::{
    can_run, extract_frame, extract_frames_batch, extract_icd_codes, extract_labs,
    extract_medications, extract_patient_dob, extract_patient_name, init_logging,
    should_extract_here, supported_vendors,
};
pub use frame_report::PyFrameReport;
pub use records::{PyIcdCodeRecord, PyLabRecord, PyMedicationRecord};
