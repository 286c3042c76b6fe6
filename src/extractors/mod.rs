//! Chart extractors
//!
//! One `ChartExtractor` per supported EHR vendor, sharing the record types and
//! event sink in `base`.
//!
//! # Architecture
//!
//! - `base` - records, data-type tags, events, errors and the `ChartExtractor` trait
//! - `manager` - `ExtractorRegistry` and single-frame extraction (`extract_frame`)
//! - Vendor modules (`practice_fusion`)

pub mod base;
pub mod manager;

// Vendor extractors
pub mod practice_fusion;

// Re-export the public API
pub use base::{
    ChartExtractor, DataType, Demographics, EventLog, EventSink, ExtractError, ExtractionEvent,
    IcdCodeRecord, LabRecord, MedicationRecord, MedicationStatus, Severity, TracingSink,
};
pub use manager::{extract_frame, ExtractorRegistry, FrameFailure, FrameReport};
pub use practice_fusion::PracticeFusionExtractor;
