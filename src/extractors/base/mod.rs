// Base types shared by every vendor extractor
//
// Records, data-type tags, the event sink, errors, and the ChartExtractor
// capability trait.

pub mod error;
pub mod events;
pub mod extractor;
pub mod types;

pub use error::ExtractError;
pub use events::{Component, EventLog, EventSink, ExtractionEvent, Severity, TracingSink};
pub use extractor::ChartExtractor;
pub use types::{
    DataType, Demographics, IcdCodeRecord, LabRecord, MedicationRecord, MedicationStatus,
    UnknownDataType, DEFAULT_LAB_STATUS, NOT_AVAILABLE, UNKNOWN,
};
