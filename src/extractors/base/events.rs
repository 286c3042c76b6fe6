//! Structured extraction events
//!
//! Row skips, conversion failures and structural mismatches are reported as
//! `ExtractionEvent`s through an `EventSink`, so callers and tests can inspect
//! them instead of scraping log output. Every sink also forwards to `tracing`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::types::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Part of the engine that raised an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    FrameGate,
    Medications,
    Labs,
    UnitConversion,
    IcdCodes,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::FrameGate => "frame_gate",
            Component::Medications => "medications",
            Component::Labs => "labs",
            Component::UnitConversion => "unit_conversion",
            Component::IcdCodes => "icd_codes",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionEvent {
    pub severity: Severity,
    pub component: Component,
    pub data_type: Option<DataType>,
    /// Zero-based position of the row/item within its container, when the
    /// event concerns a single item
    pub item_index: Option<usize>,
    pub message: String,
}

impl ExtractionEvent {
    pub fn new(severity: Severity, component: Component, message: impl Into<String>) -> Self {
        Self {
            severity,
            component,
            data_type: None,
            item_index: None,
            message: message.into(),
        }
    }

    pub fn warn(component: Component, message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, component, message)
    }

    pub fn debug(component: Component, message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, component, message)
    }

    pub fn for_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn at(mut self, item_index: usize) -> Self {
        self.item_index = Some(item_index);
        self
    }

    fn trace(&self) {
        let data_type = self.data_type.map(|d| d.as_str()).unwrap_or("-");
        let index = self.item_index.map(|i| i as i64).unwrap_or(-1);
        match self.severity {
            Severity::Debug => debug!(component = %self.component, data_type, index, "{}", self.message),
            Severity::Info => info!(component = %self.component, data_type, index, "{}", self.message),
            Severity::Warn => warn!(component = %self.component, data_type, index, "{}", self.message),
            Severity::Error => error!(component = %self.component, data_type, index, "{}", self.message),
        }
    }
}

/// Receiver for extraction events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ExtractionEvent);
}

/// Forwards events to `tracing` only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: ExtractionEvent) {
        event.trace();
    }
}

/// Keeps every event in memory (and forwards it to `tracing`)
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ExtractionEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExtractionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn into_events(self) -> Vec<ExtractionEvent> {
        self.events
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events at or above `severity`
    pub fn at_least(&self, severity: Severity) -> Vec<ExtractionEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.severity >= severity)
            .collect()
    }

    pub fn from_component(&self, component: Component) -> Vec<ExtractionEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.component == component)
            .collect()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: ExtractionEvent) {
        event.trace();
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_filters() {
        let log = EventLog::new();
        log.emit(ExtractionEvent::debug(Component::Labs, "blank row").at(0));
        log.emit(
            ExtractionEvent::warn(Component::UnitConversion, "not numeric")
                .for_data_type(DataType::Labs)
                .at(3),
        );

        assert_eq!(log.len(), 2);
        let warnings = log.at_least(Severity::Warn);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item_index, Some(3));
        assert_eq!(warnings[0].data_type, Some(DataType::Labs));
        assert_eq!(log.from_component(Component::Labs).len(), 1);
    }

    #[test]
    fn test_event_serializes_machine_readable() {
        let event = ExtractionEvent::warn(Component::IcdCodes, "no match")
            .for_data_type(DataType::IcdCodes)
            .at(1);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["severity"], "warn");
        assert_eq!(json["component"], "icd_codes");
        assert_eq!(json["dataType"], "icdcodes");
        assert_eq!(json["itemIndex"], 1);
    }
}
