use once_cell::sync::Lazy;
use regex::Regex;

use super::profile::CompiledProfile;
use crate::dom::{Document, ElementExt};
use crate::extractors::base::{
    Component, DataType, EventSink, ExtractionEvent, IcdCodeRecord, Severity,
};

/// "(E11.9) Type 2 diabetes mellitus without complications"
static CODE_DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*\(([^)]+)\)\s*(.+?)\s*$").unwrap());

fn event(severity: Severity, message: impl Into<String>) -> ExtractionEvent {
    ExtractionEvent::new(severity, Component::IcdCodes, message).for_data_type(DataType::IcdCodes)
}

pub(super) fn extract(
    profile: &CompiledProfile,
    doc: &Document,
    events: &dyn EventSink,
) -> Vec<IcdCodeRecord> {
    let Some(card) = doc.select_first(&profile.diagnosis_card) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for (index, item) in card.select(&profile.diagnosis_item).enumerate() {
        let text = item.normalized_text();
        if text.is_empty() {
            events.emit(event(Severity::Debug, "blank diagnosis item, skipped").at(index));
            continue;
        }
        match parse_code_description(&text) {
            Some((code, description)) => records.push(IcdCodeRecord::active(code, description)),
            None => events.emit(
                event(
                    Severity::Warn,
                    format!("'{}' is not a '(code) description' pair, skipped", text),
                )
                .at(index),
            ),
        }
    }
    records
}

/// Split "(code) description"; both parts trimmed and non-empty
fn parse_code_description(text: &str) -> Option<(&str, &str)> {
    let caps = CODE_DESCRIPTION_RE.captures(text)?;
    let code = caps.get(1)?.as_str().trim();
    let description = caps.get(2)?.as_str().trim();
    if code.is_empty() || description.is_empty() {
        return None;
    }
    Some((code, description))
}
