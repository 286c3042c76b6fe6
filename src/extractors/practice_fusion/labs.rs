//! Lab extraction
//!
//! A panel is the element that holds a test-name heading. Headings sitting
//! directly under `<body>` have no container and are treated as broken
//! markup rather than a panel.

use std::fmt::Write;

use super::conversion::UnitConverter;
use super::gate;
use super::helpers::{find_slash_date, text_of};
use super::profile::CompiledProfile;
use crate::dom::{Document, ElementExt, ElementRef};
use crate::extractors::base::{
    Component, DataType, EventSink, ExtractionEvent, LabRecord, Severity, DEFAULT_LAB_STATUS,
};

struct Panel<'a> {
    container: ElementRef<'a>,
    heading: ElementRef<'a>,
}

fn event(severity: Severity, message: impl Into<String>) -> ExtractionEvent {
    ExtractionEvent::new(severity, Component::Labs, message).for_data_type(DataType::Labs)
}

pub(super) fn extract(
    profile: &CompiledProfile,
    doc: &Document,
    events: &dyn EventSink,
    converter: Option<&UnitConverter>,
) -> Vec<LabRecord> {
    let panels = find_panels(profile, doc);
    if panels.is_empty() {
        if gate::can_run(profile, doc, DataType::Labs) {
            events.emit(event(
                Severity::Warn,
                "test-name heading found but no panel container holds it",
            ));
        }
        return Vec::new();
    }

    let mut records = Vec::new();
    for (panel_index, panel) in panels.iter().enumerate() {
        let label = panel.heading.normalized_text();
        let label = if label.is_empty() {
            format!("Unknown Panel {}", panel_index + 1)
        } else {
            label
        };

        let rows: Vec<ElementRef<'_>> = panel.container.select(&profile.lab_row).collect();
        tracing::debug!(panel = %label, rows = rows.len(), "lab panel");

        for (index, row) in rows.iter().enumerate() {
            let Some(record) = lab_row(profile, row, &label, index, events) else {
                continue;
            };
            let record = match converter {
                Some(converter) => converter.convert(record, events, Some(index)),
                None => record,
            };
            records.push(record);
        }
    }
    records
}

/// Panel containers in document order, one per distinct container
fn find_panels<'a>(profile: &CompiledProfile, doc: &'a Document) -> Vec<Panel<'a>> {
    let mut panels: Vec<Panel<'a>> = Vec::new();
    for heading in doc.select(&profile.lab_panel_heading) {
        let Some(container) = heading
            .parent_element()
            .filter(|parent| !parent.is_document_level())
        else {
            continue;
        };
        if panels.iter().all(|panel| panel.container != container) {
            panels.push(Panel { container, heading });
        }
    }
    panels
}

fn lab_row(
    profile: &CompiledProfile,
    row: &ElementRef<'_>,
    panel_label: &str,
    index: usize,
    events: &dyn EventSink,
) -> Option<LabRecord> {
    let Some(test_name) = text_of(row, &profile.lab_test_name).filter(|name| !name.is_empty())
    else {
        events.emit(
            event(
                Severity::Warn,
                format!("{}: observation row without a test name, skipped", panel_label),
            )
            .at(index),
        );
        return None;
    };

    let result = row
        .select_first(&profile.lab_result)
        .map(|el| result_text(profile, &el))
        .unwrap_or_default();

    let reference_range = text_of(row, &profile.lab_reference_range).unwrap_or_default();
    let units = text_of(row, &profile.lab_units).unwrap_or_default();

    let raw_date = text_of(row, &profile.lab_collection_date).unwrap_or_default();
    let collection_date = match find_slash_date(&raw_date) {
        Some(date) => date.to_string(),
        None => raw_date,
    };

    let mut status = text_of(row, &profile.lab_status)
        .filter(|status| !status.is_empty())
        .unwrap_or_else(|| DEFAULT_LAB_STATUS.to_string());
    if let Some(flag) = row.select_first(&profile.lab_abnormal_flag) {
        let flag = flag.normalized_text();
        if flag.is_empty() {
            status.push_str(" (Abnormal)");
        } else {
            let _ = write!(status, " ({})", flag);
        }
    }

    Some(LabRecord {
        test_name: format!("{} - {}", panel_label, test_name),
        result,
        reference_range,
        units,
        collection_date,
        status,
    })
}

/// Result text without the glyphs of a nested abnormal icon
fn result_text(profile: &CompiledProfile, el: &ElementRef<'_>) -> String {
    if el.select_first(&profile.lab_abnormal_icon).is_none() {
        return el.normalized_text();
    }
    let own = el.own_text_nodes().join(" ");
    if own.is_empty() {
        el.normalized_text()
    } else {
        own
    }
}
