//! Medication extraction
//!
//! Two mutually exclusive sources, in priority order:
//!
//! 1. The print-preview tables (active and historical). When either is
//!    rendered it is treated as complete and the summary card is ignored.
//! 2. The interactive summary card. A rendered card without a list body is
//!    a patient with no medications. Its dosage, route and form are bare text
//!    nodes next to the name link; when fewer than three are present the
//!    trailing text is split on whitespace instead. That fallback is best
//!    effort and may assign words to the wrong field, and an item with no
//!    trailing text at all gets empty dosage/route/form.

use super::gate;
use super::helpers::{element_date_text, split_dose_form, text_of};
use super::profile::CompiledProfile;
use crate::dom::{Document, ElementExt, ElementRef};
use crate::extractors::base::{
    Component, DataType, EventSink, ExtractError, ExtractionEvent, MedicationRecord,
    MedicationStatus, Severity, NOT_AVAILABLE,
};

/// Which print-preview list a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrintList {
    Active,
    Historical,
}

impl PrintList {
    fn status(self) -> MedicationStatus {
        match self {
            PrintList::Active => MedicationStatus::Active,
            PrintList::Historical => MedicationStatus::Discontinued,
        }
    }
}

fn event(severity: Severity, message: impl Into<String>) -> ExtractionEvent {
    ExtractionEvent::new(severity, Component::Medications, message)
        .for_data_type(DataType::Medications)
}

pub(super) fn extract(
    profile: &CompiledProfile,
    doc: &Document,
    events: &dyn EventSink,
) -> Result<Vec<MedicationRecord>, ExtractError> {
    let active = doc.select(&profile.active_print_container);
    let historical = doc.select(&profile.historical_print_container);

    if !active.is_empty() || !historical.is_empty() {
        let containers = active
            .into_iter()
            .map(|container| (container, PrintList::Active))
            .chain(
                historical
                    .into_iter()
                    .map(|container| (container, PrintList::Historical)),
            );

        let mut records = Vec::new();
        for (container, list) in containers {
            for (index, row) in container.select(&profile.print_row).enumerate() {
                if let Some(record) = print_row(profile, &row, list, index, events) {
                    records.push(record);
                }
            }
        }
        return Ok(records);
    }

    summary_card(profile, doc, events)
}

fn print_row(
    profile: &CompiledProfile,
    row: &ElementRef<'_>,
    list: PrintList,
    index: usize,
    events: &dyn EventSink,
) -> Option<MedicationRecord> {
    let Some(drug_name) = text_of(row, &profile.print_name).filter(|name| !name.is_empty())
    else {
        events.emit(event(Severity::Warn, "print row without a medication name, skipped").at(index));
        return None;
    };

    let sig = text_of(row, &profile.print_sig)
        .filter(|sig| !sig.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let (amount, form_type) = text_of(row, &profile.print_dose_form)
        .map(|text| split_dose_form(&text))
        .unwrap_or_default();

    let dates: Vec<String> = row
        .select(&profile.print_date)
        .map(|date| element_date_text(&date))
        .collect();

    let (mut start_date, end_date) = match (dates.as_slice(), list) {
        ([], _) => (String::new(), String::new()),
        ([only], PrintList::Active) => (only.clone(), String::new()),
        ([only], PrintList::Historical) => (NOT_AVAILABLE.to_string(), only.clone()),
        ([start, end, ..], _) => (start.clone(), end.clone()),
    };
    if start_date.is_empty() {
        start_date = NOT_AVAILABLE.to_string();
    }

    let encounter_date = if end_date.is_empty() {
        start_date.clone()
    } else {
        format!("{} - {}", start_date, end_date)
    };

    Some(MedicationRecord {
        drug_name,
        sig,
        encounter_date,
        status: list.status(),
        provider: String::new(),
        form_type,
        amount,
        start_date,
        end_date,
    })
}

fn summary_card(
    profile: &CompiledProfile,
    doc: &Document,
    events: &dyn EventSink,
) -> Result<Vec<MedicationRecord>, ExtractError> {
    let Some(card) = doc.select_first(&profile.medication_card) else {
        if !gate::can_run(profile, doc, DataType::Medications) {
            return Ok(Vec::new());
        }
        let error = ExtractError::MissingContainer {
            data_type: DataType::Medications,
            container: "medication_card".to_string(),
        };
        events.emit(event(Severity::Error, error.to_string()));
        return Err(error);
    };

    let Some(list) = card.select_first(&profile.medication_card_list) else {
        events.emit(event(
            Severity::Debug,
            "summary card has no list body, no medications on file",
        ));
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for (index, item) in list.select(&profile.medication_card_item).enumerate() {
        if let Some(record) = card_item(profile, &item, index, events) {
            records.push(record);
        }
    }
    Ok(records)
}

fn card_item(
    profile: &CompiledProfile,
    item: &ElementRef<'_>,
    index: usize,
    events: &dyn EventSink,
) -> Option<MedicationRecord> {
    let link = item
        .select_first(&profile.medication_card_name)
        .filter(|link| !link.normalized_text().is_empty());
    let Some(link) = link else {
        events.emit(event(Severity::Warn, "card item without a medication name, skipped").at(index));
        return None;
    };
    let drug_name = link.normalized_text();

    let holder = link.parent_element().unwrap_or(*item);
    let text_nodes = holder.own_text_nodes();
    let (dosage, route, form) = if text_nodes.len() >= 3 {
        (
            text_nodes[0].clone(),
            text_nodes[1].clone(),
            text_nodes[2].clone(),
        )
    } else {
        events.emit(
            event(
                Severity::Debug,
                format!(
                    "{}: {} text node(s) beside the name, splitting trailing text",
                    drug_name,
                    text_nodes.len()
                ),
            )
            .at(index),
        );
        split_trailing_text(&holder.text_after(&link))
    };

    let sig = [dosage.as_str(), route.as_str(), form.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let sig = if sig.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        sig
    };

    let status = if item.contains_match(&profile.medication_active_marker) {
        MedicationStatus::Active
    } else if item.contains_match(&profile.medication_historical_marker) {
        MedicationStatus::Discontinued
    } else {
        MedicationStatus::Unknown
    };

    Some(MedicationRecord {
        drug_name,
        sig,
        encounter_date: String::new(),
        status,
        provider: String::new(),
        form_type: form,
        amount: dosage,
        start_date: NOT_AVAILABLE.to_string(),
        end_date: NOT_AVAILABLE.to_string(),
    })
}

/// First word is the dosage, second the route, the rest the form
fn split_trailing_text(text: &str) -> (String, String, String) {
    let mut words = text.split_whitespace();
    let dosage = words.next().unwrap_or_default().to_string();
    let route = words.next().unwrap_or_default().to_string();
    let form = words.collect::<Vec<_>>().join(" ");
    (dosage, route, form)
}
