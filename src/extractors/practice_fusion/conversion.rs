//! Unit conversion for lab results
//!
//! A fixed, read-only table of rules keyed by an analyte substring of the
//! upper-cased test name. The current rules correct absolute differential
//! counts that the chart sometimes renders per µL instead of ×10³/µL. Each
//! rule is gated on a magnitude threshold, so running the engine over an
//! already converted value leaves it alone.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::base::{Component, DataType, EventSink, ExtractionEvent, LabRecord};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?\d*\.?\d+").unwrap());

/// Numeric transform a rule applies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Divide by `divisor` when the magnitude is above `threshold`;
    /// values at or below the threshold are already in the target scale.
    ScaleDownAbove { threshold: f64, divisor: f64 },
}

impl Transform {
    /// `None` when the rule does not apply to `value`
    pub fn apply(&self, value: f64) -> Option<f64> {
        match *self {
            Transform::ScaleDownAbove { threshold, divisor } => {
                (value.abs() > threshold).then(|| value / divisor)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRule {
    /// Upper-case analyte substring matched against the upper-cased test name
    pub analyte: &'static str,
    pub transform: Transform,
    /// Decimal places kept after conversion
    pub precision: Option<u32>,
    /// Replacement units, when the conversion changes them
    pub units: Option<&'static str>,
}

const fn per_microliter(analyte: &'static str, threshold: f64) -> ConversionRule {
    ConversionRule {
        analyte,
        transform: Transform::ScaleDownAbove {
            threshold,
            divisor: 1000.0,
        },
        precision: Some(3),
        units: None,
    }
}

/// Rules in match order; the first rule whose analyte is contained in the test name wins
pub static CONVERSION_RULES: &[ConversionRule] = &[
    per_microliter("ABSOLUTE NEUTROPHILS", 100.0),
    per_microliter("ABSOLUTE LYMPHOCYTES", 100.0),
    per_microliter("ABSOLUTE MONOCYTES", 50.0),
    per_microliter("ABSOLUTE EOSINOPHILS", 50.0),
    per_microliter("ABSOLUTE BASOPHILS", 20.0),
];

/// Applies a rule table to lab records
#[derive(Debug, Clone, Copy)]
pub struct UnitConverter {
    rules: &'static [ConversionRule],
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitConverter {
    pub fn new() -> Self {
        Self::with_rules(CONVERSION_RULES)
    }

    pub fn with_rules(rules: &'static [ConversionRule]) -> Self {
        Self { rules }
    }

    pub fn rule_for(&self, test_name: &str) -> Option<&ConversionRule> {
        let test_name = test_name.to_uppercase();
        self.rules
            .iter()
            .find(|rule| test_name.contains(&rule.analyte.to_uppercase()))
    }

    /// Convert `record.result` in place of the original text. Records without
    /// a matching rule, without a number, or whose transform fails come back
    /// unchanged.
    pub fn convert(
        &self,
        mut record: LabRecord,
        events: &dyn EventSink,
        item_index: Option<usize>,
    ) -> LabRecord {
        let Some(rule) = self.rule_for(&record.test_name) else {
            return record;
        };

        let event = |event: ExtractionEvent| {
            let event = event.for_data_type(DataType::Labs);
            match item_index {
                Some(index) => event.at(index),
                None => event,
            }
        };

        let cleaned = record.result.replace(',', "");
        let Some(number) = NUMBER_RE.find(&cleaned) else {
            events.emit(event(ExtractionEvent::debug(
                Component::UnitConversion,
                format!(
                    "{}: result '{}' is not numeric, left as is",
                    record.test_name, record.result
                ),
            )));
            return record;
        };

        let value = match number.as_str().parse::<f64>() {
            Ok(value) => value,
            Err(e) => {
                events.emit(event(ExtractionEvent::warn(
                    Component::UnitConversion,
                    format!("{}: conversion error: {}", record.test_name, e),
                )));
                return record;
            }
        };

        let Some(converted) = rule.transform.apply(value) else {
            return record;
        };

        if !converted.is_finite() {
            events.emit(event(ExtractionEvent::warn(
                Component::UnitConversion,
                format!(
                    "{}: conversion error: {} produced a non-finite value",
                    record.test_name, value
                ),
            )));
            return record;
        }

        let converted = match rule.precision {
            Some(places) => round_to(converted, places),
            None => converted,
        };

        record.result = format_number(converted);
        if let Some(units) = rule.units {
            record.units = units.to_string();
        }
        record
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Shortest decimal form, without trailing zeros
fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}
