use crate::config::{ConfigError, MarkupProfile};
use crate::dom::Selector;

/// `MarkupProfile` with every selector parsed
#[derive(Debug, Clone)]
pub(super) struct CompiledProfile {
    pub(super) vendor_signature: Selector,

    pub(super) medication_card: Selector,
    pub(super) medication_card_list: Selector,
    pub(super) medication_card_item: Selector,
    pub(super) medication_card_name: Selector,
    pub(super) medication_active_marker: Selector,
    pub(super) medication_historical_marker: Selector,

    pub(super) active_print_container: Selector,
    pub(super) historical_print_container: Selector,
    pub(super) print_row: Selector,
    pub(super) print_name: Selector,
    pub(super) print_sig: Selector,
    pub(super) print_dose_form: Selector,
    pub(super) print_date: Selector,

    pub(super) lab_panel_heading: Selector,
    pub(super) lab_row: Selector,
    pub(super) lab_test_name: Selector,
    pub(super) lab_result: Selector,
    pub(super) lab_abnormal_icon: Selector,
    pub(super) lab_reference_range: Selector,
    pub(super) lab_units: Selector,
    pub(super) lab_collection_date: Selector,
    pub(super) lab_status: Selector,
    pub(super) lab_abnormal_flag: Selector,

    pub(super) diagnosis_card: Selector,
    pub(super) diagnosis_item: Selector,

    pub(super) patient_name: Selector,
    pub(super) patient_dob: Selector,
    pub(super) patient_dob_narrow: Selector,
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        field,
        message: e.to_string(),
    })
}

macro_rules! compile_profile {
    ($profile:expr, { $($field:ident),* $(,)? }) => {
        CompiledProfile {
            $($field: compile(stringify!($field), &$profile.$field)?,)*
        }
    };
}

impl CompiledProfile {
    pub(super) fn compile(profile: &MarkupProfile) -> Result<Self, ConfigError> {
        Ok(compile_profile!(profile, {
            vendor_signature,
            medication_card,
            medication_card_list,
            medication_card_item,
            medication_card_name,
            medication_active_marker,
            medication_historical_marker,
            active_print_container,
            historical_print_container,
            print_row,
            print_name,
            print_sig,
            print_dose_form,
            print_date,
            lab_panel_heading,
            lab_row,
            lab_test_name,
            lab_result,
            lab_abnormal_icon,
            lab_reference_range,
            lab_units,
            lab_collection_date,
            lab_status,
            lab_abnormal_flag,
            diagnosis_card,
            diagnosis_item,
            patient_name,
            patient_dob,
            patient_dob_narrow,
        }))
    }
}
