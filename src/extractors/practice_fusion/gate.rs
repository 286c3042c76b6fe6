// Frame gate: presence-based detection of authoritative markup per data type

use super::profile::CompiledProfile;
use crate::dom::Document;
use crate::extractors::base::DataType;

pub(super) fn can_run(profile: &CompiledProfile, doc: &Document, data_type: DataType) -> bool {
    match data_type {
        DataType::Medications => {
            doc.exists(&profile.medication_card)
                || doc.exists(&profile.active_print_container)
                || doc.exists(&profile.historical_print_container)
        }
        DataType::Labs => doc.exists(&profile.lab_panel_heading),
        DataType::IcdCodes => doc.exists(&profile.diagnosis_card),
    }
}
