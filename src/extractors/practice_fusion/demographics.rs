use super::helpers::text_of;
use super::profile::CompiledProfile;
use crate::dom::Document;
use crate::extractors::base::UNKNOWN;

pub(super) fn patient_name(profile: &CompiledProfile, doc: &Document) -> String {
    text_of(&doc.root(), &profile.patient_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Header date of birth, then the narrow-viewport header
pub(super) fn patient_dob(profile: &CompiledProfile, doc: &Document) -> String {
    let root = doc.root();
    [&profile.patient_dob, &profile.patient_dob_narrow]
        .into_iter()
        .filter_map(|selector| text_of(&root, selector))
        .find(|dob| !dob.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
