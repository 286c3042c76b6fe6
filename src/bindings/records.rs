// Record wrappers - PyO3 views over the extracted chart records
//
// Each wrapper owns its record; every field is a read-only getter.

use crate::extractors::base::{IcdCodeRecord, LabRecord, MedicationRecord};
use pyo3::prelude::*;

/// Python-accessible medication record
#[pyclass(name = "MedicationRecord")]
pub struct PyMedicationRecord {
    inner: MedicationRecord,
}

impl From<MedicationRecord> for PyMedicationRecord {
    fn from(inner: MedicationRecord) -> Self {
        PyMedicationRecord { inner }
    }
}

#[pymethods]
impl PyMedicationRecord {
    #[getter]
    fn drug_name(&self) -> String {
        self.inner.drug_name.clone()
    }

    #[getter]
    fn sig(&self) -> String {
        self.inner.sig.clone()
    }

    #[getter]
    fn encounter_date(&self) -> String {
        self.inner.encounter_date.clone()
    }

    #[getter]
    fn status(&self) -> &'static str {
        self.inner.status.as_str()
    }

    #[getter]
    fn provider(&self) -> String {
        self.inner.provider.clone()
    }

    /// Formulation
    #[getter]
    fn r#type(&self) -> String {
        self.inner.form_type.clone()
    }

    #[getter]
    fn amount(&self) -> String {
        self.inner.amount.clone()
    }

    #[getter]
    fn start_date(&self) -> String {
        self.inner.start_date.clone()
    }

    #[getter]
    fn end_date(&self) -> String {
        self.inner.end_date.clone()
    }

    /// camelCase JSON object, as the downstream tooling stores it
    fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.inner)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "MedicationRecord(drug_name='{}', status='{}', sig='{}')",
            self.inner.drug_name, self.inner.status, self.inner.sig
        )
    }
}

/// Python-accessible lab record
#[pyclass(name = "LabRecord")]
pub struct PyLabRecord {
    inner: LabRecord,
}

impl From<LabRecord> for PyLabRecord {
    fn from(inner: LabRecord) -> Self {
        PyLabRecord { inner }
    }
}

#[pymethods]
impl PyLabRecord {
    #[getter]
    fn test_name(&self) -> String {
        self.inner.test_name.clone()
    }

    #[getter]
    fn result(&self) -> String {
        self.inner.result.clone()
    }

    #[getter]
    fn reference_range(&self) -> String {
        self.inner.reference_range.clone()
    }

    #[getter]
    fn units(&self) -> String {
        self.inner.units.clone()
    }

    #[getter]
    fn collection_date(&self) -> String {
        self.inner.collection_date.clone()
    }

    #[getter]
    fn status(&self) -> String {
        self.inner.status.clone()
    }

    fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.inner)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "LabRecord(test_name='{}', result='{}', units='{}')",
            self.inner.test_name, self.inner.result, self.inner.units
        )
    }
}

/// Python-accessible diagnosis code
#[pyclass(name = "IcdCodeRecord")]
pub struct PyIcdCodeRecord {
    inner: IcdCodeRecord,
}

impl From<IcdCodeRecord> for PyIcdCodeRecord {
    fn from(inner: IcdCodeRecord) -> Self {
        PyIcdCodeRecord { inner }
    }
}

#[pymethods]
impl PyIcdCodeRecord {
    #[getter]
    fn code(&self) -> String {
        self.inner.code.clone()
    }

    #[getter]
    fn description(&self) -> String {
        self.inner.description.clone()
    }

    #[getter]
    fn date_added(&self) -> String {
        self.inner.date_added.clone()
    }

    #[getter]
    fn provider(&self) -> String {
        self.inner.provider.clone()
    }

    #[getter]
    fn status(&self) -> String {
        self.inner.status.clone()
    }

    fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.inner)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "IcdCodeRecord(code='{}', description='{}')",
            self.inner.code, self.inner.description
        )
    }
}
