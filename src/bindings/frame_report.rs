// PyFrameReport - PyO3 wrapper for one browsing context's extraction
//
// Lists are None when the frame gate said the context is not authoritative
// for that data type.

use super::{PyIcdCodeRecord, PyLabRecord, PyMedicationRecord};
use crate::extractors::FrameReport;
use pyo3::prelude::*;

#[pyclass(name = "FrameReport")]
pub struct PyFrameReport {
    inner: FrameReport,
}

impl From<FrameReport> for PyFrameReport {
    fn from(inner: FrameReport) -> Self {
        PyFrameReport { inner }
    }
}

#[pymethods]
impl PyFrameReport {
    #[getter]
    fn vendor(&self) -> String {
        self.inner.vendor.clone()
    }

    #[getter]
    fn patient_name(&self) -> String {
        self.inner.patient.patient_name.clone()
    }

    #[getter]
    fn patient_dob(&self) -> String {
        self.inner.patient.patient_dob.clone()
    }

    #[getter]
    fn medications(&self) -> Option<Vec<PyMedicationRecord>> {
        self.inner
            .medications
            .as_ref()
            .map(|records| records.iter().cloned().map(PyMedicationRecord::from).collect())
    }

    #[getter]
    fn labs(&self) -> Option<Vec<PyLabRecord>> {
        self.inner
            .labs
            .as_ref()
            .map(|records| records.iter().cloned().map(PyLabRecord::from).collect())
    }

    #[getter]
    fn icd_codes(&self) -> Option<Vec<PyIcdCodeRecord>> {
        self.inner
            .icd_codes
            .as_ref()
            .map(|records| records.iter().cloned().map(PyIcdCodeRecord::from).collect())
    }

    /// (data_type, message) for every data type that failed fatally
    #[getter]
    fn failures(&self) -> Vec<(String, String)> {
        self.inner
            .failures
            .iter()
            .map(|f| (f.data_type.to_string(), f.message.clone()))
            .collect()
    }

    #[getter]
    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    /// Whole report, events included, as JSON
    fn to_json(&self) -> anyhow::Result<String> {
        Ok(self.inner.to_json()?)
    }

    fn __repr__(&self) -> String {
        let count = |len: Option<usize>| len.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        format!(
            "FrameReport(vendor='{}', medications={}, labs={}, icd_codes={}, failures={})",
            self.inner.vendor,
            count(self.inner.medications.as_ref().map(Vec::len)),
            count(self.inner.labs.as_ref().map(Vec::len)),
            count(self.inner.icd_codes.as_ref().map(Vec::len)),
            self.inner.failures.len()
        )
    }
}
