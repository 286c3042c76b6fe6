// EHR Extract Core - clinical record extraction from rendered chart markup
//
// Documents are parsed with scraper (html5ever) into a browser-equivalent
// tree, and vendor extractors pull medications, labs, diagnoses and demographics out of it.
// The Python extension module is built with the `python` feature.

pub mod config;
pub mod dom;
pub mod extractors;

pub use config::{ConfigError, ExtractionConfig, MarkupProfile};
pub use dom::{Document, ElementExt};
pub use extractors::{ChartExtractor, DataType, ExtractorRegistry, FrameReport};

// PyO3 bindings layer
#[cfg(feature = "python")]
mod bindings;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// EHR Extract Core Python module
///
/// Provides frame gating and record extraction for rendered EHR charts.
#[cfg(feature = "python")]
#[pymodule]
fn ehr_extract_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Add Python functions
    m.add_function(wrap_pyfunction!(bindings::can_run, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::should_extract_here, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_medications, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_labs, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_icd_codes, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_patient_name, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_patient_dob, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_frame, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_frames_batch, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::supported_vendors, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::init_logging, m)?)?;

    // Add Python classes
    m.add_class::<bindings::PyMedicationRecord>()?;
    m.add_class::<bindings::PyLabRecord>()?;
    m.add_class::<bindings::PyIcdCodeRecord>()?;
    m.add_class::<bindings::PyFrameReport>()?;

    Ok(())
}
