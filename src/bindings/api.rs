// API Functions - PyO3-exposed functions for Python
//
// Every function takes the serialized markup of one browsing context plus an
// optional JSON config (see ExtractionConfig) and picks the vendor by markup
// signature.

use super::{PyFrameReport, PyIcdCodeRecord, PyLabRecord, PyMedicationRecord};
use crate::config::ExtractionConfig;
use crate::dom::Document;
use crate::extractors::base::{ChartExtractor, TracingSink};
use crate::extractors::ExtractorRegistry;
use once_cell::sync::Lazy;
use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

static DEFAULT_REGISTRY: Lazy<ExtractorRegistry> = Lazy::new(ExtractorRegistry::with_defaults);

enum Registry {
    Default,
    Configured(ExtractorRegistry),
}

impl Registry {
    fn from_config(config: Option<&str>) -> anyhow::Result<Self> {
        Ok(match config {
            Some(json) => Registry::Configured(ExtractorRegistry::with_config(
                &ExtractionConfig::from_json_str(json)?,
            )?),
            None => Registry::Default,
        })
    }

    fn get(&self) -> &ExtractorRegistry {
        match self {
            Registry::Default => &*DEFAULT_REGISTRY,
            Registry::Configured(registry) => registry,
        }
    }
}

/// Parse `html`, pick its extractor and run `f`
fn with_extractor<T>(
    html: &str,
    config: Option<&str>,
    f: impl FnOnce(&dyn ChartExtractor, &Document) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let registry = Registry::from_config(config)?;
    let doc = Document::parse(html);
    let extractor = registry
        .get()
        .detect_or_default(&doc)
        .ok_or_else(|| anyhow::anyhow!("No chart extractors registered"))?;
    f(extractor, &doc)
}

/// Frame gate: is this context authoritative for `data_type`?
///
/// Args:
///     html (str): Rendered markup of one frame
///     data_type (str): "medications", "labs" or "icdcodes"
///     config (str | None): JSON ExtractionConfig overrides
///
/// Returns:
///     bool: False for unknown data types
#[pyfunction]
#[pyo3(signature = (html, data_type, config=None))]
pub fn can_run(html: &str, data_type: &str, config: Option<&str>) -> anyhow::Result<bool> {
    with_extractor(html, config, |extractor, doc| {
        Ok(extractor.can_run_tag(doc, data_type))
    })
}

/// Same predicate as `can_run`, used to suppress extraction in frames that
/// are not authoritative when a request is broadcast to every frame
#[pyfunction]
#[pyo3(signature = (html, data_type, config=None))]
pub fn should_extract_here(
    html: &str,
    data_type: &str,
    config: Option<&str>,
) -> anyhow::Result<bool> {
    with_extractor(html, config, |extractor, doc| {
        Ok(extractor.should_extract_here_tag(doc, data_type))
    })
}

/// Extract the medication list
///
/// Raises:
///     RuntimeError: The gate reports medication markup but the summary card is missing
#[pyfunction]
#[pyo3(signature = (html, config=None))]
pub fn extract_medications(
    html: &str,
    config: Option<&str>,
) -> anyhow::Result<Vec<PyMedicationRecord>> {
    with_extractor(html, config, |extractor, doc| {
        let records = extractor.extract_medications(doc, &TracingSink)?;
        Ok(records.into_iter().map(PyMedicationRecord::from).collect())
    })
}

#[pyfunction]
#[pyo3(signature = (html, config=None))]
pub fn extract_labs(html: &str, config: Option<&str>) -> anyhow::Result<Vec<PyLabRecord>> {
    with_extractor(html, config, |extractor, doc| {
        let records = extractor.extract_labs(doc, &TracingSink);
        Ok(records.into_iter().map(PyLabRecord::from).collect())
    })
}

#[pyfunction]
#[pyo3(signature = (html, config=None))]
pub fn extract_icd_codes(
    html: &str,
    config: Option<&str>,
) -> anyhow::Result<Vec<PyIcdCodeRecord>> {
    with_extractor(html, config, |extractor, doc| {
        let records = extractor.extract_icd_codes(doc, &TracingSink);
        Ok(records.into_iter().map(PyIcdCodeRecord::from).collect())
    })
}

/// Patient name from the chart header, "Unknown" when absent
#[pyfunction]
#[pyo3(signature = (html, config=None))]
pub fn extract_patient_name(html: &str, config: Option<&str>) -> anyhow::Result<String> {
    with_extractor(html, config, |extractor, doc| {
        Ok(extractor.extract_patient_name(doc))
    })
}

/// Date of birth from the chart header, "Unknown" when absent
#[pyfunction]
#[pyo3(signature = (html, config=None))]
pub fn extract_patient_dob(html: &str, config: Option<&str>) -> anyhow::Result<String> {
    with_extractor(html, config, |extractor, doc| {
        Ok(extractor.extract_patient_dob(doc))
    })
}

/// Gate and extract every data type in one frame
#[pyfunction]
#[pyo3(signature = (html, config=None))]
pub fn extract_frame(html: &str, config: Option<&str>) -> anyhow::Result<PyFrameReport> {
    let registry = Registry::from_config(config)?;
    Ok(registry.get().extract_frame_html(html)?.into())
}

/// Extract many frames in parallel
///
/// Frames are independent, so they are processed on Rayon's pool with the
/// GIL released. A frame that cannot be extracted is logged and comes back
/// as None; the rest of the batch is unaffected.
///
/// Args:
///     frames (list[str]): Rendered markup, one entry per frame
///     config (str | None): JSON ExtractionConfig overrides
///
/// Returns:
///     list[FrameReport | None]: Same order as the input
#[pyfunction]
#[pyo3(signature = (frames, config=None))]
pub fn extract_frames_batch(
    py: Python<'_>,
    frames: Vec<String>,
    config: Option<&str>,
) -> anyhow::Result<Vec<Option<PyFrameReport>>> {
    use rayon::prelude::*;

    let registry = Registry::from_config(config)?;
    let registry = registry.get();

    let reports = py.detach(move || {
        frames
            .par_iter()
            .enumerate()
            .map(|(index, html)| match registry.extract_frame_html(html) {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!("Failed to extract frame {}: {}", index, e);
                    None
                }
            })
            .collect::<Vec<_>>()
    });

    Ok(reports
        .into_iter()
        .map(|report| report.map(PyFrameReport::from))
        .collect())
}

/// Registered vendor keys, in detection order
#[pyfunction]
pub fn supported_vendors() -> Vec<String> {
    DEFAULT_REGISTRY
        .vendors()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Install a `tracing` subscriber that writes to stderr
///
/// Args:
///     filter (str | None): EnvFilter directive such as "ehr_extract_core=debug".
///         Falls back to RUST_LOG, then "info".
///
/// Returns:
///     bool: False when a global subscriber was already installed
#[pyfunction]
#[pyo3(signature = (filter=None))]
pub fn init_logging(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
