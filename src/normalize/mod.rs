//! Field normalization
//!
//! Raw strings pulled from markup or JSON are coerced into typed values here:
//! - pure coercions (`trim`, `to_int`, `to_float`, `extract_first`)
//! - URL resolution against a page (re-exported from [`crate::url`])
//! - the declared per-field pipelines used by the listing extractor

mod fields;
mod pipeline;

pub use crate::url::resolve_url;
pub use fields::{extract_first, take_first, to_float, to_int, trim, FieldError, FieldResult};
pub use pipeline::{FieldPipeline, FieldValue, Measurement, MeasurementRule, Step, MEASUREMENT_RULES};
