//! Declarative per-field normalization pipelines
//!
//! Each measurement field is declared once in [`MEASUREMENT_RULES`] with the
//! DOM marker it is read from, its capture pattern, and the ordered steps that
//! turn raw text into a typed value. [`FieldPipeline::run`] is the single
//! generic runner for all of them.

use crate::normalize::fields::{extract_first, take_first, to_float, to_int, trim, FieldResult};
use regex::Regex;

/// A single normalization step
#[derive(Debug, Clone)]
pub enum Step {
    /// Strip surrounding whitespace
    Trim,
    /// Keep only the first capture group; values that do not match are dropped
    Capture(Regex),
    /// Coerce to an integer (thousands separators allowed)
    ToInt,
    /// Coerce to a float
    ToFloat,
}

/// A value flowing through a pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

impl Step {
    /// Applies this step; `Ok(None)` means the value was filtered out
    fn apply(&self, value: FieldValue) -> FieldResult<Option<FieldValue>> {
        match self {
            Self::Trim => Ok(Some(match value {
                FieldValue::Text(s) => FieldValue::Text(trim(&s).to_string()),
                other => other,
            })),
            Self::Capture(pattern) => {
                let text = value.render();
                Ok(extract_first(pattern, &text).map(|m| FieldValue::Text(m.to_string())))
            }
            Self::ToInt => match value {
                FieldValue::Int(n) => Ok(Some(FieldValue::Int(n))),
                other => to_int(&other.render()).map(|n| Some(FieldValue::Int(n))),
            },
            Self::ToFloat => match value {
                FieldValue::Float(f) => Ok(Some(FieldValue::Float(f))),
                FieldValue::Int(n) => Ok(Some(FieldValue::Float(n as f64))),
                FieldValue::Text(s) => to_float(&s).map(|f| Some(FieldValue::Float(f))),
            },
        }
    }
}

/// Input steps run per raw value; output steps run once on the survivor
#[derive(Debug, Clone)]
pub struct FieldPipeline {
    input: Vec<Step>,
    output: Vec<Step>,
}

impl FieldPipeline {
    pub fn new(input: Vec<Step>, output: Vec<Step>) -> Self {
        Self { input, output }
    }

    /// Default pipeline for free text: trim, take first
    pub fn text() -> Self {
        Self::new(vec![Step::Trim], vec![])
    }

    /// Pipeline for a coordinate: trim, take first, float
    pub fn coordinate() -> Self {
        Self::new(vec![Step::Trim], vec![Step::ToFloat])
    }

    /// Pipeline for a regex-extracted integer measurement
    pub fn measurement(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(
            vec![Step::Trim, Step::Capture(Regex::new(pattern)?)],
            vec![Step::ToInt],
        ))
    }

    /// Runs the pipeline over every collected raw value
    ///
    /// Returns `Ok(None)` when no raw value survives the input steps. Only the
    /// first survivor reaches the output steps.
    pub fn run<I>(&self, raw_values: I) -> FieldResult<Option<FieldValue>>
    where
        I: IntoIterator<Item = FieldValue>,
    {
        let mut survivors = Vec::new();
        for raw in raw_values {
            if let Some(value) = apply_all(&self.input, raw)? {
                survivors.push(value);
            }
        }

        match take_first(survivors) {
            Some(first) => apply_all(&self.output, first),
            None => Ok(None),
        }
    }

    /// Convenience wrapper for textual raw values
    pub fn run_text<'a, I>(&self, raw_values: I) -> FieldResult<Option<FieldValue>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.run(
            raw_values
                .into_iter()
                .map(|s| FieldValue::Text(s.to_string())),
        )
    }
}

fn apply_all(steps: &[Step], value: FieldValue) -> FieldResult<Option<FieldValue>> {
    let mut current = value;
    for step in steps {
        match step.apply(current)? {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Integer measurements read from listing cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measurement {
    Price,
    Sqft,
    Bedrooms,
    Bathrooms,
}

impl Measurement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Sqft => "sqft",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
        }
    }
}

/// Where a measurement lives in the card and how to read it
#[derive(Debug, Clone, Copy)]
pub struct MeasurementRule {
    pub field: Measurement,
    pub selector: &'static str,
    pub pattern: &'static str,
}

/// The declared measurement table
pub const MEASUREMENT_RULES: &[MeasurementRule] = &[
    MeasurementRule {
        field: Measurement::Price,
        selector: r#"div[data-testid="property-price"]"#,
        pattern: r"\$([\d,]+)",
    },
    MeasurementRule {
        field: Measurement::Sqft,
        selector: r#"div[data-testid="property-floorSpace"]"#,
        pattern: r"([\d,]+) sqft$",
    },
    MeasurementRule {
        field: Measurement::Bedrooms,
        selector: r#"div[data-testid="property-beds"]"#,
        pattern: r"(?:^|\s)(\d+)bd$",
    },
    MeasurementRule {
        field: Measurement::Bathrooms,
        selector: r#"div[data-testid="property-baths"]"#,
        pattern: r"(?:^|\s)(\d+)ba$",
    },
];
