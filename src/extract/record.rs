//! Output record and skip reasons

use crate::normalize::FieldError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// One normalized rental listing
///
/// `url` is the canonical listing URL and the join key between the page's
/// JSON state and its markup. `latitude` and `longitude` always come from the
/// same geo object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRecord {
    pub crawl_timestamp: DateTime<Utc>,
    pub parse_timestamp: DateTime<Utc>,

    pub url: String,
    pub thumbnail_url: Option<String>,
    pub referrer_url: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub latitude: f64,
    pub longitude: f64,

    pub price: Option<i64>,
    pub sqft: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,

    pub pet_friendly: bool,
    pub furnished: bool,
}

/// Why a listing card produced no record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("no canonical listing URL")]
    NoCanonicalUrl,

    #[error("missing address or geo block")]
    MissingAddressOrGeo,

    #[error("invalid {field}: {source}")]
    Format {
        field: &'static str,
        source: FieldError,
    },
}

impl SkipReason {
    /// Short stable tag, used as a counter key and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCanonicalUrl => "no_canonical_url",
            Self::MissingAddressOrGeo => "missing_address_or_geo",
            Self::Format { .. } => "format_error",
        }
    }
}
