//! URL handling module for Listing Harvest
//!
//! This module provides URL resolution, the traversal scope rule, canonical
//! listing URLs, and origin extraction.

mod canonical;
mod domain;
mod resolve;
mod scope;

pub use canonical::{canonical_listing_url, DEFAULT_LISTING_PREFIX};
pub use domain::extract_authority;
pub use resolve::{resolve_href, resolve_url};
pub use scope::{ScopePattern, DEFAULT_SCOPE_PATTERN};
