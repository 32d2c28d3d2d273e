//! Listing extraction
//!
//! This module turns one fetched result page into records:
//! - link discovery for the crawl frontier
//! - the page's JSON listing index
//! - per-card extraction and normalization

mod index;
mod json_path;
mod links;
mod listing;
mod record;

pub use index::{app_data_text, JsonListingEntry, ListingIndex, MalformedPageJson, APP_DATA_SELECTOR};
pub use json_path::{lookup, lookup_array, lookup_str};
pub use links::discover_links;
pub use listing::{ListingExtractor, PageContext, FURNISHED_TAG, PET_FRIENDLY_TAG};
pub use record::{ListingRecord, SkipReason};
