//! Per-page index of listing URL to embedded JSON state
//!
//! Result pages ship their search state as a JSON script. The index built from
//! it is a best-effort side channel: any page-level problem yields an empty
//! index and extraction carries on from the markup alone.

use crate::extract::json_path::{lookup_array, lookup_str};
use crate::url::resolve_url;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Selector for the application-state script
pub const APP_DATA_SELECTOR: &str = r#"script[id="__NEXT_DATA__"]"#;

/// Where the homes collection lives inside the application state
const HOMES_PATH: &[&str] = &["props", "searchData", "homes"];

/// Where a home's small hero-image URL lives
const PHOTO_PATH: &[&str] = &["media", "heroImage", "url", "small"];

/// Page-level failures that leave the index empty
#[derive(Debug, Error)]
pub enum MalformedPageJson {
    #[error("application state script not found")]
    Missing,

    #[error("application state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("application state has no homes collection")]
    Shape,
}

/// One home from the application state
#[derive(Debug, Clone)]
pub struct JsonListingEntry {
    /// The home's URL, resolved against the page
    pub url: Url,

    /// The full JSON object for this home
    pub data: Value,
}

impl JsonListingEntry {
    /// Small hero-image URL, resolved against the home URL
    ///
    /// Any missing segment along the path yields `None`.
    pub fn photo_url(&self) -> Option<Url> {
        let raw = lookup_str(&self.data, PHOTO_PATH)?;
        resolve_url(raw, &self.url).ok()
    }
}

/// Listing URL to JSON entry, for a single page
#[derive(Debug, Clone, Default)]
pub struct ListingIndex {
    entries: HashMap<String, JsonListingEntry>,
}

impl ListingIndex {
    /// Builds the index, treating every page-level failure as an empty index
    pub fn build(app_data: Option<&str>, page_url: &Url) -> Self {
        match Self::try_build(app_data, page_url) {
            Ok(index) => index,
            Err(e) => {
                tracing::debug!("Empty listing index for {}: {}", page_url, e);
                Self::default()
            }
        }
    }

    /// Builds the index, reporting why the page's JSON was unusable
    ///
    /// Homes without a string `url` are skipped one by one. When two homes
    /// share a URL the later one wins.
    pub fn try_build(app_data: Option<&str>, page_url: &Url) -> Result<Self, MalformedPageJson> {
        let text = app_data.ok_or(MalformedPageJson::Missing)?;
        let root: Value = serde_json::from_str(text)?;
        let homes = lookup_array(&root, HOMES_PATH).ok_or(MalformedPageJson::Shape)?;

        let mut entries = HashMap::new();
        for (position, home) in homes.iter().enumerate() {
            let Some(raw_url) = lookup_str(home, &["url"]) else {
                tracing::trace!("Home #{} on {} has no url, skipping", position, page_url);
                continue;
            };

            let url = match resolve_url(raw_url, page_url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Home #{} on {}: {}", position, page_url, e);
                    continue;
                }
            };

            entries.insert(
                join_key(&url),
                JsonListingEntry {
                    url,
                    data: home.clone(),
                },
            );
        }

        Ok(Self { entries })
    }

    /// Looks up the entry for a listing URL
    pub fn get(&self, url: &Url) -> Option<&JsonListingEntry> {
        self.entries.get(&join_key(url))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the text of the page's application-state script, if present
pub fn app_data_text(document: &Html) -> Option<String> {
    let selector = Selector::parse(APP_DATA_SELECTOR).ok()?;
    document
        .select(&selector)
        .next()
        .map(|script| script.text().collect::<String>())
}

/// Both sides of the join drop query and fragment
fn join_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_query(None);
    key.set_fragment(None);
    key.into()
}
