//! Listing card extraction
//!
//! A card is correlated with the page's JSON index by its canonical URL, then
//! its own address block and text nodes are normalized into a
//! [`ListingRecord`]. Steps run in a fixed order and stop at the first
//! disqualifying condition.

use crate::extract::index::ListingIndex;
use crate::extract::json_path::{lookup, lookup_str};
use crate::extract::record::{ListingRecord, SkipReason};
use crate::normalize::{FieldPipeline, FieldValue, Measurement, MEASUREMENT_RULES};
use crate::url::{canonical_listing_url, resolve_href};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Each card is the `li` wrapping one of these
const CARD_SELECTOR: &str = r#"div[data-testid="home-card-rent"]"#;

/// The card's structured address and coordinates
const ADDRESS_SCRIPT_SELECTOR: &str = r#"script[data-testid="srp-seo-breadcrumbs-list"]"#;

/// Amenity labels
const TAG_SELECTOR: &str = r#"div[data-testid="property-tags"] > span > span"#;

pub const PET_FRIENDLY_TAG: &str = "Pet Friendly";
pub const FURNISHED_TAG: &str = "Furnished";

/// Per-page values every card on the page shares
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// URL of the result page; also the record's referrer
    pub page_url: &'a Url,

    /// Fixed for the whole crawl run
    pub crawl_timestamp: DateTime<Utc>,
}

struct MeasurementReader {
    field: Measurement,
    selector: Selector,
    pipeline: FieldPipeline,
}

/// Postal address pulled from a card's address block
struct Address {
    street: String,
    city: String,
    region: String,
    postal_code: String,
}

/// Compiled selectors and pipelines for listing cards
pub struct ListingExtractor {
    item: Selector,
    card: Selector,
    link: Selector,
    address_script: Selector,
    tags: Selector,
    measurements: Vec<MeasurementReader>,
    text: FieldPipeline,
    coordinate: FieldPipeline,
    listing_prefix: String,
}

impl ListingExtractor {
    /// Compiles every selector and pattern once
    ///
    /// # Arguments
    ///
    /// * `listing_prefix` - Path prefix a card link must have to count as a listing
    pub fn new(listing_prefix: &str) -> Result<Self, HarvestError> {
        let measurements = MEASUREMENT_RULES
            .iter()
            .map(|rule| -> Result<MeasurementReader, HarvestError> {
                Ok(MeasurementReader {
                    field: rule.field,
                    selector: compile(rule.selector)?,
                    pipeline: FieldPipeline::measurement(rule.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            item: compile("li")?,
            card: compile(CARD_SELECTOR)?,
            link: compile("a[href]")?,
            address_script: compile(ADDRESS_SCRIPT_SELECTOR)?,
            tags: compile(TAG_SELECTOR)?,
            measurements,
            text: FieldPipeline::text(),
            coordinate: FieldPipeline::coordinate(),
            listing_prefix: listing_prefix.to_string(),
        })
    }

    /// Listing cards on a page, in document order
    ///
    /// Every `li` that contains a rental card counts, including nested ones.
    pub fn fragments<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        document
            .select(&self.item)
            .filter(move |li| li.select(&self.card).next().is_some())
    }

    /// Extracts one card into a record
    ///
    /// # Steps
    ///
    /// 1. Canonical listing URL from the card's first link, else `NoCanonicalUrl`
    /// 2. Thumbnail from the JSON index; a miss is not an error
    /// 3. Address block; missing, unparsable, or lacking address/geo gives `MissingAddressOrGeo`
    /// 4. Latitude and longitude as floats, else `Format`
    /// 5. Price, sqft, beds and baths; each may be left unset
    /// 6. Pet-friendly and furnished from the amenity tags
    /// 7. Timestamps and referrer
    pub fn extract(
        &self,
        fragment: ElementRef<'_>,
        context: &PageContext<'_>,
        index: &ListingIndex,
    ) -> Result<ListingRecord, SkipReason> {
        let url = self.canonical_url(fragment, context.page_url)?;

        let thumbnail_url = index
            .get(&url)
            .and_then(|entry| entry.photo_url())
            .map(String::from);

        let block = self.address_block(fragment)?;
        let address_json = lookup(&block, &["address"]).ok_or(SkipReason::MissingAddressOrGeo)?;
        let geo = lookup(&block, &["geo"]).ok_or(SkipReason::MissingAddressOrGeo)?;

        let address = self.address(address_json)?;
        let latitude = self.coordinate(geo, "latitude")?;
        let longitude = self.coordinate(geo, "longitude")?;

        let mut price = None;
        let mut sqft = None;
        let mut bedrooms = None;
        let mut bathrooms = None;
        for reader in &self.measurements {
            let value = self.measure(fragment, reader, &url);
            match reader.field {
                Measurement::Price => price = value,
                Measurement::Sqft => sqft = value,
                Measurement::Bedrooms => bedrooms = value,
                Measurement::Bathrooms => bathrooms = value,
            }
        }

        let tags = self.tags(fragment);

        Ok(ListingRecord {
            crawl_timestamp: context.crawl_timestamp,
            parse_timestamp: Utc::now(),
            url: url.into(),
            thumbnail_url,
            referrer_url: context.page_url.to_string(),
            address: address.street,
            city: address.city,
            state: address.region,
            zipcode: address.postal_code,
            latitude,
            longitude,
            price,
            sqft,
            bedrooms,
            bathrooms,
            pet_friendly: tags.contains(PET_FRIENDLY_TAG),
            furnished: tags.contains(FURNISHED_TAG),
        })
    }

    fn canonical_url(&self, fragment: ElementRef<'_>, page_url: &Url) -> Result<Url, SkipReason> {
        fragment
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_href(href, page_url))
            .and_then(|resolved| canonical_listing_url(&resolved, &self.listing_prefix))
            .ok_or(SkipReason::NoCanonicalUrl)
    }

    fn address_block(&self, fragment: ElementRef<'_>) -> Result<Value, SkipReason> {
        let script = fragment
            .select(&self.address_script)
            .next()
            .ok_or(SkipReason::MissingAddressOrGeo)?;
        let text: String = script.text().collect();
        serde_json::from_str(&text).map_err(|_| SkipReason::MissingAddressOrGeo)
    }

    fn address(&self, address: &Value) -> Result<Address, SkipReason> {
        let field = |key: &str| -> Result<String, SkipReason> {
            let raw = lookup_str(address, &[key]).ok_or(SkipReason::MissingAddressOrGeo)?;
            match self.text.run_text([raw]) {
                Ok(Some(FieldValue::Text(value))) => Ok(value),
                _ => Err(SkipReason::MissingAddressOrGeo),
            }
        };

        Ok(Address {
            street: field("streetAddress")?,
            city: field("addressLocality")?,
            region: field("addressRegion")?,
            postal_code: field("postalCode")?,
        })
    }

    fn coordinate(&self, geo: &Value, key: &'static str) -> Result<f64, SkipReason> {
        let raw = match lookup(geo, &[key]).ok_or(SkipReason::MissingAddressOrGeo)? {
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Float)
                .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        };

        self.coordinate
            .run([raw])
            .map_err(|source| SkipReason::Format { field: key, source })?
            .and_then(|value| value.as_float())
            .ok_or(SkipReason::MissingAddressOrGeo)
    }

    fn measure(&self, fragment: ElementRef<'_>, reader: &MeasurementReader, url: &Url) -> Option<i64> {
        let texts = fragment
            .select(&reader.selector)
            .flat_map(|node| node.text());

        match reader.pipeline.run_text(texts) {
            Ok(value) => value.and_then(|v| v.as_int()),
            Err(e) => {
                tracing::debug!("Leaving {} unset for {}: {}", reader.field.as_str(), url, e);
                None
            }
        }
    }

    fn tags(&self, fragment: ElementRef<'_>) -> HashSet<String> {
        fragment
            .select(&self.tags)
            .map(|tag| tag.text().collect::<String>().trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

fn compile(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector(format!("{}: {:?}", selector, e)))
}
