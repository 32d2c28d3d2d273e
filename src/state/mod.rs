//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the controller's Idle / Fetching / Processing lifecycle
//! - `Pacer`: minimum delay between successive fetch dispatches

mod crawl_state;
mod pacer;

pub use crawl_state::CrawlState;
pub use pacer::Pacer;
