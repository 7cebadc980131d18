//! The `scrape` service for the HTTP tracker.
//!
//! Unknown torrents are reported with zeroed metadata, so a scrape never
//! fails once the query parses.
use crate::core::Tracker;
use crate::servers::http::v1::requests::scrape::Scrape;
use crate::servers::http::v1::responses;

/// Handles a parsed scrape request and renders the bencoded response body.
#[must_use]
pub fn handle(tracker: &Tracker, request: &Scrape) -> Vec<u8> {
    let scrape_data = tracker.scrape(&request.info_hashes);

    responses::scrape::Scrape::from(scrape_data).body()
}
