//! HTTP tracker message model.
//!
//! Announce and scrape requests arrive as URL query strings
//! (`GET /announce?info_hash=...&peer_id=...`). Responses are bencoded
//! dictionaries sent with `Content-Type: text/plain`. Tracker-level failures
//! are reported in-band with a `failure reason` dictionary and a `200 OK`
//! status; the HTTP status never carries tracker semantics.
pub mod percent_encoding;
pub mod v1;
