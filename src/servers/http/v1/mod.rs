//! Version 1 of the HTTP tracker protocol surface: the URL query parser, the
//! request types, the bencoded responses and the services gluing them to the
//! core tracker.
pub mod query;
pub mod requests;
pub mod responses;
pub mod services;
