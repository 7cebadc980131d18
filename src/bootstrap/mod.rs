//! Background jobs the tracker runs next to the request path.
pub mod jobs;
