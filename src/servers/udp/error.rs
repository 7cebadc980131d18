use std::panic::Location;

use thiserror::Error;

use crate::servers::udp::request::ParseRequestError;

/// Errors the UDP delivery layer turns into BEP-15 error frames.
#[derive(Error, Debug)]
pub enum Error {
    #[error("bad request: {source}")]
    BadRequest { source: ParseRequestError },

    #[error("connection id could not be verified")]
    InvalidConnectionId { location: &'static Location<'static> },

    /// The announcing client is only reachable over IPv6, which the 6-byte
    /// peer tuples of this wire format cannot carry.
    #[error("IPv6 peers are not supported by the UDP tracker")]
    UnsupportedAddressFamily { location: &'static Location<'static> },

    #[error("tracker error: {source}")]
    TrackerError { source: crate::core::error::Error },

    #[error("internal server error")]
    InternalServer { location: &'static Location<'static> },
}
