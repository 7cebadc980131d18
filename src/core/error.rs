//! Errors returned by the core tracker.
//!
//! They are protocol-level failures, not server failures: the delivery layer
//! renders them as a tracker error response (`failure reason` over HTTP, an
//! error frame over UDP) and keeps serving.
use std::panic::Location;

use storrent_primitives::info_hash::InfoHash;

/// Error returned by the core tracker when an announce cannot be served.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The announced info-hash was never registered. Swarms are created by
    /// registration only, never implicitly by an announce.
    #[error("the torrent {info_hash} is not tracked by this tracker, {location}")]
    UnknownTorrent {
        info_hash: InfoHash,
        location: &'static Location<'static>,
    },

    /// A `completed` or interval announce arrived for a peer that never
    /// announced `started`.
    #[error("missing 'started' event: {source}")]
    MissingStartedEvent {
        #[source]
        source: storrent_torrent_repository::error::Error,
    },
}
