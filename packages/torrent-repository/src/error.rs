use std::panic::Location;

use storrent_configuration::MIN_ANNOUNCE_INTERVAL_SECONDS;
use thiserror::Error;

/// Errors returned by the swarm registry.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A `completed` or interval announce arrived for a peer the swarm has
    /// never seen start. The tracker reports this back to the client instead
    /// of silently adopting the peer.
    #[error("peer {hex_peer_id} is not tracked in this swarm, {location}")]
    UnknownPeer {
        hex_peer_id: String,
        location: &'static Location<'static>,
    },

    #[error("invalid announce interval: {interval} seconds, the minimum is {MIN_ANNOUNCE_INTERVAL_SECONDS} seconds, {location}")]
    InvalidInterval {
        interval: u32,
        location: &'static Location<'static>,
    },
}
