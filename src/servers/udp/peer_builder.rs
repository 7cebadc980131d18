//! Logic to extract the peer info from the announce request.
use std::net::{IpAddr, SocketAddr};

use storrent_primitives::peer;

use super::request::AnnounceRequest;

/// Extracts the peer info from the announce request.
///
/// `peer_ip` is the resolved peer address: the explicit address in the
/// request when the client supplied one, the datagram source otherwise.
#[must_use]
pub fn from_request(announce_request: &AnnounceRequest, peer_ip: &IpAddr) -> peer::Announcement {
    peer::Announcement {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port.0),
        uploaded: announce_request.bytes_uploaded,
        downloaded: announce_request.bytes_downloaded,
        left: announce_request.bytes_left,
    }
}
