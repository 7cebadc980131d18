//! Handlers for the UDP tracker packets.
//!
//! They turn one inbound datagram into exactly one response frame. Any
//! failure on the way, from a malformed frame to a tracker-level rejection,
//! becomes an `Error` response carrying the transaction id of the request
//! when it is known.
use std::net::{IpAddr, SocketAddr};
use std::panic::{AssertUnwindSafe, Location};

use tracing::debug;

use super::error::Error;
use super::request::{AnnounceRequest, ConnectRequest, Request, ScrapeRequest};
use super::response::{
    AnnounceResponse, ConnectResponse, ErrorResponse, Response, ResponsePeer, ScrapeResponse, TorrentScrapeStatistics,
};
use super::{connection_cookie, AnnounceInterval, NumberOfDownloads, NumberOfPeers, Port, TransactionId};
use crate::core::{PeersWanted, Tracker};
use crate::servers::udp::peer_builder;

/// It handles one inbound UDP packet and always produces a response frame.
///
/// A panic while serving a datagram is caught here and converted into a
/// generic error response, so one bad request cannot take the server down.
#[must_use]
pub fn handle_packet(payload: &[u8], from: SocketAddr, tracker: &Tracker) -> Response {
    match std::panic::catch_unwind(AssertUnwindSafe(|| handle_frame(payload, from, tracker))) {
        Ok(response) => response,
        Err(_) => Response::from(ErrorResponse {
            transaction_id: TransactionId(0),
            message: "internal server error".into(),
        }),
    }
}

fn handle_frame(payload: &[u8], from: SocketAddr, tracker: &Tracker) -> Response {
    match Request::from_bytes(payload) {
        Ok(request) => {
            debug!("udp request: {request:?} from: {from}");

            let transaction_id = request.transaction_id();

            match handle_request(&request, from, tracker) {
                Ok(response) => response,
                Err(e) => handle_error(&e, transaction_id),
            }
        }
        // The frame was too mangled to extract a transaction id from.
        Err(e) => handle_error(&Error::BadRequest { source: e }, TransactionId(0)),
    }
}

/// It dispatches the request to the correct handler.
///
/// # Errors
///
/// Returns an [`enum@Error`] when the request cannot be served; the caller turns
/// it into an error frame.
pub fn handle_request(request: &Request, remote_addr: SocketAddr, tracker: &Tracker) -> Result<Response, Error> {
    match request {
        Request::Connect(connect_request) => handle_connect(remote_addr, connect_request),
        Request::Announce(announce_request) => handle_announce(remote_addr, announce_request, tracker),
        Request::Scrape(scrape_request) => handle_scrape(remote_addr, scrape_request, tracker),
    }
}

/// It handles the `Connect` request, issuing a connection id derived from
/// the client address and the current time slot.
///
/// # Errors
///
/// This function does not ever return an error.
pub fn handle_connect(remote_addr: SocketAddr, request: &ConnectRequest) -> Result<Response, Error> {
    let connection_id = connection_cookie::make(&remote_addr);

    let response = ConnectResponse {
        transaction_id: request.transaction_id,
        connection_id,
    };

    debug!("udp connect response: {response:?}");

    Ok(Response::from(response))
}

/// It handles the `Announce` request.
///
/// # Errors
///
/// Returns an [`enum@Error`] when the connection id does not verify, when the
/// client is only reachable over IPv6, or when the core tracker rejects the
/// announce.
pub fn handle_announce(remote_addr: SocketAddr, request: &AnnounceRequest, tracker: &Tracker) -> Result<Response, Error> {
    connection_cookie::check(&remote_addr, &request.connection_id)?;

    // The wire format packs peers as 4-byte addresses; an IPv6 announcer
    // could never be handed back to the swarm.
    if remote_addr.is_ipv6() && request.ip_address.is_none() {
        return Err(Error::UnsupportedAddressFamily {
            location: Location::caller(),
        });
    }

    let peer_ip = request
        .ip_address
        .map_or_else(|| remote_addr.ip(), IpAddr::V4);

    let mut announcement = peer_builder::from_request(request, &peer_ip);
    let peers_wanted = PeersWanted::from(request.peers_wanted.0);

    let announce_data = tracker
        .announce(&request.info_hash, request.event, &mut announcement, &peer_ip, &peers_wanted)
        .map_err(|source| Error::TrackerError { source })?;

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let response = AnnounceResponse {
        transaction_id: request.transaction_id,
        announce_interval: AnnounceInterval(announce_data.policy.interval as i32),
        leechers: NumberOfPeers(announce_data.stats.incomplete as i32),
        seeders: NumberOfPeers(announce_data.stats.complete as i32),
        peers: announce_data
            .peers
            .iter()
            .filter_map(|peer| {
                // IPv6 peers cannot be represented in the 6-byte tuples.
                if let IpAddr::V4(ip) = peer.peer_addr.ip() {
                    Some(ResponsePeer {
                        ip_address: ip,
                        port: Port(peer.peer_addr.port()),
                    })
                } else {
                    None
                }
            })
            .collect(),
    };

    debug!("udp announce response: {response:?}");

    Ok(Response::from(response))
}

/// It handles the `Scrape` request. The stats are reported in the order the
/// hashes were requested, zeroed for unknown torrents.
///
/// # Errors
///
/// Returns an [`enum@Error`] when the connection id does not verify.
pub fn handle_scrape(remote_addr: SocketAddr, request: &ScrapeRequest, tracker: &Tracker) -> Result<Response, Error> {
    connection_cookie::check(&remote_addr, &request.connection_id)?;

    let scrape_data = tracker.scrape(&request.info_hashes);

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let torrent_stats = request
        .info_hashes
        .iter()
        .map(|info_hash| {
            let metadata = scrape_data.files.get(info_hash).copied().unwrap_or_default();

            TorrentScrapeStatistics {
                seeders: NumberOfPeers(metadata.complete as i32),
                completed: NumberOfDownloads(metadata.downloaded as i32),
                leechers: NumberOfPeers(metadata.incomplete as i32),
            }
        })
        .collect();

    let response = ScrapeResponse {
        transaction_id: request.transaction_id,
        torrent_stats,
    };

    debug!("udp scrape response: {response:?}");

    Ok(Response::from(response))
}

fn handle_error(e: &Error, transaction_id: TransactionId) -> Response {
    debug!("udp error response: {e}");

    Response::from(ErrorResponse {
        transaction_id,
        message: e.to_string().into(),
    })
}
