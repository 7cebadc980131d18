//! The `announce` service for the HTTP tracker.
//!
//! It glues a parsed [`Announce`] request to the core tracker and renders
//! the bencoded response body. Tracker-level failures become `failure
//! reason` bodies; the delivery layer always answers `200 OK` either way.
use std::net::{IpAddr, SocketAddr};

use storrent_primitives::peer;
use storrent_primitives::NumberOfBytes;

use crate::core::{AnnounceData, PeersWanted, Tracker};
use crate::servers::http::v1::requests::announce::{Announce, Compact};
use crate::servers::http::v1::responses;

/// Handles a parsed announce request. `source_ip` is the address the request
/// arrived from, used as the peer address unless the client supplied an
/// explicit `ip` override.
#[must_use]
pub fn handle(tracker: &Tracker, request: &Announce, source_ip: IpAddr) -> Vec<u8> {
    let announce_data = match invoke(tracker, request, source_ip) {
        Ok(announce_data) => announce_data,
        Err(failure) => return failure.body(),
    };

    match request.compact {
        Some(Compact::Accepted) => responses::announce::Compact::from(announce_data).body(),
        _ => responses::announce::Normal::from(announce_data).body(),
    }
}

fn invoke(tracker: &Tracker, request: &Announce, source_ip: IpAddr) -> Result<AnnounceData, responses::error::Error> {
    // An explicit `ip` param wins over the request source, for clients that
    // announce through a gateway and know their reachable address.
    let peer_ip = request.ip.unwrap_or(source_ip);

    let mut announcement = peer_announcement_from(request, peer_ip);
    let peers_wanted = request.numwant.map_or(PeersWanted::AsManyAsPossible, PeersWanted::from);

    tracker
        .announce(
            &request.info_hash,
            request.announce_event(),
            &mut announcement,
            &peer_ip,
            &peers_wanted,
        )
        .map_err(|err| responses::error::Error {
            failure_reason: format!("Tracker error: {err}"),
        })
}

/// Extracts the peer info from the announce request. Missing byte counters
/// default to zero.
fn peer_announcement_from(request: &Announce, peer_ip: IpAddr) -> peer::Announcement {
    peer::Announcement {
        peer_id: request.peer_id,
        peer_addr: SocketAddr::new(peer_ip, request.port),
        uploaded: NumberOfBytes(request.uploaded.unwrap_or(0)),
        downloaded: NumberOfBytes(request.downloaded.unwrap_or(0)),
        left: NumberOfBytes(request.left.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use storrent_configuration::Core;
    use storrent_primitives::torrent::fixture::sample_torrent;

    use crate::core::Tracker;
    use crate::servers::http::v1::query::Query;
    use crate::servers::http::v1::requests::announce::Announce;
    use crate::servers::http::v1::services::announce::handle;

    fn sample_announce_query(event: &str) -> Query {
        Query::from(vec![
            ("info_hash", "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0"),
            ("peer_id", "-qB00000000000000001"),
            ("port", "17548"),
            ("uploaded", "0"),
            ("downloaded", "0"),
            ("left", "100"),
            ("event", event),
        ])
    }

    fn source_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1))
    }

    #[test]
    fn it_should_answer_a_started_announce_with_a_bencoded_peer_list() {
        let tracker = Tracker::new(&Core::default()).unwrap();
        tracker.register_torrent(sample_torrent());

        let request = Announce::try_from(sample_announce_query("started")).unwrap();

        let body = handle(&tracker, &request, source_ip());

        // The first peer gets an empty peer list back.
        // cspell:disable-next-line
        assert_eq!(body, b"d8:completei0e10:incompletei1e8:intervali10e5:peerslee");
    }

    #[test]
    fn it_should_answer_an_announce_for_an_unregistered_torrent_with_a_failure_reason() {
        let tracker = Tracker::new(&Core::default()).unwrap();

        let request = Announce::try_from(sample_announce_query("started")).unwrap();

        let body = handle(&tracker, &request, source_ip());

        assert!(String::from_utf8(body).unwrap().starts_with("d14:failure reason"));
    }

    #[test]
    fn it_should_answer_in_compact_format_when_the_client_asks_for_it() {
        let tracker = Tracker::new(&Core::default()).unwrap();
        tracker.register_torrent(sample_torrent());

        let query = Query::from(vec![
            ("info_hash", "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0"),
            ("peer_id", "-qB00000000000000001"),
            ("port", "17548"),
            ("event", "started"),
            ("compact", "1"),
        ]);
        let request = Announce::try_from(query).unwrap();

        let body = handle(&tracker, &request, source_ip());

        // Compact responses carry `peers` as a byte string, not a list.
        // cspell:disable-next-line
        assert_eq!(body, b"d8:completei1e10:incompletei0e8:intervali10e5:peers0:6:peers60:e");
    }
}
