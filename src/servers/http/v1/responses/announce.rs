//! `Announce` response for the HTTP tracker [`announce`](crate::servers::http::v1::requests::announce::Announce) request.
//!
//! Data structures and logic to build the `announce` response.
use std::net::IpAddr;
use std::sync::Arc;

use storrent_bencode::{ben_bytes, ben_int, ben_map, Bencode};
use storrent_primitives::peer;
use storrent_primitives::swarm_metadata::SwarmMetadata;

use crate::core::AnnounceData;

/// Normal (non compact) `announce` response.
///
/// It's a bencoded dictionary.
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
/// use storrent::servers::http::v1::responses::announce::{Normal, NormalPeer};
/// use storrent_primitives::swarm_metadata::SwarmMetadata;
///
/// let response = Normal {
///     interval: 111,
///     stats: SwarmMetadata {
///         downloaded: 0,
///         complete: 333,
///         incomplete: 444,
///     },
///     peers: vec![
///         // IPV4
///         NormalPeer {
///             peer_id: *b"-qB00000000000000001",
///             ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)), // 105.105.105.105
///             port: 0x7070,                                          // 28784
///         },
///         // IPV6
///         NormalPeer {
///             peer_id: *b"-qB00000000000000002",
///             ip: IpAddr::V6(Ipv6Addr::new(0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969)),
///             port: 0x7070, // 28784
///         },
///     ],
/// };
///
/// let bytes = response.body();
///
/// // The expected bencoded response.
/// // cspell:disable-next-line
/// let expected_bytes = b"d8:completei333e10:incompletei444e8:intervali111e5:peersld2:ip15:105.105.105.1057:peer id20:-qB000000000000000014:porti28784eed2:ip39:6969:6969:6969:6969:6969:6969:6969:69697:peer id20:-qB000000000000000024:porti28784eeee";
///
/// assert_eq!(
///     String::from_utf8(bytes).unwrap(),
///     String::from_utf8(expected_bytes.to_vec()).unwrap()
/// );
/// ```
///
/// Refer to [BEP 03: The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
/// for more information.
#[derive(Debug, PartialEq)]
pub struct Normal {
    /// Seconds the client should wait before the next regular announce.
    pub interval: u32,
    pub stats: SwarmMetadata,
    pub peers: Vec<NormalPeer>,
}

/// Peer information in the [`Normal`] response.
#[derive(Debug, PartialEq)]
pub struct NormalPeer {
    /// The peer's ID.
    pub peer_id: [u8; 20],
    /// The peer's IP address.
    pub ip: IpAddr,
    /// The peer's port number.
    pub port: u16,
}

impl NormalPeer {
    #[must_use]
    pub fn ben_map(&self) -> Bencode {
        ben_map! {
            "peer id" => ben_bytes!(self.peer_id.to_vec()),
            "ip" => ben_bytes!(self.ip.to_string()),
            "port" => ben_int!(i64::from(self.port))
        }
    }
}

impl From<&Arc<peer::Peer>> for NormalPeer {
    fn from(peer: &Arc<peer::Peer>) -> Self {
        NormalPeer {
            peer_id: peer.peer_id.0,
            ip: peer.peer_addr.ip(),
            port: peer.peer_addr.port(),
        }
    }
}

impl Normal {
    /// Returns the bencoded body of the non-compact response.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let peers: Vec<Bencode> = self.peers.iter().map(NormalPeer::ben_map).collect();

        (ben_map! {
            "complete" => ben_int!(i64::from(self.stats.complete)),
            "incomplete" => ben_int!(i64::from(self.stats.incomplete)),
            "interval" => ben_int!(i64::from(self.interval)),
            "peers" => Bencode::List(peers)
        })
        .encode()
    }
}

impl From<AnnounceData> for Normal {
    fn from(domain_announce_response: AnnounceData) -> Self {
        let peers: Vec<NormalPeer> = domain_announce_response.peers.iter().map(NormalPeer::from).collect();

        Self {
            interval: domain_announce_response.policy.interval,
            stats: domain_announce_response.stats,
            peers,
        }
    }
}

/// Compact `announce` response.
///
/// _"To reduce the size of tracker responses and to reduce memory and
/// computational requirements in trackers, trackers may return peers as a
/// packed string rather than as a bencoded list."_
///
/// The `peers` value is a byte string of 6-byte IPv4 + port tuples. IPv6
/// peers go to the `peers6` key as 18-byte tuples.
///
/// Refer to the official BEPs for more information:
///
/// - [BEP 23: Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
/// - [BEP 07: IPv6 Tracker Extension](https://www.bittorrent.org/beps/bep_0007.html)
#[derive(Debug, PartialEq)]
pub struct Compact {
    /// Seconds the client should wait before the next regular announce.
    pub interval: u32,
    pub stats: SwarmMetadata,
    pub peers: Vec<CompactPeer>,
}

/// Compact peer. It's used in the [`Compact`] response.
///
/// Compact peers are packed by endpoint only; this format does not carry the
/// peer's ID.
#[derive(Debug, PartialEq)]
pub struct CompactPeer {
    /// The peer's IP address.
    pub ip: IpAddr,
    /// The peer's port number.
    pub port: u16,
}

impl CompactPeer {
    /// The peer endpoint packed big-endian: 4 or 16 address bytes followed
    /// by 2 port bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        match self.ip {
            IpAddr::V4(ip) => {
                bytes.extend_from_slice(&u32::from(ip).to_be_bytes());
            }
            IpAddr::V6(ip) => {
                bytes.extend_from_slice(&u128::from(ip).to_be_bytes());
            }
        }
        bytes.extend_from_slice(&self.port.to_be_bytes());
        bytes
    }
}

impl From<&Arc<peer::Peer>> for CompactPeer {
    fn from(peer: &Arc<peer::Peer>) -> Self {
        CompactPeer {
            ip: peer.peer_addr.ip(),
            port: peer.peer_addr.port(),
        }
    }
}

impl Compact {
    /// Returns the bencoded compact response as a byte vector.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        (ben_map! {
            "complete" => ben_int!(i64::from(self.stats.complete)),
            "incomplete" => ben_int!(i64::from(self.stats.incomplete)),
            "interval" => ben_int!(i64::from(self.interval)),
            "peers" => ben_bytes!(self.peers_v4_bytes()),
            "peers6" => ben_bytes!(self.peers_v6_bytes())
        })
        .encode()
    }

    fn peers_v4_bytes(&self) -> Vec<u8> {
        self.peers
            .iter()
            .filter(|compact_peer| compact_peer.ip.is_ipv4())
            .flat_map(CompactPeer::bytes)
            .collect()
    }

    fn peers_v6_bytes(&self) -> Vec<u8> {
        self.peers
            .iter()
            .filter(|compact_peer| compact_peer.ip.is_ipv6())
            .flat_map(CompactPeer::bytes)
            .collect()
    }
}

impl From<AnnounceData> for Compact {
    fn from(domain_announce_response: AnnounceData) -> Self {
        let peers: Vec<CompactPeer> = domain_announce_response.peers.iter().map(CompactPeer::from).collect();

        Self {
            interval: domain_announce_response.policy.interval,
            stats: domain_announce_response.stats,
            peers,
        }
    }
}

#[cfg(test)]
mod tests {

    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use storrent_primitives::swarm_metadata::SwarmMetadata;

    use super::{Compact, CompactPeer, Normal, NormalPeer};

    // Some ascii values used in tests:
    //
    // +-----------------+
    // | Dec | Hex | Chr |
    // +-----------------+
    // | 105 | 69  | i   |
    // | 112 | 70  | p   |
    // +-----------------+
    //
    // IP addresses and port numbers used in tests are chosen so that their
    // bencoded representation is also a valid string which makes asserts more
    // readable.

    #[test]
    fn normal_announce_response_can_be_bencoded() {
        let response = Normal {
            interval: 111,
            stats: SwarmMetadata {
                downloaded: 0,
                complete: 333,
                incomplete: 444,
            },
            peers: vec![
                // IPV4
                NormalPeer {
                    peer_id: *b"-qB00000000000000001",
                    ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)), // 105.105.105.105
                    port: 0x7070,                                          // 28784
                },
                // IPV6
                NormalPeer {
                    peer_id: *b"-qB00000000000000002",
                    ip: IpAddr::V6(Ipv6Addr::new(0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969)),
                    port: 0x7070, // 28784
                },
            ],
        };

        let bytes = response.body();

        // cspell:disable-next-line
        let expected_bytes = b"d8:completei333e10:incompletei444e8:intervali111e5:peersld2:ip15:105.105.105.1057:peer id20:-qB000000000000000014:porti28784eed2:ip39:6969:6969:6969:6969:6969:6969:6969:69697:peer id20:-qB000000000000000024:porti28784eeee";

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            String::from_utf8(expected_bytes.to_vec()).unwrap()
        );
    }

    #[test]
    fn compact_announce_response_can_be_bencoded() {
        let response = Compact {
            interval: 111,
            stats: SwarmMetadata {
                downloaded: 0,
                complete: 333,
                incomplete: 444,
            },
            peers: vec![
                // IPV4
                CompactPeer {
                    ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)), // 105.105.105.105
                    port: 0x7070,                                          // 28784
                },
                // IPV6
                CompactPeer {
                    ip: IpAddr::V6(Ipv6Addr::new(0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969)),
                    port: 0x7070, // 28784
                },
            ],
        };

        let bytes = response.body();

        let expected_bytes =
            // cspell:disable-next-line
            b"d8:completei333e10:incompletei444e8:intervali111e5:peers6:iiiipp6:peers618:iiiiiiiiiiiiiiiippe";

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            String::from_utf8(expected_bytes.to_vec()).unwrap()
        );
    }
}
