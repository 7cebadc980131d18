//! Peer types used by the swarm registry.
//!
//! A [`Peer`] is the record the tracker keeps for each client exchanging on a
//! torrent. It is built from the data the client reports in its `announce`
//! requests plus the tracker's own bookkeeping (lifecycle state and the last
//! announce timestamp).
use std::net::{IpAddr, SocketAddr};
use std::panic::Location;
use std::time::Duration;

use thiserror::Error;

use crate::{DurationSinceUnixEpoch, NumberOfBytes};

pub const PEER_ID_BYTES_LEN: usize = 20;

/// The opaque 20-byte identifier a client chooses for itself.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Id(pub [u8; 20]);

impl Id {
    /// Canonical lowercase hex rendering of the id.
    ///
    /// For the id `-qB00000000000000000` it returns
    /// `2d71423030303030303030303030303030303030`. This rendering is the key
    /// of the peer in its swarm, so it must be a pure function of the raw
    /// bytes.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut chars = [0u8; PEER_ID_BYTES_LEN * 2];
        binascii::bin2hex(&self.0, &mut chars).expect("output buffer should fit 40 hex chars");
        std::str::from_utf8(&chars)
            .expect("hex digits should be valid utf-8")
            .to_owned()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl From<[u8; 20]> for Id {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Error returned when trying to convert an invalid peer id from another type.
///
/// Usually because the source format does not contain 20 bytes.
#[derive(Error, Debug)]
pub enum IdConversionError {
    #[error("not enough bytes for peer id: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    #[error("too many bytes for peer id: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

impl TryFrom<Vec<u8>> for Id {
    type Error = IdConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < PEER_ID_BYTES_LEN {
            return Err(IdConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), PEER_ID_BYTES_LEN},
            });
        }
        if bytes.len() > PEER_ID_BYTES_LEN {
            return Err(IdConversionError::TooManyBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), PEER_ID_BYTES_LEN},
            });
        }
        let mut data = [0u8; PEER_ID_BYTES_LEN];
        data.copy_from_slice(&bytes);
        Ok(Self(data))
    }
}

impl std::str::FromStr for Id {
    type Err = IdConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.as_bytes().to_vec().try_into()
    }
}

/// Lifecycle state of a tracked peer, derived from the announce events the
/// tracker has observed for it.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum PeerState {
    /// No event has been processed for the peer yet.
    Unknown,
    /// The peer is downloading (it announced `started`, or re-announced on
    /// the regular interval).
    Started,
    /// The peer has the complete torrent data. Completed peers are the swarm
    /// seeders.
    Completed,
    /// The peer announced `stopped` and has left the swarm.
    Stopped,
}

/// The record the tracker keeps for a peer exchanging on a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    /// ID chosen by the downloader peer.
    pub peer_id: Id,
    /// The IP and port this peer is listening on.
    pub peer_addr: SocketAddr,
    /// The last time the tracker received an announce request from this peer.
    pub updated: DurationSinceUnixEpoch,
    /// The total amount of bytes uploaded by this peer so far.
    pub uploaded: NumberOfBytes,
    /// The total amount of bytes downloaded by this peer so far.
    pub downloaded: NumberOfBytes,
    /// The number of bytes this peer still has to download.
    pub left: NumberOfBytes,
    /// The lifecycle state derived from the peer's announce events.
    pub state: PeerState,
}

impl Peer {
    /// A peer counts as a seeder once it has announced completion.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.state == PeerState::Completed
    }

    /// A peer is fresh while its last announce is younger than twice the
    /// swarm announce interval. Stale peers are evicted by the collector and
    /// are never served in announce responses.
    #[must_use]
    pub fn is_fresh(&self, now: DurationSinceUnixEpoch, announce_interval: u32) -> bool {
        match now.checked_sub(self.updated) {
            Some(age) => age < Duration::from_secs(u64::from(announce_interval) * 2),
            // A peer announced "in the future" relative to our clock; keep it.
            None => true,
        }
    }

    /// Two peers look like the same client when they share the reachable
    /// endpoint, whatever their ids claim.
    #[must_use]
    pub fn same_endpoint(&self, other: &Peer) -> bool {
        self.peer_addr == other.peer_addr
    }

    /// Two peers are the same identity only when their ids match.
    #[must_use]
    pub fn same_identity(&self, other: &Peer) -> bool {
        self.peer_id == other.peer_id
    }

    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.peer_addr.ip()
    }

    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.peer_addr = SocketAddr::new(*new_ip, self.peer_addr.port());
    }
}

/// The peer-supplied half of an announce request, before the registry has
/// assigned a lifecycle state and a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub peer_id: Id,
    pub peer_addr: SocketAddr,
    pub uploaded: NumberOfBytes,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,
}

impl Announcement {
    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.peer_addr = SocketAddr::new(*new_ip, self.peer_addr.port());
    }
}

pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use super::{Announcement, Id, Peer, PeerState};
    use crate::{DurationSinceUnixEpoch, NumberOfBytes};

    #[derive(PartialEq, Debug)]
    pub struct PeerBuilder {
        peer: Peer,
    }

    #[allow(clippy::derivable_impls)]
    impl Default for PeerBuilder {
        fn default() -> Self {
            Self { peer: Peer::default() }
        }
    }

    impl PeerBuilder {
        #[must_use]
        pub fn seeder() -> Self {
            let peer = Peer {
                peer_id: Id(*b"-qB00000000000000001"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(0),
                state: PeerState::Completed,
            };

            Self { peer }
        }

        #[must_use]
        pub fn leecher() -> Self {
            let peer = Peer {
                peer_id: Id(*b"-qB00000000000000002"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(10),
                state: PeerState::Started,
            };

            Self { peer }
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: &Id) -> Self {
            self.peer.peer_id = *peer_id;
            self
        }

        #[must_use]
        pub fn with_peer_addr(mut self, peer_addr: &SocketAddr) -> Self {
            self.peer.peer_addr = *peer_addr;
            self
        }

        #[must_use]
        pub fn with_bytes_pending_to_download(mut self, left: i64) -> Self {
            self.peer.left = NumberOfBytes(left);
            self
        }

        #[must_use]
        pub fn last_updated_on(mut self, updated: DurationSinceUnixEpoch) -> Self {
            self.peer.updated = updated;
            self
        }

        #[must_use]
        pub fn build(self) -> Peer {
            self.peer
        }
    }

    impl Default for Peer {
        fn default() -> Self {
            Self {
                peer_id: Id(*b"-qB00000000000000000"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(0),
                state: PeerState::Started,
            }
        }
    }

    impl Default for Announcement {
        fn default() -> Self {
            Self {
                peer_id: Id(*b"-qB00000000000000000"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(0),
            }
        }
    }
}
