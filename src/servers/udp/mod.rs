//! UDP tracker message model, following the
//! [BEP 15. UDP Tracker Protocol for `BitTorrent`](https://www.bittorrent.org/beps/bep_0015.html)
//! wire format.
//!
//! All integers are big-endian. A client first obtains a connection id:
//!
//! ```text
//! Connect request (16 bytes):          Connect response (16 bytes):
//! 0   i64 protocol id 0x41727101980    0   i32 action   0
//! 8   i32 action      0                4   i32 transaction id
//! 12  i32 transaction id               8   i64 connection id
//! ```
//!
//! and then announces with it:
//!
//! ```text
//! Announce request (98 bytes):         Announce response (20 + 6 * n bytes):
//! 0   i64 connection id                0   i32 action   1
//! 8   i32 action      1                4   i32 transaction id
//! 12  i32 transaction id               8   i32 interval
//! 16  20-byte info hash                12  i32 leechers (incomplete)
//! 36  20-byte peer id                  16  i32 seeders  (complete)
//! 56  i64 downloaded                   20  4-byte IPv4 + 2-byte port, n times
//! 64  i64 left
//! 72  i64 uploaded
//! 80  i32 event (0 none, 1 completed, 2 started, 3 stopped)
//! 84  u32 ip (0 = use source address)
//! 88  u32 key
//! 92  i32 num want (-1 = default)
//! 96  u16 port
//! ```
//!
//! Note the field order in the announce response: leechers before seeders.
//! The scrape response carries 12 bytes (seeders, completed, leechers) per
//! requested torrent, and an error response is the action `3`, the
//! transaction id and the message bytes to the end of the frame.
//!
//! The peer tuples are IPv4-only. Peers reachable over IPv6 are not
//! representable in this wire format and are excluded from responses.
pub mod connection_cookie;
pub mod error;
pub mod handlers;
pub mod peer_builder;
pub mod request;
pub mod response;

pub const ACTION_CONNECT: i32 = 0;
pub const ACTION_ANNOUNCE: i32 = 1;
pub const ACTION_SCRAPE: i32 = 2;
pub const ACTION_ERROR: i32 = 3;

/// Magic constant identifying connect requests, in place of a connection id.
pub const PROTOCOL_ID: i64 = 0x0417_2710_1980;

/// The maximum number of torrents in a single scrape request.
pub const MAX_SCRAPE_TORRENTS: usize = 74;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ConnectionId(pub i64);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct TransactionId(pub i32);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AnnounceInterval(pub i32);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NumberOfPeers(pub i32);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NumberOfDownloads(pub i32);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Port(pub u16);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PeerKey(pub u32);
