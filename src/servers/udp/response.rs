//! Parsing and writing of the BEP-15 response frames.
//!
//! The announce response packs the swarm counters in the order the protocol
//! mandates: leechers (incomplete) first, then seeders (complete). The peer
//! tuples are 6 bytes each (IPv4 address and port, big-endian), so a valid
//! announce response frame is at least 20 bytes and congruent to 20 modulo 6.
use std::borrow::Cow;
use std::io::{self, Cursor, Write};
use std::net::Ipv4Addr;

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use super::{
    AnnounceInterval, ConnectionId, NumberOfDownloads, NumberOfPeers, Port, TransactionId, ACTION_ANNOUNCE,
    ACTION_CONNECT, ACTION_ERROR, ACTION_SCRAPE,
};

/// The smallest valid announce response: the 20-byte header with no peers.
pub const ANNOUNCE_RESPONSE_MIN_LENGTH: usize = 20;

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ConnectResponse {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct AnnounceResponse {
    pub transaction_id: TransactionId,
    pub announce_interval: AnnounceInterval,
    pub leechers: NumberOfPeers,
    pub seeders: NumberOfPeers,
    pub peers: Vec<ResponsePeer>,
}

/// One peer endpoint in an announce response. The wire format only carries
/// IPv4 addresses.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ResponsePeer {
    pub ip_address: Ipv4Addr,
    pub port: Port,
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct TorrentScrapeStatistics {
    pub seeders: NumberOfPeers,
    pub completed: NumberOfDownloads,
    pub leechers: NumberOfPeers,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ScrapeResponse {
    pub transaction_id: TransactionId,
    pub torrent_stats: Vec<TorrentScrapeStatistics>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ErrorResponse {
    pub transaction_id: TransactionId,
    pub message: Cow<'static, str>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Response {
    Connect(ConnectResponse),
    Announce(AnnounceResponse),
    Scrape(ScrapeResponse),
    Error(ErrorResponse),
}

impl From<ConnectResponse> for Response {
    fn from(r: ConnectResponse) -> Self {
        Self::Connect(r)
    }
}

impl From<AnnounceResponse> for Response {
    fn from(r: AnnounceResponse) -> Self {
        Self::Announce(r)
    }
}

impl From<ScrapeResponse> for Response {
    fn from(r: ScrapeResponse) -> Self {
        Self::Scrape(r)
    }
}

impl From<ErrorResponse> for Response {
    fn from(r: ErrorResponse) -> Self {
        Self::Error(r)
    }
}

/// Why an inbound response frame was rejected.
#[derive(Error, Debug)]
pub enum ParseResponseError {
    #[error("truncated frame: {source}")]
    TruncatedFrame { source: io::Error },

    #[error("invalid announce response length {len}")]
    InvalidAnnounceResponseLength { len: usize },

    #[error("invalid scrape response length {len}")]
    InvalidScrapeResponseLength { len: usize },

    #[error("unknown action {action}")]
    UnknownAction { action: i32 },
}

impl From<io::Error> for ParseResponseError {
    fn from(source: io::Error) -> Self {
        Self::TruncatedFrame { source }
    }
}

impl Response {
    /// Writes the wire form of the response.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` when the underlying writer fails.
    pub fn write(&self, bytes: &mut impl Write) -> Result<(), io::Error> {
        match self {
            Response::Connect(r) => {
                bytes.write_i32::<NetworkEndian>(ACTION_CONNECT)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;
                bytes.write_i64::<NetworkEndian>(r.connection_id.0)?;
            }
            Response::Announce(r) => {
                bytes.write_i32::<NetworkEndian>(ACTION_ANNOUNCE)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;
                bytes.write_i32::<NetworkEndian>(r.announce_interval.0)?;

                // Leechers (incomplete) come first, before seeders (complete).
                bytes.write_i32::<NetworkEndian>(r.leechers.0)?;
                bytes.write_i32::<NetworkEndian>(r.seeders.0)?;

                for peer in &r.peers {
                    bytes.write_all(&peer.ip_address.octets())?;
                    bytes.write_u16::<NetworkEndian>(peer.port.0)?;
                }
            }
            Response::Scrape(r) => {
                bytes.write_i32::<NetworkEndian>(ACTION_SCRAPE)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;

                for torrent_stat in &r.torrent_stats {
                    bytes.write_i32::<NetworkEndian>(torrent_stat.seeders.0)?;
                    bytes.write_i32::<NetworkEndian>(torrent_stat.completed.0)?;
                    bytes.write_i32::<NetworkEndian>(torrent_stat.leechers.0)?;
                }
            }
            Response::Error(r) => {
                bytes.write_i32::<NetworkEndian>(ACTION_ERROR)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;

                bytes.write_all(r.message.as_bytes())?;
            }
        }

        Ok(())
    }

    /// Parses an inbound response frame.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseResponseError`] for truncated frames, an unknown
    /// action, or an announce/scrape frame whose length does not satisfy the
    /// protocol length laws.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseResponseError> {
        let mut cursor = Cursor::new(bytes);

        let action = cursor.read_i32::<NetworkEndian>()?;
        let transaction_id = TransactionId(cursor.read_i32::<NetworkEndian>()?);

        match action {
            ACTION_CONNECT => {
                let connection_id = ConnectionId(cursor.read_i64::<NetworkEndian>()?);

                Ok((ConnectResponse {
                    connection_id,
                    transaction_id,
                })
                .into())
            }
            ACTION_ANNOUNCE => {
                if bytes.len() < ANNOUNCE_RESPONSE_MIN_LENGTH
                    || (bytes.len() - ANNOUNCE_RESPONSE_MIN_LENGTH) % 6 != 0
                {
                    return Err(ParseResponseError::InvalidAnnounceResponseLength { len: bytes.len() });
                }

                let announce_interval = AnnounceInterval(cursor.read_i32::<NetworkEndian>()?);
                let leechers = NumberOfPeers(cursor.read_i32::<NetworkEndian>()?);
                let seeders = NumberOfPeers(cursor.read_i32::<NetworkEndian>()?);

                let position = usize::try_from(cursor.position()).expect("the header is a few bytes");
                let peers = bytes[position..]
                    .chunks_exact(6)
                    .map(|chunk| {
                        let ip_bytes: [u8; 4] = chunk[..4].try_into().expect("a chunk has exactly 6 bytes");
                        let port = u16::from_be_bytes(chunk[4..].try_into().expect("a chunk has exactly 6 bytes"));

                        ResponsePeer {
                            ip_address: Ipv4Addr::from(ip_bytes),
                            port: Port(port),
                        }
                    })
                    .collect();

                Ok((AnnounceResponse {
                    transaction_id,
                    announce_interval,
                    leechers,
                    seeders,
                    peers,
                })
                .into())
            }
            ACTION_SCRAPE => {
                let position = usize::try_from(cursor.position()).expect("the header is a few bytes");
                let tail = &bytes[position..];

                if tail.len() % 12 != 0 {
                    return Err(ParseResponseError::InvalidScrapeResponseLength { len: bytes.len() });
                }

                let torrent_stats = tail
                    .chunks_exact(12)
                    .map(|chunk| {
                        let mut cursor: Cursor<&[u8]> = Cursor::new(chunk);

                        let seeders = cursor.read_i32::<NetworkEndian>().expect("a chunk has exactly 12 bytes");
                        let completed = cursor.read_i32::<NetworkEndian>().expect("a chunk has exactly 12 bytes");
                        let leechers = cursor.read_i32::<NetworkEndian>().expect("a chunk has exactly 12 bytes");

                        TorrentScrapeStatistics {
                            seeders: NumberOfPeers(seeders),
                            completed: NumberOfDownloads(completed),
                            leechers: NumberOfPeers(leechers),
                        }
                    })
                    .collect();

                Ok((ScrapeResponse {
                    transaction_id,
                    torrent_stats,
                })
                .into())
            }
            ACTION_ERROR => {
                let position = usize::try_from(cursor.position()).expect("the header is a few bytes");

                Ok((ErrorResponse {
                    transaction_id,
                    message: String::from_utf8_lossy(&bytes[position..]).into_owned().into(),
                })
                .into())
            }
            action => Err(ParseResponseError::UnknownAction { action }),
        }
    }
}
