//! Parsing and writing of the BEP-15 request frames.
//!
//! The tracker only parses requests, but the writer side is kept so a client
//! (or a test) can produce the exact bytes the parser accepts.
use std::io::{self, Cursor, Read, Write};
use std::net::Ipv4Addr;

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use storrent_primitives::announce_event::AnnounceEvent;
use storrent_primitives::info_hash::InfoHash;
use storrent_primitives::peer;
use storrent_primitives::NumberOfBytes;
use thiserror::Error;

use super::{
    ConnectionId, NumberOfPeers, PeerKey, Port, TransactionId, ACTION_ANNOUNCE, ACTION_CONNECT, ACTION_SCRAPE,
    MAX_SCRAPE_TORRENTS, PROTOCOL_ID,
};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ConnectRequest {
    pub transaction_id: TransactionId,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct AnnounceRequest {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub bytes_downloaded: NumberOfBytes,
    pub bytes_uploaded: NumberOfBytes,
    pub bytes_left: NumberOfBytes,
    pub event: AnnounceEvent,
    /// Explicit IPv4 address of the announcing peer; `0` on the wire means
    /// "use the source address of the datagram".
    pub ip_address: Option<Ipv4Addr>,
    pub key: PeerKey,
    pub peers_wanted: NumberOfPeers,
    pub port: Port,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ScrapeRequest {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
    pub info_hashes: Vec<InfoHash>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Request {
    Connect(ConnectRequest),
    Announce(AnnounceRequest),
    Scrape(ScrapeRequest),
}

impl From<ConnectRequest> for Request {
    fn from(r: ConnectRequest) -> Self {
        Self::Connect(r)
    }
}

impl From<AnnounceRequest> for Request {
    fn from(r: AnnounceRequest) -> Self {
        Self::Announce(r)
    }
}

impl From<ScrapeRequest> for Request {
    fn from(r: ScrapeRequest) -> Self {
        Self::Scrape(r)
    }
}

/// Why an inbound frame was rejected.
#[derive(Error, Debug)]
pub enum ParseRequestError {
    #[error("truncated frame: {source}")]
    TruncatedFrame { source: io::Error },

    #[error("connect request without the protocol identifier")]
    MissingProtocolId,

    #[error("invalid announce event {event}")]
    InvalidEvent { event: i32 },

    #[error("unknown action {action}")]
    UnknownAction { action: i32 },

    #[error("a scrape request must carry 1 to {MAX_SCRAPE_TORRENTS} info-hashes, got {count}")]
    InvalidScrapeTorrentCount { count: usize },
}

impl From<io::Error> for ParseRequestError {
    fn from(source: io::Error) -> Self {
        Self::TruncatedFrame { source }
    }
}

impl Request {
    /// The transaction id of any request kind, echoed back in responses.
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            Request::Connect(r) => r.transaction_id,
            Request::Announce(r) => r.transaction_id,
            Request::Scrape(r) => r.transaction_id,
        }
    }

    /// Writes the wire form of the request.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` when the underlying writer fails.
    pub fn write(&self, bytes: &mut impl Write) -> Result<(), io::Error> {
        match self {
            Request::Connect(r) => {
                bytes.write_i64::<NetworkEndian>(PROTOCOL_ID)?;
                bytes.write_i32::<NetworkEndian>(ACTION_CONNECT)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;
            }

            Request::Announce(r) => {
                bytes.write_i64::<NetworkEndian>(r.connection_id.0)?;
                bytes.write_i32::<NetworkEndian>(ACTION_ANNOUNCE)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;

                bytes.write_all(&r.info_hash.0)?;
                bytes.write_all(&r.peer_id.0)?;

                bytes.write_i64::<NetworkEndian>(r.bytes_downloaded.0)?;
                bytes.write_i64::<NetworkEndian>(r.bytes_left.0)?;
                bytes.write_i64::<NetworkEndian>(r.bytes_uploaded.0)?;

                bytes.write_i32::<NetworkEndian>(r.event.to_i32())?;

                bytes.write_all(&r.ip_address.map_or([0; 4], |ip| ip.octets()))?;

                bytes.write_u32::<NetworkEndian>(r.key.0)?;
                bytes.write_i32::<NetworkEndian>(r.peers_wanted.0)?;
                bytes.write_u16::<NetworkEndian>(r.port.0)?;
            }

            Request::Scrape(r) => {
                bytes.write_i64::<NetworkEndian>(r.connection_id.0)?;
                bytes.write_i32::<NetworkEndian>(ACTION_SCRAPE)?;
                bytes.write_i32::<NetworkEndian>(r.transaction_id.0)?;

                for info_hash in &r.info_hashes {
                    bytes.write_all(&info_hash.0)?;
                }
            }
        }

        Ok(())
    }

    /// Parses an inbound datagram.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseRequestError`] for truncated frames, an unknown
    /// action, a connect request without the protocol magic, an announce
    /// event outside the protocol range, or a scrape without a sane number
    /// of info-hashes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseRequestError> {
        let mut cursor = Cursor::new(bytes);

        let connection_id = cursor.read_i64::<NetworkEndian>()?;
        let action = cursor.read_i32::<NetworkEndian>()?;
        let transaction_id = cursor.read_i32::<NetworkEndian>()?;

        match action {
            ACTION_CONNECT => {
                if connection_id != PROTOCOL_ID {
                    return Err(ParseRequestError::MissingProtocolId);
                }

                Ok((ConnectRequest {
                    transaction_id: TransactionId(transaction_id),
                })
                .into())
            }

            ACTION_ANNOUNCE => {
                let mut info_hash = [0; 20];
                let mut peer_id = [0; 20];
                let mut ip = [0; 4];

                cursor.read_exact(&mut info_hash)?;
                cursor.read_exact(&mut peer_id)?;

                let bytes_downloaded = cursor.read_i64::<NetworkEndian>()?;
                let bytes_left = cursor.read_i64::<NetworkEndian>()?;
                let bytes_uploaded = cursor.read_i64::<NetworkEndian>()?;

                let event = cursor.read_i32::<NetworkEndian>()?;
                let event = AnnounceEvent::from_i32(event).ok_or(ParseRequestError::InvalidEvent { event })?;

                cursor.read_exact(&mut ip)?;

                let key = cursor.read_u32::<NetworkEndian>()?;
                let peers_wanted = cursor.read_i32::<NetworkEndian>()?;
                let port = cursor.read_u16::<NetworkEndian>()?;

                let opt_ip = if ip == [0; 4] { None } else { Some(Ipv4Addr::from(ip)) };

                Ok((AnnounceRequest {
                    connection_id: ConnectionId(connection_id),
                    transaction_id: TransactionId(transaction_id),
                    info_hash: InfoHash(info_hash),
                    peer_id: peer::Id(peer_id),
                    bytes_downloaded: NumberOfBytes(bytes_downloaded),
                    bytes_uploaded: NumberOfBytes(bytes_uploaded),
                    bytes_left: NumberOfBytes(bytes_left),
                    event,
                    ip_address: opt_ip,
                    key: PeerKey(key),
                    peers_wanted: NumberOfPeers(peers_wanted),
                    port: Port(port),
                })
                .into())
            }

            ACTION_SCRAPE => {
                let position = usize::try_from(cursor.position()).expect("the header is a few bytes");
                let tail = &bytes[position..];

                if tail.is_empty() || tail.len() % 20 != 0 || tail.len() / 20 > MAX_SCRAPE_TORRENTS {
                    return Err(ParseRequestError::InvalidScrapeTorrentCount { count: tail.len() / 20 });
                }

                let info_hashes: Vec<InfoHash> = tail
                    .chunks_exact(20)
                    .map(|chunk| InfoHash(chunk.try_into().expect("a chunk has exactly 20 bytes")))
                    .collect();

                Ok((ScrapeRequest {
                    connection_id: ConnectionId(connection_id),
                    transaction_id: TransactionId(transaction_id),
                    info_hashes,
                })
                .into())
            }

            action => Err(ParseRequestError::UnknownAction { action }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use storrent_primitives::announce_event::AnnounceEvent;
    use storrent_primitives::info_hash::InfoHash;
    use storrent_primitives::peer;
    use storrent_primitives::NumberOfBytes;

    use super::{AnnounceRequest, ConnectRequest, ParseRequestError, Request, ScrapeRequest};
    use crate::servers::udp::{ConnectionId, NumberOfPeers, PeerKey, Port, TransactionId};

    fn sample_announce_request() -> AnnounceRequest {
        AnnounceRequest {
            connection_id: ConnectionId(0x1122_3344_5566_7788),
            transaction_id: TransactionId(0x11223344),
            info_hash: InfoHash([0xAA; 20]),
            peer_id: peer::Id(*b"-qB00000000000000001"),
            bytes_downloaded: NumberOfBytes(100),
            bytes_uploaded: NumberOfBytes(200),
            bytes_left: NumberOfBytes(300),
            event: AnnounceEvent::Started,
            ip_address: None,
            key: PeerKey(0xCAFE),
            peers_wanted: NumberOfPeers(-1),
            port: Port(6881),
        }
    }

    #[test]
    fn a_connect_request_should_round_trip() {
        let request = Request::Connect(ConnectRequest {
            transaction_id: TransactionId(0x11223344),
        });

        let mut bytes = Vec::new();
        request.write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), 16);
        assert_eq!(Request::from_bytes(&bytes).unwrap(), request);
    }

    #[test]
    fn a_connect_request_without_the_magic_should_be_rejected() {
        let mut bytes = Vec::new();
        Request::Connect(ConnectRequest {
            transaction_id: TransactionId(1),
        })
        .write(&mut bytes)
        .unwrap();

        // Corrupt the protocol identifier.
        bytes[0] = 0xFF;

        assert!(matches!(
            Request::from_bytes(&bytes),
            Err(ParseRequestError::MissingProtocolId)
        ));
    }

    #[test]
    fn an_announce_request_should_round_trip() {
        let request = Request::Announce(sample_announce_request());

        let mut bytes = Vec::new();
        request.write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), 98);
        assert_eq!(Request::from_bytes(&bytes).unwrap(), request);
    }

    #[test]
    fn an_announce_request_with_an_explicit_ip_should_round_trip() {
        let mut announce = sample_announce_request();
        announce.ip_address = Some(Ipv4Addr::new(192, 0, 2, 1));

        let request = Request::Announce(announce);

        let mut bytes = Vec::new();
        request.write(&mut bytes).unwrap();

        assert_eq!(Request::from_bytes(&bytes).unwrap(), request);
    }

    #[test]
    fn an_announce_request_with_an_event_outside_the_protocol_range_should_be_rejected() {
        let mut bytes = Vec::new();
        Request::Announce(sample_announce_request()).write(&mut bytes).unwrap();

        // The event lives at offset 80.
        bytes[80..84].copy_from_slice(&4i32.to_be_bytes());

        assert!(matches!(
            Request::from_bytes(&bytes),
            Err(ParseRequestError::InvalidEvent { event: 4 })
        ));
    }

    #[test]
    fn a_truncated_announce_request_should_be_rejected() {
        let mut bytes = Vec::new();
        Request::Announce(sample_announce_request()).write(&mut bytes).unwrap();

        assert!(matches!(
            Request::from_bytes(&bytes[..50]),
            Err(ParseRequestError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn an_unknown_action_should_be_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i64.to_be_bytes());
        bytes.extend_from_slice(&9i32.to_be_bytes());
        bytes.extend_from_slice(&1i32.to_be_bytes());

        assert!(matches!(
            Request::from_bytes(&bytes),
            Err(ParseRequestError::UnknownAction { action: 9 })
        ));
    }

    #[test]
    fn a_scrape_request_should_round_trip() {
        let request = Request::Scrape(ScrapeRequest {
            connection_id: ConnectionId(1),
            transaction_id: TransactionId(2),
            info_hashes: vec![InfoHash([0xAA; 20]), InfoHash([0xBB; 20])],
        });

        let mut bytes = Vec::new();
        request.write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), 16 + 2 * 20);
        assert_eq!(Request::from_bytes(&bytes).unwrap(), request);
    }

    #[test]
    fn a_scrape_request_without_info_hashes_should_be_rejected() {
        let request = Request::Scrape(ScrapeRequest {
            connection_id: ConnectionId(1),
            transaction_id: TransactionId(2),
            info_hashes: vec![],
        });

        let mut bytes = Vec::new();
        request.write(&mut bytes).unwrap();

        assert!(matches!(
            Request::from_bytes(&bytes),
            Err(ParseRequestError::InvalidScrapeTorrentCount { count: 0 })
        ));
    }
}
