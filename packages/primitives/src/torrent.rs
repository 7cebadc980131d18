//! The immutable torrent descriptor the tracker is handed when a torrent is
//! registered.
//!
//! The descriptor is produced by an external meta-info parser. The tracker
//! only needs the identity (info-hash) and the piece geometry; it never
//! touches the torrent data itself.
use derive_more::Constructor;

use crate::info_hash::InfoHash;

pub const PIECE_HASH_BYTES_LEN: usize = 20;

/// SHA-1 hash of one piece of the torrent payload.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PieceHash(pub [u8; 20]);

/// Parsed meta-info for a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Torrent {
    info_hash: InfoHash,
    piece_length: u64,
    piece_hashes: Vec<PieceHash>,
    total_length: u64,
}

impl Torrent {
    #[must_use]
    pub fn info_hash(&self) -> &InfoHash {
        &self.info_hash
    }

    #[must_use]
    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    #[must_use]
    pub fn piece_hashes(&self) -> &[PieceHash] {
        &self.piece_hashes
    }

    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    #[must_use]
    pub fn num_pieces(&self) -> usize {
        self.piece_hashes.len()
    }
}

pub mod fixture {
    use std::str::FromStr;

    use super::{PieceHash, Torrent};
    use crate::info_hash::InfoHash;

    /// A descriptor for a small single-file torrent: 1 MiB in four pieces.
    #[must_use]
    pub fn sample_torrent() -> Torrent {
        let info_hash = InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap();

        Torrent::new(info_hash, 262_144, vec![PieceHash([0u8; 20]); 4], 1_048_576)
    }
}
