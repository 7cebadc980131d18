//! Piece-selection strategies.
//!
//! A strategy answers one question: given what the remote peer has and what
//! the client lacks, which piece should be requested next?
use std::sync::RwLock;

use super::Piece;

mod rarest;
mod sequential;

pub use rarest::RarestFirst;
pub use sequential::Sequential;

/// Randomly select the next piece to download from a peer from the
/// `RAREST_PIECE_JITTER` rarest available from it.
///
/// Picking uniformly among the jitter window instead of always taking the
/// single rarest piece keeps a swarm of clients from racing for the same
/// piece.
pub const RAREST_PIECE_JITTER: usize = 42;

/// A piece-selection policy.
pub trait RequestStrategy: Send {
    /// Chooses the next piece to request from a peer.
    ///
    /// - `rarest`: the pieces ordered by ascending availability across
    ///   connected peers (ties broken by piece index). The ordering is owned
    ///   by the peer-wire subsystem and may be re-sorted concurrently, so it
    ///   is read under its shared guard.
    /// - `interesting`: one flag per piece index, set when the remote peer
    ///   has the piece and the client still lacks it.
    /// - `pieces`: the full piece array indexed by piece index.
    ///
    /// Returns `None` when the remote peer has nothing the client wants.
    fn choose_piece(&mut self, rarest: &RwLock<Vec<Piece>>, interesting: &[bool], pieces: &[Piece]) -> Option<Piece>;
}
