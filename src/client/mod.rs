//! Client-side piece selection.
//!
//! A downloading client keeps, for every connected peer, the set of pieces
//! that peer has and the client still lacks. Each time a request slot opens
//! it asks a [`strategy::RequestStrategy`] which piece to fetch next. The
//! strategy is the policy knob: sequential download for streaming, rarest
//! first for swarm health.
pub mod strategy;

/// One piece of a torrent as seen by the downloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// Position of the piece in the torrent, the index of its hash in the
    /// meta-info.
    pub index: u32,
    /// How many connected peers have this piece.
    pub availability: u32,
}

/// Orders pieces rarest first: ascending availability, ties broken by piece
/// index.
#[must_use]
pub fn rarest_first_order(pieces: &[Piece]) -> Vec<Piece> {
    let mut rarest = pieces.to_vec();
    rarest.sort_by_key(|piece| (piece.availability, piece.index));
    rarest
}
