use std::sync::RwLock;

use super::{Piece, RequestStrategy};

/// A sequential piece-selection strategy: the lowest-index piece the remote
/// peer can provide. Deterministic; useful when pieces must arrive in order,
/// for example to play a file while it downloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequential;

impl RequestStrategy for Sequential {
    fn choose_piece(&mut self, _rarest: &RwLock<Vec<Piece>>, interesting: &[bool], pieces: &[Piece]) -> Option<Piece> {
        pieces
            .iter()
            .find(|piece| interesting.get(piece.index as usize) == Some(&true))
            .copied()
    }
}
