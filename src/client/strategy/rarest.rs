use std::sync::RwLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Piece, RequestStrategy, RAREST_PIECE_JITTER};

/// The default piece-selection strategy: rarest first, with jitter.
///
/// The candidate set is the first [`RAREST_PIECE_JITTER`] interesting pieces
/// in rarity order, and the choice is uniform among them.
#[derive(Debug)]
pub struct RarestFirst {
    random: StdRng,
}

impl RarestFirst {
    /// The random source is per-strategy and seeded from OS entropy.
    /// Strategies constructed in the same instant must not share a sequence;
    /// a wall-clock seed would correlate them.
    #[must_use]
    pub fn new() -> Self {
        Self {
            random: StdRng::from_entropy(),
        }
    }
}

impl Default for RarestFirst {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestStrategy for RarestFirst {
    fn choose_piece(&mut self, rarest: &RwLock<Vec<Piece>>, interesting: &[bool], _pieces: &[Piece]) -> Option<Piece> {
        // Extract the jitter window from the interesting pieces of this
        // peer, preserving rarity order. The guard is held for the scan
        // only; the random pick happens on the snapshot.
        let choice: Vec<Piece> = {
            let rarest = rarest.read().expect("it should get a read lock on the rarity ordering");

            rarest
                .iter()
                .filter(|piece| interesting.get(piece.index as usize) == Some(&true))
                .take(RAREST_PIECE_JITTER)
                .copied()
                .collect()
        };

        if choice.is_empty() {
            return None;
        }

        Some(choice[self.random.gen_range(0..choice.len())])
    }
}
