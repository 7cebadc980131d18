//! A swarm: the set of peers exchanging on one torrent.
//!
//! The tracker keeps one [`Swarm`] per registered torrent. The swarm owns the
//! peer table and is the single boundary where the registry invariants are
//! enforced:
//!
//! - a peer that announced `stopped` is never present in the table;
//! - the table key is the canonical lowercase-hex rendering of the peer id;
//! - only fresh peers (announced within twice the announce interval) are
//!   served in responses;
//! - seeders plus leechers always equals the number of tracked peers.
//!
//! The peer table is a lock-free ordered map. Updates are per-key atomic
//! record swaps: concurrent announces for different peers never contend, and
//! two racing announces for the same peer resolve last-writer-wins instead of
//! tearing the record.
use std::panic::Location;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use rand::seq::SliceRandom;
use rand::thread_rng;
use storrent_clock::clock::Time;
use storrent_configuration::MIN_ANNOUNCE_INTERVAL_SECONDS;
use storrent_primitives::announce_event::AnnounceEvent;
use storrent_primitives::peer::{self, Peer, PeerState};
use storrent_primitives::swarm_metadata::SwarmMetadata;
use storrent_primitives::torrent::Torrent;
use storrent_primitives::DurationSinceUnixEpoch;

use crate::error::Error;
use crate::CurrentClock;

/// The tracker entry for one torrent and the peers exchanging on it.
#[derive(Debug)]
pub struct Swarm {
    /// The descriptor of the torrent this swarm exchanges.
    torrent: Torrent,

    /// Peers currently exchanging on this torrent, keyed by the hex rendering
    /// of their ids.
    peers: SkipMap<String, Arc<Peer>>,

    /// The number of peers that have ever completed downloading this torrent.
    downloaded: AtomicU32,

    /// Maximum number of peers handed out per announce response.
    answer_peers: usize,

    /// The announce interval advertised to peers, in seconds. It also bounds
    /// peer freshness: a peer that misses two intervals is considered gone.
    announce_interval: AtomicU32,
}

impl Swarm {
    #[must_use]
    pub fn new(torrent: Torrent, announce_interval: u32, answer_peers: usize) -> Self {
        Self {
            torrent,
            peers: SkipMap::new(),
            downloaded: AtomicU32::new(0),
            answer_peers,
            announce_interval: AtomicU32::new(announce_interval),
        }
    }

    #[must_use]
    pub fn torrent(&self) -> &Torrent {
        &self.torrent
    }

    #[must_use]
    pub fn announce_interval(&self) -> u32 {
        self.announce_interval.load(Ordering::Relaxed)
    }

    /// Changes the announce interval advertised for this torrent.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInterval` error for intervals below the protocol
    /// floor.
    pub fn set_announce_interval(&self, interval: u32) -> Result<(), Error> {
        if interval < MIN_ANNOUNCE_INTERVAL_SECONDS {
            return Err(Error::InvalidInterval {
                interval,
                location: Location::caller(),
            });
        }

        self.announce_interval.store(interval, Ordering::Relaxed);
        Ok(())
    }

    /// Applies one announce event to the swarm and returns the peer record
    /// the response should be built from.
    ///
    /// - `Started` inserts a fresh record, replacing any previous one.
    /// - `Stopped` removes the record. The returned record is synthesized
    ///   from the request and is *not* stored, so a stop for an unknown peer
    ///   is a no-op on the table.
    /// - `Completed` and interval announces (`None`) refresh an existing
    ///   record; the peer must have started first.
    ///
    /// Counters and the last-announce timestamp are applied as a whole-record
    /// swap, so readers observe either the old or the new record, never a
    /// torn one.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPeer` for a `Completed` or `None` event when the peer
    /// is not tracked.
    pub fn update(&self, event: AnnounceEvent, announcement: &peer::Announcement) -> Result<Arc<Peer>, Error> {
        let hex_peer_id = announcement.peer_id.to_hex_string();
        let now = CurrentClock::now();

        match event {
            AnnounceEvent::Started => {
                let peer = Arc::new(build_record(announcement, PeerState::Started, now));
                self.peers.insert(hex_peer_id, Arc::clone(&peer));
                Ok(peer)
            }
            AnnounceEvent::Stopped => {
                self.peers.remove(&hex_peer_id);
                Ok(Arc::new(build_record(announcement, PeerState::Stopped, now)))
            }
            AnnounceEvent::Completed => {
                let previous_state = self.peer_state(&hex_peer_id).ok_or_else(|| Error::UnknownPeer {
                    hex_peer_id: hex_peer_id.clone(),
                    location: Location::caller(),
                })?;

                let peer = Arc::new(build_record(announcement, PeerState::Completed, now));
                self.peers.insert(hex_peer_id, Arc::clone(&peer));

                // The torrent download total counts completions, not repeats.
                if previous_state != PeerState::Completed {
                    self.downloaded.fetch_add(1, Ordering::Relaxed);
                }

                Ok(peer)
            }
            AnnounceEvent::None => {
                if self.peer_state(&hex_peer_id).is_none() {
                    return Err(Error::UnknownPeer {
                        hex_peer_id,
                        location: Location::caller(),
                    });
                }

                let peer = Arc::new(build_record(announcement, PeerState::Started, now));
                self.peers.insert(hex_peer_id, Arc::clone(&peer));
                Ok(peer)
            }
        }
    }

    /// Peers to include in an announce response for `requester`.
    ///
    /// Candidates are shuffled first so the answer is not biased by the table
    /// order, then filtered in one pass:
    ///
    /// - stale candidates, and candidates squatting the requester's endpoint
    ///   under a different id (ghosts of a client that reconnected with a new
    ///   id), are evicted from the swarm and skipped;
    /// - the requester itself is skipped;
    /// - at most `answer_peers` peers are returned, further capped by
    ///   `limit` when the client asked for fewer.
    #[must_use]
    pub fn get_some_peers(&self, requester: &Peer, limit: Option<usize>) -> Vec<Arc<Peer>> {
        let max_peers = limit.map_or(self.answer_peers, |limit| limit.min(self.answer_peers));
        let now = CurrentClock::now();
        let announce_interval = self.announce_interval();

        let mut candidates: Vec<Arc<Peer>> = self.peers.iter().map(|entry| Arc::clone(entry.value())).collect();
        candidates.shuffle(&mut thread_rng());

        let mut peers: Vec<Arc<Peer>> = Vec::new();

        for candidate in candidates {
            if !candidate.is_fresh(now, announce_interval)
                || (candidate.same_endpoint(requester) && !candidate.same_identity(requester))
            {
                tracing::debug!("collecting stale peer {} ...", candidate.peer_id);
                self.peers.remove(&candidate.peer_id.to_hex_string());
                continue;
            }

            // Don't include the requesting peer in the answer.
            if requester.same_endpoint(&candidate) {
                continue;
            }

            peers.push(candidate);

            if peers.len() >= max_peers {
                break;
            }
        }

        peers
    }

    /// Removes every peer whose last announce is older than twice the
    /// announce interval. Called by the periodic collector; removal during
    /// iteration is fine because the table is lock-free.
    pub fn collect_unfresh_peers(&self) {
        let now = CurrentClock::now();
        let announce_interval = self.announce_interval();

        for entry in &self.peers {
            if !entry.value().is_fresh(now, announce_interval) {
                entry.remove();
            }
        }
    }

    /// `(seeders, leechers)`; their sum is the number of tracked peers.
    #[must_use]
    pub fn seeders_and_leechers(&self) -> (usize, usize) {
        let seeders = self.peers.iter().filter(|entry| entry.value().is_seeder()).count();
        let leechers = self.peers.len() - seeders;

        (seeders, leechers)
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn swarm_metadata(&self) -> SwarmMetadata {
        let (seeders, leechers) = self.seeders_and_leechers();

        SwarmMetadata {
            downloaded: self.downloaded.load(Ordering::Relaxed),
            complete: seeders as u32,
            incomplete: leechers as u32,
        }
    }

    #[must_use]
    pub fn get_peer(&self, hex_peer_id: &str) -> Option<Arc<Peer>> {
        self.peers.get(hex_peer_id).map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn peers_len(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub fn peers_is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn peer_state(&self, hex_peer_id: &str) -> Option<PeerState> {
        self.peers.get(hex_peer_id).map(|entry| entry.value().state)
    }
}

/// Builds the stored record for an announce. A peer that reports zero bytes
/// left already has the complete data, so it is tracked as a seeder whatever
/// state the event asked for (a stopped peer stays stopped).
fn build_record(announcement: &peer::Announcement, state: PeerState, now: DurationSinceUnixEpoch) -> Peer {
    let state = match state {
        PeerState::Started if announcement.left.0 == 0 => PeerState::Completed,
        other => other,
    };

    Peer {
        peer_id: announcement.peer_id,
        peer_addr: announcement.peer_addr,
        updated: now,
        uploaded: announcement.uploaded,
        downloaded: announcement.downloaded,
        left: announcement.left,
        state,
    }
}
