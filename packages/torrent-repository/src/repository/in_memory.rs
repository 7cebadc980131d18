//! The in-memory torrent registry: info-hash to swarm.
//!
//! Registration and unregistration are rare administrative operations, so the
//! map sits behind a `RwLock` and announce traffic only ever takes the read
//! guard. Swarms are handed out as `Arc`s; an announce works against its
//! swarm without holding the registry guard at all.
//!
//! A swarm exists only between `register_torrent` and `unregister_torrent`.
//! Announces never create swarms implicitly: an unknown info-hash is the
//! caller's error to report.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use storrent_primitives::info_hash::InfoHash;
use storrent_primitives::torrent::Torrent;

use crate::entry::Swarm;

#[derive(Debug)]
pub struct InMemoryTorrentRepository {
    torrents: RwLock<HashMap<InfoHash, Arc<Swarm>>>,

    /// Defaults applied to newly registered swarms.
    announce_interval: u32,
    answer_peers: usize,
}

impl InMemoryTorrentRepository {
    #[must_use]
    pub fn new(announce_interval: u32, answer_peers: usize) -> Self {
        Self {
            torrents: RwLock::new(HashMap::new()),
            announce_interval,
            answer_peers,
        }
    }

    /// Creates the swarm for a torrent. Registering the same info-hash twice
    /// returns the existing swarm with its peers intact.
    pub fn register_torrent(&self, torrent: Torrent) -> Arc<Swarm> {
        let info_hash = *torrent.info_hash();

        let mut torrents = self.torrents.write().expect("it should get a write lock on the registry");

        let swarm = torrents
            .entry(info_hash)
            .or_insert_with(|| Arc::new(Swarm::new(torrent, self.announce_interval, self.answer_peers)));

        Arc::clone(swarm)
    }

    /// Destroys the swarm for a torrent, dropping its peers.
    pub fn unregister_torrent(&self, info_hash: &InfoHash) -> Option<Arc<Swarm>> {
        self.torrents
            .write()
            .expect("it should get a write lock on the registry")
            .remove(info_hash)
    }

    #[must_use]
    pub fn get(&self, info_hash: &InfoHash) -> Option<Arc<Swarm>> {
        self.torrents
            .read()
            .expect("it should get a read lock on the registry")
            .get(info_hash)
            .cloned()
    }

    /// Sweeps every swarm for peers that missed two announce intervals.
    ///
    /// The registry guard is released before the sweep so registrations are
    /// not blocked behind it.
    pub fn collect_unfresh_peers(&self) {
        let swarms: Vec<Arc<Swarm>> = self
            .torrents
            .read()
            .expect("it should get a read lock on the registry")
            .values()
            .cloned()
            .collect();

        for swarm in swarms {
            swarm.collect_unfresh_peers();
        }
    }

    #[must_use]
    pub fn torrents_len(&self) -> usize {
        self.torrents
            .read()
            .expect("it should get a read lock on the registry")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use storrent_configuration::{DEFAULT_ANNOUNCE_INTERVAL_SECONDS, DEFAULT_ANSWER_PEERS};
    use storrent_primitives::announce_event::AnnounceEvent;
    use storrent_primitives::peer;
    use storrent_primitives::torrent::fixture::sample_torrent;

    use super::InMemoryTorrentRepository;

    fn sample_repository() -> InMemoryTorrentRepository {
        InMemoryTorrentRepository::new(DEFAULT_ANNOUNCE_INTERVAL_SECONDS, DEFAULT_ANSWER_PEERS)
    }

    #[test]
    fn a_registered_torrent_should_get_a_swarm() {
        let repository = sample_repository();
        let torrent = sample_torrent();
        let info_hash = *torrent.info_hash();

        repository.register_torrent(torrent);

        assert_eq!(repository.torrents_len(), 1);
        assert!(repository.get(&info_hash).is_some());
    }

    #[test]
    fn an_unknown_info_hash_should_have_no_swarm() {
        let repository = sample_repository();

        assert!(repository.get(&[0u8; 20].into()).is_none());
    }

    #[test]
    fn registering_twice_should_keep_the_existing_swarm() {
        let repository = sample_repository();

        let swarm = repository.register_torrent(sample_torrent());
        swarm
            .update(AnnounceEvent::Started, &peer::Announcement::default())
            .unwrap();

        let swarm_again = repository.register_torrent(sample_torrent());

        assert_eq!(repository.torrents_len(), 1);
        assert_eq!(swarm_again.peers_len(), 1);
    }

    #[test]
    fn unregistering_should_destroy_the_swarm() {
        let repository = sample_repository();
        let torrent = sample_torrent();
        let info_hash = *torrent.info_hash();

        repository.register_torrent(torrent);
        repository.unregister_torrent(&info_hash);

        assert!(repository.get(&info_hash).is_none());
        assert_eq!(repository.torrents_len(), 0);
    }
}
