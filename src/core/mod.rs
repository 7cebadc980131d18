//! The core tracker module contains the generic `BitTorrent` tracker logic
//! which is independent of the delivery layer.
//!
//! Handling `announce` requests is the most important task for a
//! `BitTorrent` tracker. A swarm is a network of peers that are all trying
//! to download the same torrent. When a peer wants to find other peers it
//! announces itself to the swarm via the tracker. The peer sends its data to
//! the tracker so that the tracker can add it to the swarm. The tracker
//! responds to the peer with the list of other peers in the swarm so that
//! the peer can contact them to start downloading pieces of the file from
//! them.
//!
//! Torrents must be registered with the tracker before peers can announce on
//! them:
//!
//! ```rust,no_run
//! use storrent::core::Tracker;
//! use storrent_configuration::Core;
//! use storrent_primitives::torrent::fixture::sample_torrent;
//!
//! let tracker = Tracker::new(&Core::default()).unwrap();
//!
//! tracker.register_torrent(sample_torrent());
//! ```
//!
//! An announce then carries the event, the peer-supplied data and the
//! resolved client IP:
//!
//! ```text
//! let announce_data = tracker.announce(&info_hash, event, &mut announcement, &peer_ip, &PeersWanted::AsManyAsPossible)?;
//! ```
//!
//! The `peer_ip` argument is the resolved peer IP. It's a common practice
//! that trackers resolve the peer IP using the IP of the client making the
//! request; as the tracker is a domain service, the resolved IP must be
//! provided by a higher component with access to the request metadata.
//!
//! The returned [`AnnounceData`] contains the peer list (excluding the
//! requester), the swarm statistics and the announce policy the client
//! should honor.
//!
//! ## Related BEPs:
//!
//! - [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! - [BEP 48. Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html)
pub mod error;

use std::collections::HashMap;
use std::net::IpAddr;
use std::panic::Location;
use std::sync::Arc;

use derive_more::Constructor;
use storrent_configuration::{AnnouncePolicy, Core};
use storrent_primitives::announce_event::AnnounceEvent;
use storrent_primitives::info_hash::InfoHash;
use storrent_primitives::peer;
use storrent_primitives::swarm_metadata::SwarmMetadata;
use storrent_primitives::torrent::Torrent;
use storrent_torrent_repository::entry::Swarm;
use storrent_torrent_repository::repository::in_memory::InMemoryTorrentRepository;
use tracing::debug;

use self::error::Error;

/// The domain layer tracker service.
///
/// Its main responsibility is to handle the `announce` and `scrape`
/// requests. It is not responsible for the network layer; typically it is
/// used by a higher application service that is.
pub struct Tracker {
    /// Validated tracker configuration.
    config: Core,

    /// The in-memory swarm registry.
    torrents: Arc<InMemoryTorrentRepository>,
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, Constructor)]
pub struct AnnounceData {
    /// The list of peers that are downloading the same torrent.
    /// It excludes the peer that made the request.
    pub peers: Vec<Arc<peer::Peer>>,
    /// Swarm statistics.
    pub stats: SwarmMetadata,
    /// The tracker announce policy for this torrent.
    pub policy: AnnouncePolicy,
}

/// Structure that holds the data returned by the `scrape` request.
#[derive(Debug, PartialEq, Default)]
pub struct ScrapeData {
    /// A map of infohashes and swarm metadata for each torrent.
    pub files: HashMap<InfoHash, SwarmMetadata>,
}

impl ScrapeData {
    /// Creates a new empty `ScrapeData` with no files (torrents).
    #[must_use]
    pub fn empty() -> Self {
        let files: HashMap<InfoHash, SwarmMetadata> = HashMap::new();
        Self { files }
    }

    /// Adds a torrent to the `ScrapeData`.
    pub fn add_file(&mut self, info_hash: &InfoHash, swarm_metadata: SwarmMetadata) {
        self.files.insert(*info_hash, swarm_metadata);
    }

    /// Adds a torrent to the `ScrapeData` with zeroed metadata.
    pub fn add_file_with_zeroed_metadata(&mut self, info_hash: &InfoHash) {
        self.files.insert(*info_hash, SwarmMetadata::zeroed());
    }
}

/// Specifies how many peers a client wants in the announce response.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PeersWanted {
    /// Request as many peers as possible (default behavior).
    #[default]
    AsManyAsPossible,

    /// Request a specific number of peers.
    Only { amount: usize },
}

impl PeersWanted {
    /// The cap the client asked for, when it asked for one. The swarm
    /// enforces its own `answer_peers` limit on top.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        match self {
            PeersWanted::AsManyAsPossible => None,
            PeersWanted::Only { amount } => Some(*amount),
        }
    }
}

impl From<i32> for PeersWanted {
    /// The UDP wire form: `-1` (or any non-positive number) means default.
    fn from(value: i32) -> Self {
        match usize::try_from(value) {
            Ok(amount) if amount > 0 => PeersWanted::Only { amount },
            _ => PeersWanted::AsManyAsPossible,
        }
    }
}

impl From<u32> for PeersWanted {
    fn from(value: u32) -> Self {
        if value == 0 {
            return PeersWanted::AsManyAsPossible;
        }

        PeersWanted::Only {
            amount: value as usize,
        }
    }
}

impl Tracker {
    /// `Tracker` constructor.
    ///
    /// # Errors
    ///
    /// Will return a `storrent_configuration::Error` if the configuration is
    /// invalid, for example an announce interval below the protocol floor.
    pub fn new(config: &Core) -> Result<Tracker, storrent_configuration::Error> {
        config.validate()?;

        Ok(Tracker {
            torrents: Arc::new(InMemoryTorrentRepository::new(
                config.announce_policy.interval,
                config.answer_peers,
            )),
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.config.announce_policy
    }

    #[must_use]
    pub fn get_maybe_external_ip(&self) -> Option<IpAddr> {
        self.config.external_ip
    }

    /// Starts tracking a torrent. Peers can only announce on registered
    /// torrents.
    pub fn register_torrent(&self, torrent: Torrent) -> Arc<Swarm> {
        self.torrents.register_torrent(torrent)
    }

    /// Stops tracking a torrent, dropping its swarm.
    pub fn unregister_torrent(&self, info_hash: &InfoHash) -> Option<Arc<Swarm>> {
        self.torrents.unregister_torrent(info_hash)
    }

    /// It handles an announce request.
    ///
    /// BEP 03: [The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
    ///
    /// The announcement is mutable because the tracker reassigns the peer IP
    /// when the client announces from a loopback address and an external IP
    /// is configured.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] when the info-hash is not registered or when a
    /// `completed`/interval announce arrives for a peer that never started.
    pub fn announce(
        &self,
        info_hash: &InfoHash,
        event: AnnounceEvent,
        announcement: &mut peer::Announcement,
        remote_client_ip: &IpAddr,
        peers_wanted: &PeersWanted,
    ) -> Result<AnnounceData, Error> {
        debug!("before: {announcement:?}");
        announcement.change_ip(&assign_ip_address_to_peer(remote_client_ip, self.config.external_ip));
        debug!("after: {announcement:?}");

        let swarm = self.torrents.get(info_hash).ok_or_else(|| Error::UnknownTorrent {
            info_hash: *info_hash,
            location: Location::caller(),
        })?;

        // The only registry error an announce can produce is an untracked
        // peer, which clients fix by re-announcing `started`.
        let peer = swarm
            .update(event, announcement)
            .map_err(|source| Error::MissingStartedEvent { source })?;

        let peers = swarm.get_some_peers(&peer, peers_wanted.limit());
        let stats = swarm.swarm_metadata();

        Ok(AnnounceData {
            peers,
            stats,
            policy: AnnouncePolicy::new(swarm.announce_interval(), self.config.announce_policy.interval_min),
        })
    }

    /// It handles a scrape request.
    ///
    /// BEP 48: [Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html).
    ///
    /// Unknown torrents are reported with zeroed metadata.
    #[must_use]
    pub fn scrape(&self, info_hashes: &[InfoHash]) -> ScrapeData {
        let mut scrape_data = ScrapeData::empty();

        for info_hash in info_hashes {
            let swarm_metadata = match self.torrents.get(info_hash) {
                Some(swarm) => swarm.swarm_metadata(),
                None => SwarmMetadata::zeroed(),
            };
            scrape_data.add_file(info_hash, swarm_metadata);
        }

        scrape_data
    }

    /// Removes peers that missed two announce intervals from every swarm.
    /// Called by the periodic collector job.
    pub fn cleanup_torrents(&self) {
        self.torrents.collect_unfresh_peers();
    }
}

/// Assigns the correct IP address to a peer based on tracker settings.
///
/// If the client IP is a loopback address and the tracker has an external IP
/// configured, the external IP will be assigned to the peer.
#[must_use]
fn assign_ip_address_to_peer(remote_client_ip: &IpAddr, tracker_external_ip: Option<IpAddr>) -> IpAddr {
    if let Some(host_ip) = tracker_external_ip.filter(|_| remote_client_ip.is_loopback()) {
        host_ip
    } else {
        *remote_client_ip
    }
}

#[cfg(test)]
mod tests {

    mod the_tracker {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        use std::str::FromStr;

        use storrent_configuration::Core;
        use storrent_primitives::announce_event::AnnounceEvent;
        use storrent_primitives::info_hash::InfoHash;
        use storrent_primitives::peer;
        use storrent_primitives::torrent::fixture::sample_torrent;
        use storrent_primitives::NumberOfBytes;

        use crate::core::{error::Error, PeersWanted, Tracker};

        fn public_tracker() -> Tracker {
            Tracker::new(&Core::default()).unwrap()
        }

        fn sample_info_hash() -> InfoHash {
            "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap()
        }

        // The client peer IP
        fn peer_ip() -> IpAddr {
            IpAddr::V4(Ipv4Addr::from_str("126.0.0.1").unwrap())
        }

        // The announce rewrites the peer IP to the source IP, so peers in
        // these tests are told apart by port.
        fn sample_announcement(id: &[u8; 20], port: u16, left: i64) -> peer::Announcement {
            peer::Announcement {
                peer_id: peer::Id(*id),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), port),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(left),
            }
        }

        #[test]
        fn it_should_reject_a_configuration_with_an_invalid_interval() {
            let mut config = Core::default();
            config.announce_policy.interval = 0;

            assert!(Tracker::new(&config).is_err());
        }

        #[test]
        fn it_should_fail_an_announce_for_an_unregistered_torrent() {
            let tracker = public_tracker();

            let result = tracker.announce(
                &sample_info_hash(),
                AnnounceEvent::Started,
                &mut sample_announcement(b"-qB00000000000000001", 8081, 100),
                &peer_ip(),
                &PeersWanted::AsManyAsPossible,
            );

            assert!(matches!(result, Err(Error::UnknownTorrent { .. })));
        }

        #[test]
        fn it_should_return_an_empty_peer_list_for_the_first_announced_peer() {
            let tracker = public_tracker();
            tracker.register_torrent(sample_torrent());

            let announce_data = tracker
                .announce(
                    &sample_info_hash(),
                    AnnounceEvent::Started,
                    &mut sample_announcement(b"-qB00000000000000001", 8081, 100),
                    &peer_ip(),
                    &PeersWanted::AsManyAsPossible,
                )
                .unwrap();

            assert!(announce_data.peers.is_empty());
            assert_eq!(announce_data.stats.incomplete, 1);
        }

        #[test]
        fn it_should_return_the_previously_announced_peers() {
            let tracker = public_tracker();
            tracker.register_torrent(sample_torrent());

            tracker
                .announce(
                    &sample_info_hash(),
                    AnnounceEvent::Started,
                    &mut sample_announcement(b"-qB00000000000000001", 8081, 100),
                    &peer_ip(),
                    &PeersWanted::AsManyAsPossible,
                )
                .unwrap();

            let announce_data = tracker
                .announce(
                    &sample_info_hash(),
                    AnnounceEvent::Started,
                    &mut sample_announcement(b"-qB00000000000000002", 8082, 100),
                    &peer_ip(),
                    &PeersWanted::AsManyAsPossible,
                )
                .unwrap();

            assert_eq!(announce_data.peers.len(), 1);
            assert_eq!(announce_data.peers[0].peer_id, peer::Id(*b"-qB00000000000000001"));
        }

        #[test]
        fn it_should_fail_an_interval_announce_for_a_peer_that_never_started() {
            let tracker = public_tracker();
            tracker.register_torrent(sample_torrent());

            let result = tracker.announce(
                &sample_info_hash(),
                AnnounceEvent::None,
                &mut sample_announcement(b"-qB00000000000000001", 8081, 100),
                &peer_ip(),
                &PeersWanted::AsManyAsPossible,
            );

            assert!(matches!(result, Err(Error::MissingStartedEvent { .. })));
        }

        #[test]
        fn a_stopped_and_restarted_peer_should_still_be_tracked() {
            let tracker = public_tracker();
            tracker.register_torrent(sample_torrent());

            let mut announcement = sample_announcement(b"-qB00000000000000001", 8081, 100);

            for event in [AnnounceEvent::Started, AnnounceEvent::Stopped, AnnounceEvent::Started] {
                tracker
                    .announce(
                        &sample_info_hash(),
                        event,
                        &mut announcement,
                        &peer_ip(),
                        &PeersWanted::AsManyAsPossible,
                    )
                    .unwrap();
            }

            let announce_data = tracker
                .announce(
                    &sample_info_hash(),
                    AnnounceEvent::Started,
                    &mut sample_announcement(b"-qB00000000000000002", 8082, 100),
                    &peer_ip(),
                    &PeersWanted::AsManyAsPossible,
                )
                .unwrap();

            assert_eq!(announce_data.peers.len(), 1);
        }

        mod it_should_update_the_swarm_stats_for_the_torrent {
            use storrent_primitives::announce_event::AnnounceEvent;

            use crate::core::tests::the_tracker::{peer_ip, public_tracker, sample_announcement, sample_info_hash};
            use crate::core::PeersWanted;
            use storrent_primitives::torrent::fixture::sample_torrent;

            #[test]
            fn when_the_peer_is_a_seeder() {
                let tracker = public_tracker();
                tracker.register_torrent(sample_torrent());

                let announce_data = tracker
                    .announce(
                        &sample_info_hash(),
                        AnnounceEvent::Started,
                        &mut sample_announcement(b"-qB00000000000000001", 8081, 0),
                        &peer_ip(),
                        &PeersWanted::AsManyAsPossible,
                    )
                    .unwrap();

                assert_eq!(announce_data.stats.complete, 1);
            }

            #[test]
            fn when_a_previously_started_peer_has_completed_downloading() {
                let tracker = public_tracker();
                tracker.register_torrent(sample_torrent());

                tracker
                    .announce(
                        &sample_info_hash(),
                        AnnounceEvent::Started,
                        &mut sample_announcement(b"-qB00000000000000001", 8081, 100),
                        &peer_ip(),
                        &PeersWanted::AsManyAsPossible,
                    )
                    .unwrap();

                let announce_data = tracker
                    .announce(
                        &sample_info_hash(),
                        AnnounceEvent::Completed,
                        &mut sample_announcement(b"-qB00000000000000001", 8081, 0),
                        &peer_ip(),
                        &PeersWanted::AsManyAsPossible,
                    )
                    .unwrap();

                assert_eq!(announce_data.stats.downloaded, 1);
                assert_eq!(announce_data.stats.complete, 1);
                assert_eq!(announce_data.stats.incomplete, 0);
            }
        }

        mod handling_a_scrape_request {
            use storrent_primitives::announce_event::AnnounceEvent;
            use storrent_primitives::info_hash::InfoHash;
            use storrent_primitives::torrent::fixture::sample_torrent;

            use crate::core::tests::the_tracker::{peer_ip, public_tracker, sample_announcement, sample_info_hash};
            use crate::core::{PeersWanted, ScrapeData};

            #[test]
            fn it_should_return_zeroed_metadata_for_an_unknown_torrent() {
                let tracker = public_tracker();

                let info_hashes = vec!["3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap()];

                let scrape_data = tracker.scrape(&info_hashes);

                let mut expected_scrape_data = ScrapeData::empty();
                expected_scrape_data.add_file_with_zeroed_metadata(&info_hashes[0]);

                assert_eq!(scrape_data, expected_scrape_data);
            }

            #[test]
            fn it_should_return_the_swarm_metadata_for_a_tracked_torrent() {
                let tracker = public_tracker();
                tracker.register_torrent(sample_torrent());

                tracker
                    .announce(
                        &sample_info_hash(),
                        AnnounceEvent::Started,
                        &mut sample_announcement(b"-qB00000000000000001", 8081, 0),
                        &peer_ip(),
                        &PeersWanted::AsManyAsPossible,
                    )
                    .unwrap();
                tracker
                    .announce(
                        &sample_info_hash(),
                        AnnounceEvent::Started,
                        &mut sample_announcement(b"-qB00000000000000002", 8082, 100),
                        &peer_ip(),
                        &PeersWanted::AsManyAsPossible,
                    )
                    .unwrap();

                let scrape_data = tracker.scrape(&[sample_info_hash()]);

                let metadata = scrape_data.files.get(&sample_info_hash()).unwrap();
                assert_eq!(metadata.complete, 1);
                assert_eq!(metadata.incomplete, 1);
            }
        }

        mod should_assign_the_ip_to_the_peer {
            use std::net::{IpAddr, Ipv4Addr};
            use std::str::FromStr;

            use crate::core::assign_ip_address_to_peer;

            #[test]
            fn using_the_source_ip_instead_of_the_ip_in_the_announce_request() {
                let remote_ip = IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2));

                let peer_ip = assign_ip_address_to_peer(&remote_ip, None);

                assert_eq!(peer_ip, remote_ip);
            }

            #[test]
            fn it_should_use_the_loopback_ip_if_the_tracker_does_not_have_the_external_ip_configuration() {
                let remote_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

                let peer_ip = assign_ip_address_to_peer(&remote_ip, None);

                assert_eq!(peer_ip, remote_ip);
            }

            #[test]
            fn it_should_use_the_external_tracker_ip_in_tracker_configuration_if_it_is_defined() {
                let remote_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

                let tracker_external_ip = IpAddr::V4(Ipv4Addr::from_str("126.0.0.1").unwrap());

                let peer_ip = assign_ip_address_to_peer(&remote_ip, Some(tracker_external_ip));

                assert_eq!(peer_ip, tracker_external_ip);
            }
        }

        mod the_peers_wanted_conversion {
            use crate::core::PeersWanted;

            #[test]
            fn non_positive_wire_values_should_mean_the_default() {
                assert_eq!(PeersWanted::from(-1i32), PeersWanted::AsManyAsPossible);
                assert_eq!(PeersWanted::from(0i32), PeersWanted::AsManyAsPossible);
                assert_eq!(PeersWanted::from(0u32), PeersWanted::AsManyAsPossible);
            }

            #[test]
            fn positive_wire_values_should_cap_the_answer() {
                assert_eq!(PeersWanted::from(10i32).limit(), Some(10));
                assert_eq!(PeersWanted::from(10u32).limit(), Some(10));
            }
        }
    }
}
