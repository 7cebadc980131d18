//! Configuration data structures for the storrent tracker.
//!
//! Settings are deserialized by the operational wrapper (usually from a TOML
//! file) and validated once at startup. An invalid announce interval is a
//! configuration error and fails loudly before the tracker serves a single
//! request.
use std::net::IpAddr;

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum announce interval requested from peers, in seconds.
///
/// Clients must not reannounce more frequently than this, so the tracker
/// refuses to advertise anything below it.
pub const MIN_ANNOUNCE_INTERVAL_SECONDS: u32 = 5;

/// Default announce interval requested from peers, in seconds.
pub const DEFAULT_ANNOUNCE_INTERVAL_SECONDS: u32 = 10;

/// Default number of peers included in an announce response.
pub const DEFAULT_ANSWER_PEERS: usize = 30;

/// Announce policy: the intervals the tracker advertises back to peers.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending
    /// regular announce requests to the tracker.
    ///
    /// It's a **recommended** wait time between announcements. It also drives
    /// peer freshness: a peer that has not announced for twice this interval
    /// is considered gone.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more frequently
    /// than this.
    #[serde(default = "AnnouncePolicy::default_interval_min")]
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            interval_min: Self::default_interval_min(),
        }
    }
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        DEFAULT_ANNOUNCE_INTERVAL_SECONDS
    }

    fn default_interval_min() -> u32 {
        MIN_ANNOUNCE_INTERVAL_SECONDS
    }
}

/// Core tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Core {
    /// Announce policy configuration.
    #[serde(default = "Core::default_announce_policy")]
    pub announce_policy: AnnouncePolicy,

    /// Maximum number of peers returned in a single announce response.
    #[serde(default = "Core::default_answer_peers")]
    pub answer_peers: usize,

    /// Interval in seconds at which the cleanup job removes stale peers from
    /// the swarms.
    #[serde(default = "Core::default_inactive_peer_cleanup_interval")]
    pub inactive_peer_cleanup_interval: u64,

    /// The external IP address of the tracker host.
    ///
    /// When a peer announces from a loopback address (the tracker and the
    /// peer run on the same host behind NAT), this address is stored for the
    /// peer instead, so other peers get a reachable endpoint.
    #[serde(default = "Core::default_external_ip")]
    pub external_ip: Option<IpAddr>,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            announce_policy: Self::default_announce_policy(),
            answer_peers: Self::default_answer_peers(),
            inactive_peer_cleanup_interval: Self::default_inactive_peer_cleanup_interval(),
            external_ip: Self::default_external_ip(),
        }
    }
}

impl Core {
    fn default_announce_policy() -> AnnouncePolicy {
        AnnouncePolicy::default()
    }

    fn default_answer_peers() -> usize {
        DEFAULT_ANSWER_PEERS
    }

    /// The cleanup cadence follows the announce interval: peers go stale
    /// after two missed intervals, so sweeping once per interval keeps the
    /// swarm at most one interval behind.
    fn default_inactive_peer_cleanup_interval() -> u64 {
        u64::from(DEFAULT_ANNOUNCE_INTERVAL_SECONDS)
    }

    fn default_external_ip() -> Option<IpAddr> {
        None
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns an `Error::InvalidInterval` if any announce interval is below
    /// the floor the protocol allows.
    pub fn validate(&self) -> Result<(), Error> {
        if self.announce_policy.interval < MIN_ANNOUNCE_INTERVAL_SECONDS {
            return Err(Error::InvalidInterval {
                interval: self.announce_policy.interval,
            });
        }

        if self.announce_policy.interval_min < MIN_ANNOUNCE_INTERVAL_SECONDS {
            return Err(Error::InvalidInterval {
                interval: self.announce_policy.interval_min,
            });
        }

        Ok(())
    }
}

/// Errors that make a configuration unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid announce interval: {interval} seconds, the minimum is {MIN_ANNOUNCE_INTERVAL_SECONDS} seconds")]
    InvalidInterval { interval: u32 },
}

#[cfg(test)]
mod tests {
    use crate::{AnnouncePolicy, Core, Error, DEFAULT_ANNOUNCE_INTERVAL_SECONDS, DEFAULT_ANSWER_PEERS};

    #[test]
    fn default_configuration_should_be_valid() {
        let config = Core::default();

        assert_eq!(config.announce_policy.interval, DEFAULT_ANNOUNCE_INTERVAL_SECONDS);
        assert_eq!(config.answer_peers, DEFAULT_ANSWER_PEERS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn it_should_reject_an_announce_interval_of_zero() {
        let config = Core {
            announce_policy: AnnouncePolicy::new(0, 5),
            ..Default::default()
        };

        assert_eq!(config.validate(), Err(Error::InvalidInterval { interval: 0 }));
    }

    #[test]
    fn it_should_accept_the_minimum_announce_interval() {
        let config = Core {
            announce_policy: AnnouncePolicy::new(5, 5),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn it_should_reject_a_minimum_interval_below_the_floor() {
        let config = Core {
            announce_policy: AnnouncePolicy::new(10, 2),
            ..Default::default()
        };

        assert_eq!(config.validate(), Err(Error::InvalidInterval { interval: 2 }));
    }
}
