//! In-memory swarm registry for the storrent tracker.
//!
//! The registry owns one [`entry::Swarm`] per registered torrent. A swarm is
//! the set of peers exchanging on a single torrent, keyed by info-hash.
//! Announce requests mutate exactly one peer record in one swarm, so the data
//! structures are chosen for per-key atomicity instead of coarse locking: the
//! peer table is a lock-free ordered map and the registry itself is a
//! read-mostly `RwLock` map whose writer guard is only taken when torrents
//! are registered or unregistered.
//!
//! Swarm state is volatile. Nothing is persisted; after a restart the swarms
//! are rebuilt from the peers' periodic re-announces.
pub mod entry;
pub mod error;
pub mod repository;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = storrent_clock::clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = storrent_clock::clock::Stopped;
