//! Primitive types for the storrent tracker.
//!
//! This crate contains the basic data structures shared by the tracker
//! packages: torrent descriptors, peers, announce events and swarm
//! statistics. They are used by the swarm registry, by the HTTP and UDP
//! message codecs and by the client piece-selection strategies.
use std::time::Duration;

pub mod announce_event;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;
pub mod torrent;

/// Duration since the Unix Epoch.
///
/// The timestamp does not depend on the time zone. That gives you the
/// ability to use the clock regardless of the underlying system time zone
/// configuration.
pub type DurationSinceUnixEpoch = Duration;

/// A number of bytes as reported by a peer in an announce request
/// (`uploaded`, `downloaded` or `left`).
///
/// The wire form is a signed 64-bit big-endian integer, so the tracker keeps
/// the signed representation even though peers are expected to report
/// non-negative values.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default, PartialOrd, Ord)]
pub struct NumberOfBytes(pub i64);
