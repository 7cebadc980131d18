//! Storrent is a `BitTorrent` tracker core with pluggable client
//! piece-selection strategies.
//!
//! The crate contains the domain logic only. Network listeners, the
//! `.torrent` meta-info parser and CLI entry points are external
//! collaborators: they hand the core parsed [`Torrent`](storrent_primitives::torrent::Torrent)
//! descriptors and inbound announce requests, and the core answers with peer
//! lists, intervals and per-peer piece choices.
//!
//! ```text
//! Delivery layer     Domain layer
//!
//!     HTTP tracker |
//!      UDP tracker |> Core tracker
//! ```
//!
//! # Modules
//!
//! - [`core`]: the tracker service. It owns the swarm registry and handles
//!   `announce` and `scrape` requests.
//! - [`servers`]: the tracker message model. Parsers and serializers for the
//!   two transports: bencoded-over-HTTP and packed-binary-over-UDP (BEP-15).
//! - [`client`]: piece-selection strategies used by a downloading client to
//!   decide which piece to request next from a peer.
//! - [`bootstrap`]: background jobs, currently the periodic stale-peer
//!   collector.
//!
//! The heavy lifting lives in the workspace packages: the swarm registry in
//! `storrent-torrent-repository`, the bencode codec in `storrent-bencode`,
//! shared types in `storrent-primitives`.
pub mod bootstrap;
pub mod client;
pub mod core;
pub mod servers;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = storrent_clock::clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = storrent_clock::clock::Stopped;
