//! Tracker message models for the two delivery transports.
//!
//! The same core tracker serves both surfaces:
//!
//! - [`http`]: URL-query requests and bencoded response bodies.
//! - [`udp`]: the packed big-endian frames of the UDP tracker protocol
//!   ([BEP 15](https://www.bittorrent.org/beps/bep_0015.html)).
//!
//! The socket listeners themselves live outside this crate; these modules
//! define the byte-level contract and the glue from parsed requests to the
//! core tracker.
pub mod http;
pub mod udp;
