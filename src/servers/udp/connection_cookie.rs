//! Logic for generating and verifying connection ids.
//!
//! The UDP tracker requires the client to connect before it can announce or
//! scrape. The server answers the connect request with a 64-bit connection
//! id that the client must echo in every later request. The id exists to
//! stop source-address spoofing.
//!
//! Storing every issued id would cost memory, so the id is derived instead:
//!
//! ```text
//! connection id = hash(remote address, current time slot, instance seed)
//! ```
//!
//! Time slots are two-minute intervals since the Unix Epoch, the lifetime
//! BEP-15 recommends. An id verifies for the slot it was minted in and the
//! next one, so it is valid for at least two minutes and at most four. The
//! seed is drawn once per process; ids from a previous run die with it.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::panic::Location;

use lazy_static::lazy_static;
use rand::Rng;
use storrent_clock::clock::Time;

use super::error::Error;
use super::ConnectionId;
use crate::CurrentClock;

/// The two-minute slot width recommended by BEP-15.
pub const COOKIE_TIME_SLOT_SECONDS: u64 = 120;

lazy_static! {
    static ref INSTANCE_SEED: u64 = rand::thread_rng().gen();
}

/// Mints the connection id for a client address at the current time.
#[must_use]
pub fn make(remote_address: &SocketAddr) -> ConnectionId {
    build(remote_address, current_time_slot())
}

/// Checks a connection id a client sent back.
///
/// # Errors
///
/// Returns an `InvalidConnectionId` error when the id does not match the
/// current or the previous time slot for this address.
pub fn check(remote_address: &SocketAddr, connection_id: &ConnectionId) -> Result<(), Error> {
    let current = current_time_slot();

    for time_slot in [current, current.saturating_sub(1)] {
        if build(remote_address, time_slot) == *connection_id {
            return Ok(());
        }
    }

    Err(Error::InvalidConnectionId {
        location: Location::caller(),
    })
}

fn current_time_slot() -> u64 {
    CurrentClock::now().as_secs() / COOKIE_TIME_SLOT_SECONDS
}

fn build(remote_address: &SocketAddr, time_slot: u64) -> ConnectionId {
    let mut hasher = DefaultHasher::new();

    remote_address.hash(&mut hasher);
    time_slot.hash(&mut hasher);
    INSTANCE_SEED.hash(&mut hasher);

    #[allow(clippy::cast_possible_wrap)]
    ConnectionId(hasher.finish() as i64)
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use super::{build, check, current_time_slot, make};

    fn remote_address() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080)
    }

    #[test]
    fn it_should_mint_the_same_id_for_the_same_address_and_time_slot() {
        assert_eq!(make(&remote_address()), make(&remote_address()));
    }

    #[test]
    fn it_should_mint_different_ids_for_different_addresses() {
        let other_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 8080);

        assert_ne!(make(&remote_address()), make(&other_address));
    }

    #[test]
    fn it_should_mint_different_ids_for_different_ports() {
        let other_port = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8081);

        assert_ne!(make(&remote_address()), make(&other_port));
    }

    #[test]
    fn it_should_accept_an_id_minted_in_the_current_time_slot() {
        let connection_id = make(&remote_address());

        check(&remote_address(), &connection_id).unwrap();
    }

    #[test]
    fn it_should_accept_an_id_minted_in_the_previous_time_slot() {
        let connection_id = build(&remote_address(), current_time_slot().saturating_sub(1));

        check(&remote_address(), &connection_id).unwrap();
    }

    #[test]
    fn it_should_reject_an_id_minted_two_time_slots_ago() {
        let connection_id = build(&remote_address(), current_time_slot().wrapping_sub(2));

        assert!(check(&remote_address(), &connection_id).is_err());
    }

    #[test]
    fn it_should_reject_an_id_minted_for_another_address() {
        let other_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 8080);
        let connection_id = make(&other_address);

        assert!(check(&remote_address(), &connection_id).is_err());
    }
}
