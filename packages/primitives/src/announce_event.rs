use serde::{Deserialize, Serialize};

/// Announce events. Described on the
/// [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
#[derive(Hash, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnounceEvent {
    /// The peer has started downloading the torrent.
    Started,
    /// The peer has ceased downloading the torrent.
    Stopped,
    /// The peer has completed downloading the torrent.
    Completed,
    /// This is one of the announcements done at regular intervals.
    None,
}

impl AnnounceEvent {
    /// Decodes the event from its wire value in UDP announce requests.
    ///
    /// Returns `None` for values outside the range the protocol defines;
    /// the caller decides whether that is a malformed frame.
    #[inline]
    #[must_use]
    pub fn from_i32(i: i32) -> Option<Self> {
        match i {
            0 => Some(Self::None),
            1 => Some(Self::Completed),
            2 => Some(Self::Started),
            3 => Some(Self::Stopped),
            _ => Option::None,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_i32(&self) -> i32 {
        match self {
            AnnounceEvent::None => 0,
            AnnounceEvent::Completed => 1,
            AnnounceEvent::Started => 2,
            AnnounceEvent::Stopped => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnnounceEvent;

    #[test]
    fn it_should_decode_the_four_wire_values() {
        assert_eq!(AnnounceEvent::from_i32(0), Some(AnnounceEvent::None));
        assert_eq!(AnnounceEvent::from_i32(1), Some(AnnounceEvent::Completed));
        assert_eq!(AnnounceEvent::from_i32(2), Some(AnnounceEvent::Started));
        assert_eq!(AnnounceEvent::from_i32(3), Some(AnnounceEvent::Stopped));
    }

    #[test]
    fn it_should_reject_wire_values_outside_the_protocol_range() {
        assert_eq!(AnnounceEvent::from_i32(4), None);
        assert_eq!(AnnounceEvent::from_i32(-1), None);
    }

    #[test]
    fn it_should_round_trip_through_the_wire_value() {
        for event in [
            AnnounceEvent::None,
            AnnounceEvent::Completed,
            AnnounceEvent::Started,
            AnnounceEvent::Stopped,
        ] {
            assert_eq!(AnnounceEvent::from_i32(event.to_i32()), Some(event));
        }
    }
}
