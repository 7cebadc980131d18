//! `Error` response for the HTTP tracker.
//!
//! From the [BEP 03. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html):
//!
//! _"Tracker responses are bencoded dictionaries. If a tracker response has
//! a key failure reason, then that maps to a human readable string which
//! explains why the query failed, and no other keys are required."_
//!
//! > **NOTICE**: error responses are bencoded and always have a `200 OK`
//! > status code. The official `BitTorrent` specification does not specify
//! > the status code.
use storrent_bencode::{ben_bytes, ben_map};

/// `Error` response for the HTTP tracker.
#[derive(Debug, PartialEq)]
pub struct Error {
    /// Human readable string which explains why the request failed.
    pub failure_reason: String,
}

impl Error {
    /// Returns the bencoded representation of the `Error` struct.
    ///
    /// ```rust
    /// use storrent::servers::http::v1::responses::error::Error;
    ///
    /// let err = Error {
    ///    failure_reason: "error message".to_owned(),
    /// };
    ///
    /// // cspell:disable-next-line
    /// assert_eq!(err.body(), b"d14:failure reason13:error messagee");
    /// ```
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        (ben_map! {
            "failure reason" => ben_bytes!(self.failure_reason.clone())
        })
        .encode()
    }
}

#[cfg(test)]
mod tests {

    use super::Error;

    #[test]
    fn http_tracker_errors_can_be_bencoded() {
        let err = Error {
            failure_reason: "error message".to_owned(),
        };

        // cspell:disable-next-line
        assert_eq!(err.body(), b"d14:failure reason13:error messagee");
    }
}
