//! Library for parsing and converting bencoded data.
//!
//! Bencode is the self-describing encoding the `BitTorrent` HTTP tracker
//! protocol and `.torrent` files are written in. It has four kinds of value:
//! integers, byte strings, lists and dictionaries with byte-string keys.
//!
//! # Examples
//!
//! Decoding bencoded data:
//!
//! ```rust
//! use storrent_bencode::Bencode;
//!
//! let data = b"d12:lucky_numberi7ee"; // cspell:disable-line
//! let bencode = Bencode::decode(data).unwrap();
//!
//! assert_eq!(
//!     bencode.dict().unwrap().get("lucky_number".as_bytes()).unwrap().int(),
//!     Some(7)
//! );
//! ```
//!
//! Encoding bencoded data:
//!
//! ```rust
//! use storrent_bencode::{ben_bytes, ben_int, ben_map};
//!
//! let message = (ben_map! {
//!     "lucky_number" => ben_int!(7),
//!     "lucky_string" => ben_bytes!("7")
//! })
//! .encode();
//!
//! let data = b"d12:lucky_numberi7e12:lucky_string1:7e"; // cspell:disable-line
//! assert_eq!(&data[..], &message[..]);
//! ```
//!
//! Dictionary keys are serialized sorted lexicographically by their raw
//! bytes. That makes the encoder deterministic, which matters because the
//! torrent info-hash is a SHA-1 over a bencoded dictionary: re-encoding a
//! decoded canonical value must reproduce the input byte for byte.
mod decode;
mod error;
mod value;

pub use crate::error::Error;
pub use crate::value::Bencode;

const BEN_END: u8 = b'e';
const DICT_START: u8 = b'd';
const LIST_START: u8 = b'l';
const INT_START: u8 = b'i';

const BYTE_LEN_LOW: u8 = b'0';
const BYTE_LEN_HIGH: u8 = b'9';
const BYTE_LEN_END: u8 = b':';

/// Nested lists and dictionaries deeper than this fail to decode. Keeps a
/// hostile payload from exhausting the call stack.
const MAX_DECODE_RECURSION: usize = 50;

/// Construct a [`Bencode`] dictionary by supplying keys and `Bencode` values.
#[macro_export]
macro_rules! ben_map {
    ( $($key:expr => $val:expr),* $(,)? ) => {
        {
            let mut map = std::collections::BTreeMap::new();
            $(
                map.insert(Vec::<u8>::from($key), $val);
            )*
            $crate::Bencode::Dict(map)
        }
    }
}

/// Construct a [`Bencode`] list by supplying a list of `Bencode` values.
#[macro_export]
macro_rules! ben_list {
    ( $($ben:expr),* $(,)? ) => {
        $crate::Bencode::List(vec![$($ben),*])
    }
}

/// Construct [`Bencode`] bytes by supplying a type convertible to `Vec<u8>`.
#[macro_export]
macro_rules! ben_bytes {
    ( $ben:expr ) => {
        $crate::Bencode::Bytes(Vec::<u8>::from($ben))
    };
}

/// Construct a [`Bencode`] integer by supplying an `i64`.
#[macro_export]
macro_rules! ben_int {
    ( $ben:expr ) => {
        $crate::Bencode::Int($ben)
    };
}
