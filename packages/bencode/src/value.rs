use std::collections::BTreeMap;

use crate::decode;
use crate::error::Error;
use crate::{BEN_END, BYTE_LEN_END, DICT_START, INT_START, LIST_START};

/// An owned bencoded value tree.
///
/// Dictionaries use a `BTreeMap` keyed by raw bytes, so iteration (and
/// therefore encoding) always visits keys in the lexicographical order the
/// format mandates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bencode {
    /// A signed integer: `i42e`.
    Int(i64),
    /// A length-prefixed byte string: `4:spam`. Raw bytes, not necessarily
    /// UTF-8.
    Bytes(Vec<u8>),
    /// An ordered sequence of values: `l...e`.
    List(Vec<Bencode>),
    /// A map with byte-string keys: `d...e`.
    Dict(BTreeMap<Vec<u8>, Bencode>),
}

impl Bencode {
    /// Decodes a complete bencoded buffer.
    ///
    /// The whole buffer must be consumed by the top-level value; trailing
    /// bytes are an error. Dictionaries with unsorted or duplicate keys are
    /// accepted (the last occurrence of a key wins); ordering is enforced
    /// when encoding.
    ///
    /// # Errors
    ///
    /// Returns a decode [`Error`] describing the malformation and the byte
    /// offset it was found at.
    pub fn decode(bytes: &[u8]) -> Result<Bencode, Error> {
        decode::decode(bytes)
    }

    /// Encodes the value into its canonical bencoded form.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Bencode::Int(value) => {
                out.push(INT_START);
                out.extend_from_slice(value.to_string().as_bytes());
                out.push(BEN_END);
            }
            Bencode::Bytes(bytes) => {
                out.extend_from_slice(bytes.len().to_string().as_bytes());
                out.push(BYTE_LEN_END);
                out.extend_from_slice(bytes);
            }
            Bencode::List(values) => {
                out.push(LIST_START);
                for value in values {
                    value.encode_into(out);
                }
                out.push(BEN_END);
            }
            Bencode::Dict(entries) => {
                out.push(DICT_START);
                // BTreeMap iteration order is the mandated key order.
                for (key, value) in entries {
                    out.extend_from_slice(key.len().to_string().as_bytes());
                    out.push(BYTE_LEN_END);
                    out.extend_from_slice(key);
                    value.encode_into(out);
                }
                out.push(BEN_END);
            }
        }
    }

    #[must_use]
    pub fn new_list() -> Bencode {
        Bencode::List(Vec::new())
    }

    #[must_use]
    pub fn new_dict() -> Bencode {
        Bencode::Dict(BTreeMap::new())
    }

    #[must_use]
    pub fn int(&self) -> Option<i64> {
        match self {
            Bencode::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Bencode::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The byte string as UTF-8, when it is both a byte string and valid
    /// UTF-8.
    #[must_use]
    pub fn str(&self) -> Option<&str> {
        self.bytes().and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    #[must_use]
    pub fn list(&self) -> Option<&[Bencode]> {
        match self {
            Bencode::List(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn dict(&self) -> Option<&BTreeMap<Vec<u8>, Bencode>> {
        match self {
            Bencode::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn list_mut(&mut self) -> Option<&mut Vec<Bencode>> {
        match self {
            Bencode::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn dict_mut(&mut self) -> Option<&mut BTreeMap<Vec<u8>, Bencode>> {
        match self {
            Bencode::Dict(entries) => Some(entries),
            _ => None,
        }
    }
}
