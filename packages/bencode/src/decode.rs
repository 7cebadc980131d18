use std::collections::BTreeMap;
use std::str;

use crate::error::Error;
use crate::value::Bencode;
use crate::{BEN_END, BYTE_LEN_END, BYTE_LEN_HIGH, BYTE_LEN_LOW, DICT_START, INT_START, LIST_START, MAX_DECODE_RECURSION};

/// Single-pass decoder. The top-level value must consume the whole buffer.
pub(crate) fn decode(bytes: &[u8]) -> Result<Bencode, Error> {
    let (value, next_pos) = decode_value(bytes, 0, 0)?;

    if next_pos != bytes.len() {
        return Err(Error::TrailingBytes { pos: next_pos });
    }

    Ok(value)
}

fn decode_value(bytes: &[u8], pos: usize, depth: usize) -> Result<(Bencode, usize), Error> {
    if depth >= MAX_DECODE_RECURSION {
        return Err(Error::InvalidRecursionExceeded {
            pos,
            max: MAX_DECODE_RECURSION,
        });
    }

    let curr_byte = peek_byte(bytes, pos)?;

    match curr_byte {
        INT_START => {
            let (value, next_pos) = decode_int(bytes, pos + 1, BEN_END)?;
            Ok((Bencode::Int(value), next_pos))
        }
        LIST_START => decode_list(bytes, pos + 1, depth),
        DICT_START => decode_dict(bytes, pos + 1, depth),
        BYTE_LEN_LOW..=BYTE_LEN_HIGH => {
            let (value, next_pos) = decode_bytes(bytes, pos)?;
            Ok((Bencode::Bytes(value.to_vec()), next_pos))
        }
        _ => Err(Error::InvalidByte { pos }),
    }
}

fn decode_int(bytes: &[u8], pos: usize, delim: u8) -> Result<(i64, usize), Error> {
    let (_, begin_decode) = bytes.split_at(pos.min(bytes.len()));

    let Some(relative_end_pos) = begin_decode.iter().position(|n| *n == delim) else {
        return Err(Error::InvalidIntNoDelimiter { pos });
    };
    let int_byte_slice = &begin_decode[..relative_end_pos];

    if int_byte_slice.len() > 1 {
        // Negative zero is not allowed (this would not be caught when converting).
        if int_byte_slice[0] == b'-' && int_byte_slice[1] == b'0' {
            return Err(Error::InvalidIntNegativeZero { pos });
        }

        // Zero padding is illegal, and unspecified for key lengths (we disallow both).
        if int_byte_slice[0] == b'0' {
            return Err(Error::InvalidIntZeroPadding { pos });
        }
    }

    let Ok(int_str) = str::from_utf8(int_byte_slice) else {
        return Err(Error::InvalidIntParse { pos });
    };

    // Position of the end of the integer, the next byte starts the next value.
    let absolute_end_pos = pos + relative_end_pos;
    let next_pos = absolute_end_pos + 1;
    match int_str.parse::<i64>() {
        Ok(n) => Ok((n, next_pos)),
        Err(_) => Err(Error::InvalidIntParse { pos }),
    }
}

fn decode_bytes(bytes: &[u8], pos: usize) -> Result<(&[u8], usize), Error> {
    let (num_bytes, start_pos) = decode_int(bytes, pos, BYTE_LEN_END)?;

    if num_bytes < 0 {
        return Err(Error::InvalidLengthNegative { pos });
    }

    let num_bytes = usize::try_from(num_bytes).map_err(|_| Error::InvalidLengthOverflow { pos })?;

    if num_bytes > bytes[start_pos..].len() {
        return Err(Error::InvalidLengthOverflow { pos });
    }

    let next_pos = start_pos + num_bytes;
    Ok((&bytes[start_pos..next_pos], next_pos))
}

fn decode_list(bytes: &[u8], pos: usize, depth: usize) -> Result<(Bencode, usize), Error> {
    let mut bencode_list = Vec::new();

    let mut curr_pos = pos;
    let mut curr_byte = peek_byte(bytes, curr_pos)?;

    while curr_byte != BEN_END {
        let (bencode, next_pos) = decode_value(bytes, curr_pos, depth + 1)?;

        bencode_list.push(bencode);

        curr_pos = next_pos;
        curr_byte = peek_byte(bytes, curr_pos)?;
    }

    let next_pos = curr_pos + 1;
    Ok((Bencode::List(bencode_list), next_pos))
}

fn decode_dict(bytes: &[u8], pos: usize, depth: usize) -> Result<(Bencode, usize), Error> {
    let mut bencode_dict = BTreeMap::new();

    let mut curr_pos = pos;
    let mut curr_byte = peek_byte(bytes, curr_pos)?;

    while curr_byte != BEN_END {
        let (key_bytes, next_pos) = decode_bytes(bytes, curr_pos)?;
        curr_pos = next_pos;

        let (value, next_pos) = decode_value(bytes, curr_pos, depth + 1)?;

        // Out-of-order and duplicate keys are tolerated on decode (the last
        // occurrence of a key wins); canonical ordering is an encoder
        // concern.
        bencode_dict.insert(key_bytes.to_vec(), value);

        curr_pos = next_pos;
        curr_byte = peek_byte(bytes, curr_pos)?;
    }

    let next_pos = curr_pos + 1;
    Ok((Bencode::Dict(bencode_dict), next_pos))
}

fn peek_byte(bytes: &[u8], pos: usize) -> Result<u8, Error> {
    bytes.get(pos).copied().ok_or(Error::BytesEmpty { pos })
}
