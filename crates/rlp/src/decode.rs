use crate::{
    types::{Header, ItemKind, PayloadInfo, EMPTY_LIST_CODE, EMPTY_STRING_CODE},
    view::Rlp,
};
use bytes::{Buf, Bytes, BytesMut};

/// Error produced when decoding malformed or non-canonical input.
///
/// Every failure mode of untrusted input maps to one of these variants;
/// decoding never panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A header or payload claims more bytes than the buffer holds.
    #[error("input too short")]
    InputTooShort,
    /// A length field or integer payload has a leading zero byte.
    #[error("length field has a leading zero byte")]
    LeadingZero,
    /// The long length form was used for a payload shorter than 56 bytes.
    #[error("long length form used for a short payload")]
    NonCanonicalSize,
    /// A single byte below 0x80 was wrapped in a short-string prefix.
    #[error("single byte encoded as a short string")]
    NonCanonicalSingleByte,
    /// A byte string was requested but the item is a list.
    #[error("expected a byte string, found a list")]
    UnexpectedList,
    /// A list was requested but the item is a byte string.
    #[error("expected a list, found a byte string")]
    UnexpectedString,
    /// The payload length does not match what the target type requires.
    #[error("unexpected payload length")]
    UnexpectedLength,
    /// A child index past the end of a list.
    #[error("list index out of range")]
    IndexOutOfRange,
    /// An integer payload wider than the target type.
    #[error("integer payload wider than the target type")]
    Overflow,
    /// A list with a different child count than the decoded type requires.
    #[error("list length mismatch: expected {expected}, got {got}")]
    ListLengthMismatch {
        /// Child count the type requires.
        expected: usize,
        /// Child count observed in the input.
        got: usize,
    },
    /// Implementation-defined failure with a static message.
    #[error("{0}")]
    Custom(&'static str),
}

/// A type that can reconstruct itself from a decoded [`Rlp`] view.
///
/// Implementations consume child positions in the same order their
/// [`Encodable`](crate::Encodable) counterpart appends them. Any structural
/// mismatch is reported as a [`DecodeError`], never a panic.
pub trait Decodable: Sized {
    /// Decodes the value from the given view.
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError>;
}

/// Decodes a buffer holding exactly one encoded item.
///
/// Trailing bytes after the item are rejected with
/// [`DecodeError::UnexpectedLength`].
pub fn decode<T: Decodable>(buf: &[u8]) -> Result<T, DecodeError> {
    let rlp = Rlp::new(buf)?;
    if rlp.as_raw().len() != buf.len() {
        return Err(DecodeError::UnexpectedLength)
    }
    T::decode(&rlp)
}

impl PayloadInfo {
    /// Classifies the item starting at the head of `buf`.
    ///
    /// Validates the header eagerly: the buffer must hold the full header
    /// and payload, length fields must be minimal, and the long form must
    /// only be used for payloads longer than 55 bytes.
    pub fn from_slice(buf: &[u8]) -> Result<Self, DecodeError> {
        let first = *buf.first().ok_or(DecodeError::InputTooShort)?;
        let info = if first < EMPTY_STRING_CODE {
            PayloadInfo { kind: ItemKind::SingleByte, header_len: 0, payload_len: 1 }
        } else if first < 0xB8 {
            let payload_len = (first - EMPTY_STRING_CODE) as usize;
            if payload_len == 1 {
                let payload = *buf.get(1).ok_or(DecodeError::InputTooShort)?;
                if payload < EMPTY_STRING_CODE {
                    return Err(DecodeError::NonCanonicalSingleByte)
                }
            }
            PayloadInfo { kind: ItemKind::String, header_len: 1, payload_len }
        } else if first < EMPTY_LIST_CODE {
            let len_of_len = (first - 0xB7) as usize;
            let payload_len = long_length(&buf[1..], len_of_len)?;
            PayloadInfo { kind: ItemKind::String, header_len: 1 + len_of_len, payload_len }
        } else if first < 0xF8 {
            let payload_len = (first - EMPTY_LIST_CODE) as usize;
            PayloadInfo { kind: ItemKind::List, header_len: 1, payload_len }
        } else {
            let len_of_len = (first - 0xF7) as usize;
            let payload_len = long_length(&buf[1..], len_of_len)?;
            PayloadInfo { kind: ItemKind::List, header_len: 1 + len_of_len, payload_len }
        };

        // Compare against the bytes remaining after the header rather than
        // `info.total()`: a hostile length field near `usize::MAX` would
        // overflow the sum. The header is already known to fit.
        if buf.len() - info.header_len < info.payload_len {
            return Err(DecodeError::InputTooShort)
        }

        Ok(info)
    }
}

/// Reads a long-form length field of `len_of_len` bytes.
fn long_length(buf: &[u8], len_of_len: usize) -> Result<usize, DecodeError> {
    if buf.len() < len_of_len {
        return Err(DecodeError::InputTooShort)
    }
    let payload_len = usize::try_from(u64::from_be_bytes(
        static_left_pad(&buf[..len_of_len]).ok_or(DecodeError::LeadingZero)?,
    ))
    .map_err(|_| DecodeError::Custom("length does not fit in usize"))?;
    if payload_len < 56 {
        return Err(DecodeError::NonCanonicalSize)
    }
    Ok(payload_len)
}

impl Header {
    /// Decodes a header from the head of `buf`, advancing the cursor past
    /// it. For a single byte the cursor does not move: the byte is its own
    /// payload.
    ///
    /// Fails if the buffer is shorter than the header and payload imply, or
    /// if the header is non-canonical.
    pub fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let info = PayloadInfo::from_slice(buf)?;
        buf.advance(info.header_len);
        Ok(Header { list: info.kind == ItemKind::List, payload_length: info.payload_len })
    }
}

/// Left-pads the slice into an `N`-byte big-endian array, rejecting inputs
/// that are too wide or carry a leading zero.
pub(crate) fn static_left_pad<const N: usize>(data: &[u8]) -> Option<[u8; N]> {
    if data.len() > N {
        return None
    }

    let mut v = [0; N];

    if data.is_empty() {
        return Some(v)
    }

    if data[0] == 0 {
        return None
    }

    v[N - data.len()..].copy_from_slice(data);
    Some(v)
}

macro_rules! decode_integer {
    ($t:ty) => {
        impl Decodable for $t {
            fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
                let data = rlp.data()?;
                if data.len() > core::mem::size_of::<$t>() {
                    return Err(DecodeError::Overflow)
                }
                // The empty string is the canonical encoding of zero.
                if data.is_empty() {
                    return Ok(0)
                }
                Ok(<$t>::from_be_bytes(
                    static_left_pad(data).ok_or(DecodeError::LeadingZero)?,
                ))
            }
        }
    };
}

decode_integer!(usize);
decode_integer!(u8);
decode_integer!(u16);
decode_integer!(u32);
decode_integer!(u64);
decode_integer!(u128);

impl Decodable for bool {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        Ok(match u8::decode(rlp)? {
            0 => false,
            1 => true,
            _ => return Err(DecodeError::Custom("invalid bool value, must be 0 or 1")),
        })
    }
}

impl<const N: usize> Decodable for [u8; N] {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        let data = rlp.data()?;
        if data.len() != N {
            return Err(DecodeError::UnexpectedLength)
        }

        let mut to = [0_u8; N];
        to.copy_from_slice(data);
        Ok(to)
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        let mut to = Vec::new();
        for item in rlp.iter()? {
            to.push(T::decode(&item?)?);
        }
        Ok(to)
    }
}

impl Decodable for String {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        let data = rlp.data()?;
        core::str::from_utf8(data)
            .map(ToOwned::to_owned)
            .map_err(|_| DecodeError::Custom("invalid string"))
    }
}

impl Decodable for BytesMut {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        let data = rlp.data()?;
        let mut to = BytesMut::with_capacity(data.len());
        to.extend_from_slice(data);
        Ok(to)
    }
}

impl Decodable for Bytes {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        BytesMut::decode(rlp).map(BytesMut::freeze)
    }
}

impl<T: Decodable> Decodable for Box<T> {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        T::decode(rlp).map(Box::new)
    }
}

impl<T: Decodable> Decodable for std::sync::Arc<T> {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecodeError> {
        T::decode(rlp).map(std::sync::Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Debug;
    use hex_literal::hex;

    fn check_decode<'a, T, IT>(fixtures: IT)
    where
        T: Decodable + PartialEq + Debug,
        IT: IntoIterator<Item = (Result<T, DecodeError>, &'a [u8])>,
    {
        for (expected, input) in fixtures {
            assert_eq!(decode::<T>(input), expected);
        }
    }

    #[test]
    fn decode_strings() {
        check_decode::<Bytes, _>(vec![
            (Ok(hex!("00")[..].to_vec().into()), &hex!("00")[..]),
            (Ok(hex!("")[..].to_vec().into()), &hex!("80")[..]),
            (
                Ok(hex!("6f62636465666768696a6b6c6d")[..].to_vec().into()),
                &hex!("8D6F62636465666768696A6B6C6D")[..],
            ),
            (Err(DecodeError::UnexpectedList), &hex!("C0")[..]),
        ])
    }

    #[test]
    fn decode_fixed_length() {
        check_decode(vec![
            (Ok(hex!("6f62636465666768696a6b6c6d")), &hex!("8D6F62636465666768696A6B6C6D")[..]),
            (Err(DecodeError::UnexpectedLength), &hex!("8C6F62636465666768696A6B6C")[..]),
            (Err(DecodeError::UnexpectedLength), &hex!("8E6F62636465666768696A6B6C6D6E")[..]),
        ])
    }

    #[test]
    fn decode_u64() {
        check_decode(vec![
            (Ok(9_u64), &hex!("09")[..]),
            (Ok(0_u64), &hex!("80")[..]),
            (Ok(0x0505_u64), &hex!("820505")[..]),
            (Ok(0xCE05050505_u64), &hex!("85CE05050505")[..]),
            (Err(DecodeError::Overflow), &hex!("8AFFFFFFFFFFFFFFFFFF7C")[..]),
            (Err(DecodeError::InputTooShort), &hex!("8BFFFFFFFFFFFFFFFFFF7C")[..]),
            (Err(DecodeError::UnexpectedList), &hex!("C0")[..]),
            (Err(DecodeError::LeadingZero), &hex!("00")[..]),
            (Err(DecodeError::NonCanonicalSingleByte), &hex!("8105")[..]),
            (Err(DecodeError::LeadingZero), &hex!("8200F4")[..]),
            (Err(DecodeError::NonCanonicalSize), &hex!("B8020004")[..]),
            (
                Err(DecodeError::Overflow),
                &hex!("A101000000000000000000000000000000000000008B000000000000000000000000")[..],
            ),
        ])
    }

    #[test]
    fn decode_u128() {
        check_decode(vec![
            (Ok(0_u128), &hex!("80")[..]),
            (Ok(0xFFFFFFFFFFFFFFFFFF7C_u128), &hex!("8AFFFFFFFFFFFFFFFFFF7C")[..]),
            (
                Ok(0x10203E405060708090A0B0C0D0E0F2_u128),
                &hex!("8F10203E405060708090A0B0C0D0E0F2")[..],
            ),
            (
                Err(DecodeError::Overflow),
                &hex!("A101000000000000000000000000000000000000008B000000000000000000000000")[..],
            ),
        ])
    }

    #[test]
    fn decode_bool() {
        check_decode(vec![
            (Ok(false), &hex!("80")[..]),
            (Ok(true), &hex!("01")[..]),
            (Err(DecodeError::Custom("invalid bool value, must be 0 or 1")), &hex!("02")[..]),
        ])
    }

    #[test]
    fn decode_vectors() {
        check_decode::<Vec<u64>, _>(vec![
            (Ok(vec![]), &hex!("C0")[..]),
            (Ok(vec![0xBBCCB5_u64, 0xFFC0B5_u64]), &hex!("C883BBCCB583FFC0B5")[..]),
        ])
    }

    #[test]
    fn decode_string_types() {
        check_decode::<String, _>(vec![
            (Ok("".to_owned()), &hex!("80")[..]),
            (Ok("test str".to_owned()), &hex!("887465737420737472")[..]),
            (Err(DecodeError::UnexpectedList), &hex!("C0")[..]),
        ])
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        assert_eq!(decode::<u64>(&hex!("09FF")), Err(DecodeError::UnexpectedLength));
    }

    #[test]
    fn header_cursor_semantics() {
        let mut buf = &hex!("887465737420737472")[..];
        let h = Header::decode(&mut buf).unwrap();
        assert_eq!(h, Header { list: false, payload_length: 8 });
        assert_eq!(buf.len(), 8);

        // Single byte: the byte is the payload, so the cursor stays put.
        let mut buf = &hex!("7B")[..];
        let h = Header::decode(&mut buf).unwrap();
        assert_eq!(h, Header { list: false, payload_length: 1 });
        assert_eq!(buf, &hex!("7B")[..]);
    }

    #[test]
    fn long_length_field_canonicality() {
        // 56-byte string, minimal long form.
        let mut input = vec![0xB8, 56];
        input.extend_from_slice(&[b'x'; 56]);
        let info = PayloadInfo::from_slice(&input).unwrap();
        assert_eq!(info.header_len, 2);
        assert_eq!(info.payload_len, 56);

        // Same payload but with a zero-padded length field.
        let mut input = vec![0xB9, 0, 56];
        input.extend_from_slice(&[b'x'; 56]);
        assert_eq!(PayloadInfo::from_slice(&input), Err(DecodeError::LeadingZero));
    }

    #[test]
    fn list_length_field_canonicality() {
        // 56 bytes of list payload, minimal long form.
        let mut input = vec![0xF8, 56];
        input.extend_from_slice(&[0x01; 56]);
        let info = PayloadInfo::from_slice(&input).unwrap();
        assert_eq!(info.header_len, 2);
        assert_eq!(info.payload_len, 56);

        // Long list form for a payload that fits the short form.
        let mut input = vec![0xF8, 55];
        input.extend_from_slice(&[0x01; 55]);
        assert_eq!(PayloadInfo::from_slice(&input), Err(DecodeError::NonCanonicalSize));

        // List length field with a leading zero byte.
        let mut input = vec![0xF9, 0, 56];
        input.extend_from_slice(&[0x01; 56]);
        assert_eq!(PayloadInfo::from_slice(&input), Err(DecodeError::LeadingZero));
    }

    #[test]
    fn huge_length_field_is_an_error_not_a_panic() {
        // Length fields close to usize::MAX must fail the bounds check
        // without overflowing it.
        assert_eq!(
            decode::<Vec<u64>>(&hex!("F9FFFF")),
            Err(DecodeError::InputTooShort)
        );
        assert_eq!(
            decode::<Vec<u64>>(&hex!("FFFFFFFFFFFFFFFFFF")),
            Err(DecodeError::InputTooShort)
        );
        assert_eq!(
            decode::<Bytes>(&hex!("BFFFFFFFFFFFFFFFFF")),
            Err(DecodeError::InputTooShort)
        );
    }
}
