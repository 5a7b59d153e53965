use crate::{
    stream::RlpStream,
    types::{Header, EMPTY_LIST_CODE, EMPTY_STRING_CODE},
};
use auto_impl::auto_impl;
use bytes::{BufMut, Bytes, BytesMut};

/// Strips leading zero bytes from a big-endian byte view.
pub(crate) fn zeroless_view(v: &impl AsRef<[u8]>) -> &[u8] {
    let v = v.as_ref();
    &v[v.iter().take_while(|&&b| b == 0).count()..]
}

/// Returns the encoded size of a header for the given payload length.
pub const fn length_of_length(payload_length: usize) -> usize {
    if payload_length < 56 {
        1
    } else {
        1 + 8 - payload_length.leading_zeros() as usize / 8
    }
}

impl Header {
    /// Encodes the header into the `out` buffer.
    pub fn encode(&self, out: &mut dyn BufMut) {
        if self.payload_length < 56 {
            let code = if self.list { EMPTY_LIST_CODE } else { EMPTY_STRING_CODE };
            out.put_u8(code + self.payload_length as u8);
        } else {
            let len_be = self.payload_length.to_be_bytes();
            let len_be = zeroless_view(&len_be);
            let code = if self.list { 0xF7 } else { 0xB7 };
            out.put_u8(code + len_be.len() as u8);
            out.put_slice(len_be);
        }
    }

    /// Returns the length of the encoded header.
    pub fn length(&self) -> usize {
        length_of_length(self.payload_length)
    }
}

/// A type that can append itself to an [`RlpStream`] as exactly one value.
///
/// The structure a type emits (byte string or list, and the field order of a
/// list) is fixed per type and mirrored by its
/// [`Decodable`](crate::Decodable) counterpart.
#[auto_impl(&, Box, Arc)]
pub trait Encodable {
    /// Appends the value to the stream.
    fn encode(&self, s: &mut RlpStream);
}

/// Encodes a single value into a fresh buffer.
pub fn encode<E: Encodable>(value: &E) -> BytesMut {
    let mut stream = RlpStream::new();
    stream.append(value);
    stream.out()
}

/// Encodes a slice of values as a single list.
pub fn encode_list<E: Encodable>(values: &[E]) -> BytesMut {
    let mut stream = RlpStream::new();
    stream.append_list(values);
    stream.out()
}

impl<'a> Encodable for &'a [u8] {
    fn encode(&self, s: &mut RlpStream) {
        s.append_bytes(self);
    }
}

impl<const N: usize> Encodable for [u8; N] {
    fn encode(&self, s: &mut RlpStream) {
        s.append_bytes(self.as_slice());
    }
}

macro_rules! encodable_uint {
    ($t:ty) => {
        impl Encodable for $t {
            fn encode(&self, s: &mut RlpStream) {
                let be = self.to_be_bytes();
                s.append_bytes(zeroless_view(&be));
            }
        }
    };
}

encodable_uint!(usize);
encodable_uint!(u8);
encodable_uint!(u16);
encodable_uint!(u32);
encodable_uint!(u64);
encodable_uint!(u128);

impl Encodable for bool {
    fn encode(&self, s: &mut RlpStream) {
        (*self as u8).encode(s)
    }
}

impl Encodable for &str {
    fn encode(&self, s: &mut RlpStream) {
        s.append_bytes(self.as_bytes());
    }
}

impl Encodable for String {
    fn encode(&self, s: &mut RlpStream) {
        s.append_bytes(self.as_bytes());
    }
}

macro_rules! slice_impl {
    ($t:ty) => {
        impl Encodable for $t {
            fn encode(&self, s: &mut RlpStream) {
                s.append_bytes(&self[..]);
            }
        }
    };
}

slice_impl!(Bytes);
slice_impl!(BytesMut);

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, s: &mut RlpStream) {
        s.append_list(self);
    }
}
