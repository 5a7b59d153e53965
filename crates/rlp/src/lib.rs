//! Canonical recursively-length-prefixed (RLP) encoding and decoding.
//!
//! Every value on the wire is either a byte string or a list of values, each
//! framed by a length prefix. Encodings are canonical: there is exactly one
//! valid byte sequence per value, and every non-canonical form of untrusted
//! input is rejected with a [`DecodeError`].
//!
//! Use the [`encode`]/[`decode`] shortcuts to convert a whole value at once.
//! Use [`RlpStream`] to build output in portions, with
//! [`begin_list`](RlpStream::begin_list)/[`end_list`](RlpStream::end_list)
//! framing nested structures whose sizes are only known after the fact. Use
//! [`Rlp`] for a lazy, non-copying view over encoded bytes when only part of
//! a structure needs materializing.

mod decode;
pub use decode::{decode, Decodable, DecodeError};

mod encode;
pub use encode::{encode, encode_list, length_of_length, Encodable};

mod stream;
pub use stream::{ListMarker, RlpStream};

mod types;
pub use types::{Header, ItemKind, PayloadInfo, EMPTY_LIST_CODE, EMPTY_STRING_CODE};

mod view;
pub use view::{Rlp, RlpIter};

#[doc(no_inline)]
pub use bytes::{self, Bytes, BytesMut};
