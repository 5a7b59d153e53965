use crate::{
    decode::{Decodable, DecodeError},
    types::{ItemKind, PayloadInfo},
};

/// Non-owning view over one encoded item.
///
/// Construction validates the header (bounds and canonicality) eagerly, but
/// payload bytes are only interpreted when a typed accessor is called, so
/// large lists can be decoded selectively.
///
/// Views are stateless: [`at`](Self::at), [`data`](Self::data) and
/// [`as_val`](Self::as_val) recompute from the immutable header and may be
/// called any number of times with the same result. A view never mutates the
/// buffer it was built over and is valid for the buffer's lifetime.
#[derive(Clone, Copy, Debug)]
pub struct Rlp<'a> {
    /// The full encoding of the item, header included.
    raw: &'a [u8],
    info: PayloadInfo,
}

impl<'a> Rlp<'a> {
    /// Builds a view over the item at the head of `buf`.
    ///
    /// Bytes past the item's end are ignored; [`as_raw`](Self::as_raw)
    /// reports the item's exact extent.
    pub fn new(buf: &'a [u8]) -> Result<Self, DecodeError> {
        let info = PayloadInfo::from_slice(buf)?;
        Ok(Self { raw: &buf[..info.total()], info })
    }

    /// Class, header length and payload length of the item.
    pub fn payload_info(&self) -> PayloadInfo {
        self.info
    }

    /// The item's full encoding, header included.
    pub fn as_raw(&self) -> &'a [u8] {
        self.raw
    }

    /// True if the item is a list.
    pub fn is_list(&self) -> bool {
        self.info.kind == ItemKind::List
    }

    /// True if the item is a byte string (or a single byte).
    pub fn is_data(&self) -> bool {
        !self.is_list()
    }

    /// True if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.info.payload_len == 0
    }

    fn payload(&self) -> &'a [u8] {
        &self.raw[self.info.header_len..]
    }

    /// Raw payload of a byte string, without copying.
    pub fn data(&self) -> Result<&'a [u8], DecodeError> {
        if self.is_list() {
            return Err(DecodeError::UnexpectedList)
        }
        Ok(self.payload())
    }

    /// Number of direct children of a list, found by scanning child headers
    /// without copying payloads.
    pub fn item_count(&self) -> Result<usize, DecodeError> {
        let mut count = 0;
        for item in self.iter()? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Fails with [`DecodeError::ListLengthMismatch`] unless the list has
    /// exactly `expected` children.
    pub fn expect_item_count(&self, expected: usize) -> Result<(), DecodeError> {
        let got = self.item_count()?;
        if got != expected {
            return Err(DecodeError::ListLengthMismatch { expected, got })
        }
        Ok(())
    }

    /// Child view at list position `index`.
    ///
    /// Each call rescans the child headers before `index`, so walking a
    /// whole list by position is quadratic; use [`iter`](Self::iter) to
    /// consume every child in one pass.
    pub fn at(&self, index: usize) -> Result<Rlp<'a>, DecodeError> {
        let mut iter = self.iter()?;
        for _ in 0..index {
            iter.next().ok_or(DecodeError::IndexOutOfRange)??;
        }
        iter.next().ok_or(DecodeError::IndexOutOfRange)?
    }

    /// Iterator over the child views of a list.
    pub fn iter(&self) -> Result<RlpIter<'a>, DecodeError> {
        if !self.is_list() {
            return Err(DecodeError::UnexpectedString)
        }
        Ok(RlpIter { payload: self.payload() })
    }

    /// Materializes the item as a typed value.
    pub fn as_val<T: Decodable>(&self) -> Result<T, DecodeError> {
        T::decode(self)
    }
}

/// Iterator over the children of a list view.
///
/// Yields an `Err` and then fuses if a child header is malformed.
#[derive(Debug)]
pub struct RlpIter<'a> {
    payload: &'a [u8],
}

impl<'a> Iterator for RlpIter<'a> {
    type Item = Result<Rlp<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.payload.is_empty() {
            return None
        }
        match Rlp::new(self.payload) {
            Ok(item) => {
                self.payload = &self.payload[item.as_raw().len()..];
                Some(Ok(item))
            }
            Err(err) => {
                self.payload = &[];
                Some(Err(err))
            }
        }
    }
}
