use crate::{
    encode::Encodable,
    types::{Header, EMPTY_LIST_CODE, EMPTY_STRING_CODE},
};
use bytes::{BufMut, BytesMut};

/// Handle for an open list on an [`RlpStream`].
///
/// Returned by [`RlpStream::begin_list`] and consumed by
/// [`RlpStream::end_list`]. Markers nest strictly LIFO; closing a marker out
/// of order is a programming error and panics.
#[derive(Debug)]
#[must_use = "an open list must be closed with end_list"]
pub struct ListMarker {
    payload_start: usize,
    depth: usize,
}

/// Write-side RLP stream.
///
/// Values are appended one after another; lists are framed with
/// [`begin_list`](Self::begin_list)/[`end_list`](Self::end_list) pairs, which
/// may nest to arbitrary depth. A list's payload length is only known once
/// its contents have been appended, so `end_list` splices the canonical
/// header in front of the accumulated payload.
///
/// The finished buffer is obtained with [`out`](Self::out), which consumes
/// the stream: nothing can be appended after finalization. Output is always
/// canonical; malformed output is only reachable through misuse that panics
/// (unbalanced markers, finalizing with an open list).
#[derive(Debug, Default)]
pub struct RlpStream {
    buf: BytesMut,
    open_lists: Vec<usize>,
    toplevel_items: usize,
}

impl RlpStream {
    /// Creates a stream with an empty output buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an encodable value.
    pub fn append<E: Encodable>(&mut self, value: &E) -> &mut Self {
        value.encode(self);
        self
    }

    /// Appends a byte string with canonical framing.
    ///
    /// A string of length 1 whose byte is below 0x80 is emitted as the byte
    /// itself; everything else gets a length prefix.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        if bytes.len() == 1 && bytes[0] < EMPTY_STRING_CODE {
            self.buf.put_u8(bytes[0]);
        } else {
            Header { list: false, payload_length: bytes.len() }.encode(&mut self.buf);
            self.buf.put_slice(bytes);
        }
        self.note_item();
        self
    }

    /// Appends a slice of values as a single list.
    pub fn append_list<E: Encodable>(&mut self, values: &[E]) -> &mut Self {
        let marker = self.begin_list();
        for value in values {
            value.encode(self);
        }
        self.end_list(marker);
        self
    }

    /// Appends an empty list.
    pub fn append_empty_list(&mut self) -> &mut Self {
        self.buf.put_u8(EMPTY_LIST_CODE);
        self.note_item();
        self
    }

    /// Splices pre-encoded RLP into the stream verbatim.
    ///
    /// The caller asserts that `rlp` holds exactly `item_count` complete
    /// encoded items.
    pub fn append_raw(&mut self, rlp: &[u8], item_count: usize) -> &mut Self {
        self.buf.put_slice(rlp);
        if self.open_lists.is_empty() {
            self.toplevel_items += item_count;
        }
        self
    }

    /// Opens a list. Everything appended until the matching
    /// [`end_list`](Self::end_list) becomes the list's payload.
    pub fn begin_list(&mut self) -> ListMarker {
        self.open_lists.push(self.buf.len());
        ListMarker { payload_start: self.buf.len(), depth: self.open_lists.len() }
    }

    /// Closes the list opened by `marker`, writing its length prefix.
    ///
    /// The payload accumulated since the marker is shifted to make room for
    /// the canonical header. Panics if `marker` is not the innermost open
    /// list.
    pub fn end_list(&mut self, marker: ListMarker) {
        assert_eq!(
            marker.depth,
            self.open_lists.len(),
            "list marker closed out of order"
        );
        let payload_start = self.open_lists.pop().expect("no open list");
        debug_assert_eq!(payload_start, marker.payload_start);

        let payload_length = self.buf.len() - payload_start;
        // Longest possible header: prefix byte plus an 8-byte length field.
        let mut scratch = [0u8; 9];
        let mut cursor = &mut scratch[..];
        Header { list: true, payload_length }.encode(&mut cursor);
        let header_len = 9 - cursor.len();

        let payload = self.buf.split_off(payload_start);
        self.buf.extend_from_slice(&scratch[..header_len]);
        self.buf.extend_from_slice(&payload);
        self.note_item();
    }

    /// True when no list is open and exactly one top-level item has been
    /// appended, i.e. the buffer is one complete self-describing item.
    pub fn is_finished(&self) -> bool {
        self.open_lists.is_empty() && self.toplevel_items == 1
    }

    /// Bytes written so far, including any unclosed list payloads.
    pub fn as_raw(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finalizes the stream and returns the output buffer.
    ///
    /// Consuming the stream guarantees nothing can be appended afterwards.
    /// Panics unless the buffer holds exactly one complete item; producing a
    /// partial buffer is a programming error, not a recoverable condition.
    pub fn out(self) -> BytesMut {
        assert!(self.is_finished(), "stream must hold exactly one complete item");
        self.buf
    }

    fn note_item(&mut self) {
        if self.open_lists.is_empty() {
            self.toplevel_items += 1;
        }
    }
}
