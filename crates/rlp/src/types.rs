/// RLP prefix byte for an empty byte string, and the lower bound of the
/// string prefix range.
pub const EMPTY_STRING_CODE: u8 = 0x80;

/// RLP prefix byte for an empty list, and the lower bound of the list
/// prefix range.
pub const EMPTY_LIST_CODE: u8 = 0xC0;

/// Class of an encoded item, determined by its first byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// `0x00..=0x7f`: the byte is its own payload, there is no header.
    SingleByte,
    /// `0x80..=0xbf`: a length-prefixed byte string.
    String,
    /// `0xc0..=0xff`: a length-prefixed list of items.
    List,
}

/// Decoded representation of an item header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// True if the item is a list.
    pub list: bool,
    /// Length of the item payload in bytes.
    pub payload_length: usize,
}

/// Geometry of an encoded item: its class, header size, and payload size.
///
/// Computed without reading the payload, so callers can slice raw encoded
/// bytes (e.g. to hash a subtree) without materializing anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadInfo {
    /// Class of the item.
    pub kind: ItemKind,
    /// Size of the prefix and optional length field. Zero for single bytes.
    pub header_len: usize,
    /// Size of the payload.
    pub payload_len: usize,
}

impl PayloadInfo {
    /// Total encoded size of the item, header included.
    pub const fn total(&self) -> usize {
        self.header_len + self.payload_len
    }
}
