//! Canonical binary codec.
//!
//! Every field is written big-endian at a fixed width with no padding.
//! Variable-length fields carry an explicit length prefix: `u16` for asset
//! names and symbols, `u32` for byte blobs and collection counts.
//!
//! Decoding goes through a bounds-checked [`Reader`]; reading past the end
//! of the buffer fails with [`CodecError::MalformedBuffer`] instead of
//! returning partial data.

use crate::error::CodecError;

/// Append-only big-endian byte writer.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write raw bytes with no length prefix.
    pub fn put_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a `u32` length followed by the bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_u32(len_u32(bytes.len()));
        self.buf.extend_from_slice(bytes);
    }

    /// Write a `u16` length followed by the UTF-8 bytes of `s`.
    ///
    /// Callers validate string lengths before encoding. Anything longer
    /// than `u16::MAX` bytes is cut at the last character boundary that
    /// fits, so the output always decodes as UTF-8.
    pub fn put_str16(&mut self, s: &str) {
        let mut len = s.len().min(u16::MAX as usize);
        while !s.is_char_boundary(len) {
            len -= 1;
        }
        self.put_u16(len as u16);
        self.buf.extend_from_slice(&s.as_bytes()[..len]);
    }

    /// Write a `u32` count followed by each item in the given order.
    pub fn put_list<T: Encode>(&mut self, items: &[T]) {
        self.put_u32(len_u32(items.len()));
        for item in items {
            item.encode_into(self);
        }
    }

    /// Write a `u32` count followed by the items in canonical byte order.
    pub fn put_sorted_list<T: Encode>(&mut self, items: &[T]) {
        self.put_u32(len_u32(items.len()));
        for encoded in sorted_encodings(items) {
            self.buf.extend_from_slice(&encoded);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Bounds-checked big-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `offset`. Fails if the offset is past the end.
    pub fn at(buf: &'a [u8], offset: usize) -> Result<Self, CodecError> {
        if offset > buf.len() {
            return Err(CodecError::MalformedBuffer {
                needed: offset,
                remaining: buf.len(),
            });
        }
        Ok(Self { buf, pos: offset })
    }

    /// Current offset into the underlying buffer.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::MalformedBuffer {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn get_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.get_array::<1>()?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.get_array()?))
    }

    pub fn get_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.get_array()?))
    }

    pub fn get_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.get_array()?))
    }

    /// Read a `u32`-prefixed byte blob.
    pub fn get_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.get_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// Read a `u16`-prefixed UTF-8 string.
    pub fn get_str16(&mut self) -> Result<String, CodecError> {
        let len = self.get_u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Read a `u32` count. The count is checked against the remaining bytes
    /// so a hostile prefix cannot trigger a huge allocation.
    pub fn get_count(&mut self, min_item_len: usize) -> Result<usize, CodecError> {
        let count = self.get_u32()? as usize;
        let needed = count.saturating_mul(min_item_len.max(1));
        if needed > self.remaining() {
            return Err(CodecError::MalformedBuffer {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Read a `u32` count followed by that many items.
    pub fn get_list<T: Decode>(&mut self, min_item_len: usize) -> Result<Vec<T>, CodecError> {
        let count = self.get_count(min_item_len)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(self)?);
        }
        Ok(items)
    }

    /// Fail unless the whole buffer has been consumed.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// Types with a canonical byte encoding.
pub trait Encode {
    fn encode_into(&self, w: &mut Writer);

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode_into(&mut w);
        w.into_bytes()
    }
}

/// Types that can be parsed back from their canonical encoding.
pub trait Decode: Sized {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Decode from a complete buffer, rejecting trailing bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        let value = Self::decode(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    /// Decode starting at `offset`, returning the value and the offset just
    /// past it.
    fn decode_at(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut r = Reader::at(bytes, offset)?;
        let value = Self::decode(&mut r)?;
        Ok((value, r.offset()))
    }
}

/// Encode each item and return the encodings in ascending byte order.
pub fn sorted_encodings<T: Encode>(items: &[T]) -> Vec<Vec<u8>> {
    let mut encoded: Vec<Vec<u8>> = items.iter().map(Encode::to_bytes).collect();
    encoded.sort();
    encoded
}

/// Items ordered by their canonical encoding.
///
/// This is the order items are serialized in, and therefore the order
/// credentials must follow.
pub fn canonical_order<T: Encode>(items: &[T]) -> Vec<&T> {
    let mut keyed: Vec<(Vec<u8>, &T)> = items.iter().map(|item| (item.to_bytes(), item)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}

impl<const N: usize> Encode for [u8; N] {
    fn encode_into(&self, w: &mut Writer) {
        w.put_fixed(self);
    }
}

impl Encode for u32 {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(*self);
    }
}

impl Decode for u32 {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        r.get_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut w = Writer::new();
        w.put_u16(0x0102);
        w.put_u32(0x03040506);
        w.put_u64(0x0708090a0b0c0d0e);
        assert_eq!(
            w.into_bytes(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]
        );
    }

    #[test]
    fn oversized_strings_are_cut_on_a_char_boundary() {
        // 65_534 ASCII bytes then a two-byte character straddling the limit.
        let s = format!("{}é", "a".repeat(u16::MAX as usize - 1));
        let mut w = Writer::new();
        w.put_str16(&s);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let back = r.get_str16().unwrap();
        assert_eq!(back.len(), u16::MAX as usize - 1);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn bytes_are_u32_prefixed() {
        let mut w = Writer::new();
        w.put_bytes(b"hi");
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn strings_are_u16_prefixed() {
        let mut w = Writer::new();
        w.put_str16("AVA");
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0, 3, b'A', b'V', b'A']);
        let mut r = Reader::new(&bytes);
        assert_eq!(r.get_str16().unwrap(), "AVA");
        assert!(r.finish().is_ok());
    }

    #[test]
    fn reader_rejects_truncated_buffer() {
        let mut r = Reader::new(&[0, 0, 1]);
        assert_eq!(
            r.get_u32().unwrap_err(),
            CodecError::MalformedBuffer { needed: 4, remaining: 3 }
        );
    }

    #[test]
    fn reader_rejects_truncated_blob() {
        let mut r = Reader::new(&[0, 0, 0, 9, 1, 2]);
        assert!(matches!(
            r.get_bytes().unwrap_err(),
            CodecError::MalformedBuffer { needed: 9, remaining: 2 }
        ));
    }

    #[test]
    fn reader_rejects_oversized_count() {
        let mut r = Reader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0]);
        assert!(r.get_count(4).is_err());
    }

    #[test]
    fn reader_at_offset() {
        let buf = [9u8, 0, 0, 0, 7];
        let mut r = Reader::at(&buf, 1).unwrap();
        assert_eq!(r.get_u32().unwrap(), 7);
        assert_eq!(r.offset(), 5);
        assert!(Reader::at(&buf, 6).is_err());
    }

    #[test]
    fn finish_reports_trailing_bytes() {
        let mut r = Reader::new(&[0, 0, 0, 1, 0xAA]);
        r.get_u32().unwrap();
        assert_eq!(r.finish().unwrap_err(), CodecError::TrailingBytes(1));
    }

    #[test]
    fn sorted_list_is_order_independent() {
        let mut a = Writer::new();
        a.put_sorted_list(&[3u32, 1, 2]);
        let mut b = Writer::new();
        b.put_sorted_list(&[2u32, 3, 1]);
        assert_eq!(a.into_bytes(), b.into_bytes());
    }

    #[test]
    fn canonical_order_matches_sorted_encodings() {
        let items = [0x0200u32, 0x01, 0x0100];
        let ordered: Vec<u32> = canonical_order(&items).into_iter().copied().collect();
        assert_eq!(ordered, vec![0x01, 0x0100, 0x0200]);
    }

    #[test]
    fn decode_at_returns_new_offset() {
        let bytes = [0xEE, 0, 0, 0, 5, 0xFF];
        let (v, off) = u32::decode_at(&bytes, 1).unwrap();
        assert_eq!(v, 5);
        assert_eq!(off, 5);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sorted_list_ignores_input_order(mut items in prop::collection::vec(any::<u32>(), 0..16)) {
                let mut a = Writer::new();
                a.put_sorted_list(&items);
                items.reverse();
                let mut b = Writer::new();
                b.put_sorted_list(&items);
                prop_assert_eq!(a.into_bytes(), b.into_bytes());
            }

            #[test]
            fn reader_never_panics_on_garbage(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
                let mut r = Reader::new(&bytes);
                let _ = r.get_list::<u32>(4);
                let mut r = Reader::new(&bytes);
                let _ = r.get_bytes();
                let mut r = Reader::new(&bytes);
                let _ = r.get_str16();
            }
        }
    }
}
