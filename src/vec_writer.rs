//! `Vec<u8>` writer extension and RIFF chunk helpers.
//!
//! Provides write_u16_le, write_u24_le, etc. without going through `std::io::Write`,
//! which would force every call site to handle an error that can't happen.

/// Extension trait for writing little-endian values to a `Vec<u8>`.
pub(crate) trait VecWriter {
    /// Append a slice to the buffer.
    fn write_all(&mut self, data: &[u8]);

    /// Write a u8.
    fn write_u8(&mut self, v: u8);

    /// Write a u16 in little-endian.
    fn write_u16_le(&mut self, v: u16);

    /// Write a u24 (3 bytes) in little-endian. The top byte of `v` is dropped.
    fn write_u24_le(&mut self, v: u32);

    /// Write a u32 in little-endian.
    fn write_u32_le(&mut self, v: u32);
}

impl VecWriter for Vec<u8> {
    #[inline]
    fn write_all(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }

    #[inline]
    fn write_u8(&mut self, v: u8) {
        self.push(v);
    }

    #[inline]
    fn write_u16_le(&mut self, v: u16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    fn write_u24_le(&mut self, v: u32) {
        debug_assert!(v <= MAX_U24);
        let bytes = v.to_le_bytes();
        self.extend_from_slice(&bytes[..3]);
    }

    #[inline]
    fn write_u32_le(&mut self, v: u32) {
        self.extend_from_slice(&v.to_le_bytes());
    }
}

/// Largest value a 24-bit container field can hold.
pub(crate) const MAX_U24: u32 = (1 << 24) - 1;

/// Size of a chunk on disk: 8-byte header plus payload, padded to even length.
#[inline]
pub(crate) const fn chunk_size(inner_bytes: usize) -> usize {
    8 + inner_bytes + (inner_bytes & 1)
}

/// Write a complete RIFF chunk, padding odd payloads with a zero byte.
pub(crate) fn write_chunk(w: &mut Vec<u8>, name: &[u8; 4], data: &[u8]) {
    w.write_all(name);
    w.write_u32_le(data.len() as u32);
    w.write_all(data);
    if data.len() % 2 == 1 {
        w.write_u8(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u24_is_three_bytes() {
        let mut out = Vec::new();
        out.write_u24_le(0x0A0B0C);
        assert_eq!(out, [0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn odd_chunks_are_padded() {
        let mut out = Vec::new();
        write_chunk(&mut out, b"TEST", &[1, 2, 3]);
        assert_eq!(out.len(), chunk_size(3));
        assert_eq!(&out[..8], b"TEST\x03\x00\x00\x00");
        assert_eq!(&out[8..], &[1, 2, 3, 0]);
    }

    #[test]
    fn even_chunks_are_not_padded() {
        assert_eq!(chunk_size(4), 12);
        assert_eq!(chunk_size(0), 8);
    }
}
