use std::io::{self, Read, Write};

/// Number of bytes used by the external builder for suffix-array samples,
/// run lengths and thresholds (5-byte little-endian unsigned integers).
pub const U40_BYTES: usize = 5;

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u32 in little-endian format
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Write a u64 in little-endian format
pub fn write_u64_le<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u64 in little-endian format
pub fn read_u64_le<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Decode a 5-byte little-endian unsigned integer from a slice.
///
/// Values at or above 2^40 are not representable; the builder pipeline never
/// produces them for texts it can handle.
pub fn decode_u40_le(buf: &[u8; U40_BYTES]) -> u64 {
    let mut word = [0u8; 8];
    word[..U40_BYTES].copy_from_slice(buf);
    u64::from_le_bytes(word)
}

/// Encode a value as a 5-byte little-endian unsigned integer.
pub fn encode_u40_le(value: u64) -> [u8; U40_BYTES] {
    debug_assert!(value < (1u64 << 40));
    let word = value.to_le_bytes();
    let mut buf = [0u8; U40_BYTES];
    buf.copy_from_slice(&word[..U40_BYTES]);
    buf
}

/// Iterate over the 5-byte little-endian integers packed in a byte slice.
///
/// The slice length must be a multiple of [`U40_BYTES`]; callers validate
/// this before decoding.
pub fn iter_u40_le(data: &[u8]) -> impl Iterator<Item = u64> + '_ {
    data.chunks_exact(U40_BYTES).map(|chunk| {
        let mut buf = [0u8; U40_BYTES];
        buf.copy_from_slice(chunk);
        decode_u40_le(&buf)
    })
}

/// A writer that discards its input and counts bytes written.
///
/// Used to report per-component serialized sizes without allocating.
pub struct CountingWriter {
    bytes: u64,
}

impl CountingWriter {
    pub fn new() -> Self {
        Self { bytes: 0 }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl Default for CountingWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
