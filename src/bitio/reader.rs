use crate::errors::BlockCoord;
use crate::{errors, Result};

/// MSB-first bit reader over an owned byte buffer.
///
/// STR codecs store their payload as a sequence of 16-bit little-endian
/// words whose *internal* bit order is big-endian, so the reader swaps
/// byte pairs before bit extraction when `word_swap` is enabled. This
/// mirrors the teacher's `io::read::BitStream`, generalized from a
/// streaming `Read` source to an owned buffer (bitstream codecs operate
/// on a fully demuxed frame, not a pull stream) and extended with
/// `peek`/`position`, which the VLC fast-decode strategy needs.
pub struct BitReader<'a> {
    buf: &'a [u8],
    bit_pos: u64,
    word_swap: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8], word_swap: bool) -> Self {
        BitReader {
            buf,
            bit_pos: 0,
            word_swap,
        }
    }

    #[inline(always)]
    fn logical_byte(&self, idx: usize) -> u8 {
        let phys = if self.word_swap {
            if idx % 2 == 0 {
                idx + 1
            } else {
                idx - 1
            }
        } else {
            idx
        };
        self.buf.get(phys).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bits_remaining(&self) -> u64 {
        let total = self.buf.len() as u64 * 8;
        total.saturating_sub(self.bit_pos)
    }

    /// Returns the next `n` bits (1 <= n <= 24) without advancing.
    pub fn peek(&self, n: u32) -> Result<u32> {
        debug_assert!(n >= 1 && n <= 24);

        if self.bits_remaining() < n as u64 {
            return errors::end_of_stream(BlockCoord::default());
        }

        let byte_idx = (self.bit_pos / 8) as usize;
        let bit_off = (self.bit_pos % 8) as u32;
        let bytes_needed = ((bit_off + n) as usize + 7) / 8;

        let mut acc: u64 = 0;
        for i in 0..bytes_needed {
            acc = (acc << 8) | self.logical_byte(byte_idx + i) as u64;
        }

        let total_bits = (bytes_needed * 8) as u32;
        let shift = total_bits - bit_off - n;
        let mask = (1u64 << n) - 1;

        Ok(((acc >> shift) & mask) as u32)
    }

    /// Reads the next `n` bits (1 <= n <= 24), advancing the cursor.
    pub fn read(&mut self, n: u32) -> Result<u32> {
        let v = self.peek(n)?;
        self.bit_pos += n as u64;
        Ok(v)
    }

    /// Advances the cursor by `n` bits. Running past the end of the
    /// buffer is not an error: padding regions are allowed.
    pub fn skip(&mut self, n: u32) {
        self.bit_pos += n as u64;
    }

    /// Current bit offset from the start of the buffer.
    pub fn position(&self) -> u64 {
        self.bit_pos
    }

    /// True if there are no more bits left to read.
    pub fn is_exhausted(&self) -> bool {
        self.bits_remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_msb_first() {
        let buf = [0b1010_1100u8];
        let mut r = BitReader::new(&buf, false);
        assert_eq!(r.read(1).unwrap(), 1);
        assert_eq!(r.read(1).unwrap(), 0);
        assert_eq!(r.read(2).unwrap(), 0b10);
        assert_eq!(r.read(4).unwrap(), 0b1100);
    }

    #[test]
    fn peek_does_not_advance() {
        let buf = [0xffu8, 0x00];
        let mut r = BitReader::new(&buf, false);
        assert_eq!(r.peek(8).unwrap(), 0xff);
        assert_eq!(r.peek(8).unwrap(), 0xff);
        assert_eq!(r.read(8).unwrap(), 0xff);
        assert_eq!(r.read(8).unwrap(), 0x00);
    }

    #[test]
    fn word_swap_exchanges_byte_pairs() {
        // Logical stream should read as [0x34, 0x12] when the physical
        // bytes are stored [0x12, 0x34].
        let buf = [0x12u8, 0x34];
        let mut r = BitReader::new(&buf, true);
        assert_eq!(r.read(8).unwrap(), 0x34);
        assert_eq!(r.read(8).unwrap(), 0x12);
    }

    #[test]
    fn skip_past_end_is_not_an_error() {
        let buf = [0xffu8];
        let mut r = BitReader::new(&buf, false);
        r.skip(100);
        assert!(r.is_exhausted());
    }

    #[test]
    fn read_past_end_is_end_of_stream() {
        let buf = [0xffu8];
        let mut r = BitReader::new(&buf, false);
        r.skip(4);
        assert!(r.read(8).is_err());
    }
}
