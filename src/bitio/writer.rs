/// MSB-first bit writer, symmetric with `BitReader`. Buffers a partial
/// byte and emits finished bytes to an owned `Vec<u8>` sink. Supports the
/// same word-swap convention as the reader: if `word_swap` is set, byte
/// pairs in the finished output are swapped once the buffer is
/// finalized, restoring the 16-bit little-endian word layout STR
/// bitstreams are stored in.
pub struct BitWriter {
    out: Vec<u8>,
    partial: u8,
    partial_bits: u32,
    word_swap: bool,
}

impl BitWriter {
    pub fn new(word_swap: bool) -> Self {
        BitWriter {
            out: Vec::new(),
            partial: 0,
            partial_bits: 0,
            word_swap,
        }
    }

    /// Writes the low `n` bits (1 <= n <= 24) of `value`, most significant
    /// bit first.
    pub fn write(&mut self, value: u32, n: u32) {
        debug_assert!(n >= 1 && n <= 24);
        debug_assert!(n == 32 || value < (1 << n));

        let mut remaining = n;
        while remaining > 0 {
            let space = 8 - self.partial_bits;
            let take = remaining.min(space);

            let shift = remaining - take;
            let bits = (value >> shift) & ((1 << take) - 1);

            self.partial = (self.partial << take) | bits as u8;
            self.partial_bits += take;
            remaining -= take;

            if self.partial_bits == 8 {
                self.out.push(self.partial);
                self.partial = 0;
                self.partial_bits = 0;
            }
        }
    }

    /// Current bit position, including buffered-but-unflushed bits.
    pub fn position(&self) -> u64 {
        self.out.len() as u64 * 8 + self.partial_bits as u64
    }

    /// Pads the final partial byte with zero bits and returns the
    /// finished buffer, applying the word-swap if configured.
    pub fn finish(mut self) -> Vec<u8> {
        if self.partial_bits > 0 {
            self.partial <<= 8 - self.partial_bits;
            self.out.push(self.partial);
            self.partial = 0;
            self.partial_bits = 0;
        }

        if self.word_swap {
            if self.out.len() % 2 == 1 {
                self.out.push(0);
            }
            let mut i = 0;
            while i + 1 < self.out.len() {
                self.out.swap(i, i + 1);
                i += 2;
            }
        }

        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::BitReader;

    #[test]
    fn round_trips_through_reader() {
        let mut w = BitWriter::new(false);
        w.write(0b1, 1);
        w.write(0b0110, 4);
        w.write(0xab, 8);
        let bytes = w.finish();

        let mut r = BitReader::new(&bytes, false);
        assert_eq!(r.read(1).unwrap(), 0b1);
        assert_eq!(r.read(4).unwrap(), 0b0110);
        assert_eq!(r.read(8).unwrap(), 0xab);
    }

    #[test]
    fn word_swap_round_trips() {
        let mut w = BitWriter::new(true);
        w.write(0x12, 8);
        w.write(0x34, 8);
        let bytes = w.finish();

        let mut r = BitReader::new(&bytes, true);
        assert_eq!(r.read(8).unwrap(), 0x12);
        assert_eq!(r.read(8).unwrap(), 0x34);
    }

    #[test]
    fn word_swap_pads_a_trailing_odd_byte_instead_of_dropping_it() {
        let mut w = BitWriter::new(true);
        w.write(0x12, 8);
        w.write(0x34, 8);
        w.write(0x56, 8);
        let bytes = w.finish();
        assert_eq!(bytes.len(), 4);

        let mut r = BitReader::new(&bytes, true);
        assert_eq!(r.read(8).unwrap(), 0x12);
        assert_eq!(r.read(8).unwrap(), 0x34);
        assert_eq!(r.read(8).unwrap(), 0x56);
    }
}
