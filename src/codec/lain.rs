//! Lain: structurally identical to STRv2 (raw header DC, shared AC
//! table, zero-bit padding) but carries its own magic so identification
//! can tell the two apart.

use super::ac_table;
use super::header::{self, FrameHeader, HEADER_LEN, MAGIC_LAIN};
use super::{block_coord, BitstreamCodec};
use crate::bitio::{BitReader, BitWriter};
use crate::errors;
use crate::mdec_code::MdecCode;
use crate::Result;

pub(crate) fn check_header(buf: &[u8]) -> bool {
    header::check_header_magic(buf, MAGIC_LAIN, None)
}

pub struct Lain;

impl Lain {
    pub fn new() -> Self {
        Lain
    }
}

impl BitstreamCodec for Lain {
    fn uncompress(&mut self, buf: &[u8], mb_width: u32, mb_height: u32) -> Result<Vec<MdecCode>> {
        let fh = FrameHeader::parse(buf)?;
        if fh.magic != MAGIC_LAIN {
            return errors::unrecognized_format();
        }
        fh.check_mb_count(mb_width, mb_height)?;

        let mut reader = BitReader::new(&buf[HEADER_LEN..], true);
        let mut codes = Vec::new();
        let block_count = mb_width * mb_height * 6;

        for n in 0..block_count {
            let at = block_coord(n, mb_width);
            let raw = reader.read(16)?;
            codes.push(MdecCode::from_raw(raw as u16, true));

            loop {
                let code = ac_table::decode_ac(&mut reader, at)?;
                let is_eob = code == MdecCode::Eob;
                codes.push(code);
                if is_eob {
                    break;
                }
            }
        }

        Ok(codes)
    }

    fn compress(&mut self, codes: &[MdecCode], mb_width: u32, mb_height: u32) -> Result<Vec<u8>> {
        let fh = FrameHeader {
            magic: MAGIC_LAIN,
            version: 0,
            qscale: 0,
            mb_count: (mb_width * mb_height) as u16,
        };

        let mut out = Vec::new();
        fh.write(&mut out);

        let mut writer = BitWriter::new(true);
        for code in codes {
            match code {
                MdecCode::Header { .. } => writer.write(code.to_raw() as u32, 16),
                MdecCode::Ac { .. } | MdecCode::Eob => ac_table::encode_ac(&mut writer, *code),
            }
        }
        out.extend_from_slice(&writer.finish());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_single_macroblock() {
        let mut codes = Vec::new();
        for _ in 0..6 {
            codes.push(MdecCode::Header { qscale: 3, dc: -40 });
            codes.push(MdecCode::Eob);
        }

        let mut codec = Lain::new();
        let bytes = codec.compress(&codes, 1, 1).unwrap();
        assert!(check_header(&bytes));

        let mut codec2 = Lain::new();
        let decoded = codec2.uncompress(&bytes, 1, 1).unwrap();
        assert_eq!(decoded, codes);
    }
}
