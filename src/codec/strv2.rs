//! STR v2: the oldest PSX video bitstream. Block headers are a raw
//! 16-bit MDEC code (qscale in the high 6 bits, DC in the low 10) with
//! no VLC and no DC predictor; AC runs use the shared table. Padding is
//! zero bits, and a short final word is not an error.

use super::ac_table;
use super::header::{self, FrameHeader, HEADER_LEN, MAGIC_STR, VERSION_STR_V2};
use super::{block_coord, BitstreamCodec};
use crate::bitio::{BitReader, BitWriter};
use crate::errors;
use crate::mdec_code::MdecCode;
use crate::Result;

pub(crate) fn check_header(buf: &[u8]) -> bool {
    header::check_header_magic(buf, MAGIC_STR, Some(VERSION_STR_V2))
}

pub struct StrV2;

impl StrV2 {
    pub fn new() -> Self {
        StrV2
    }
}

impl BitstreamCodec for StrV2 {
    fn uncompress(&mut self, buf: &[u8], mb_width: u32, mb_height: u32) -> Result<Vec<MdecCode>> {
        let fh = FrameHeader::parse(buf)?;
        if fh.magic != MAGIC_STR || fh.version != VERSION_STR_V2 {
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
            magic: MAGIC_STR,
            version: VERSION_STR_V2,
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

    fn one_block_frame() -> Vec<MdecCode> {
        vec![MdecCode::Header { qscale: 1, dc: 0 }, MdecCode::Eob]
    }

    #[test]
    fn round_trips_single_macroblock_all_dc() {
        let mut codec = StrV2::new();
        let mut codes = Vec::new();
        for _ in 0..6 {
            codes.extend(one_block_frame());
        }

        let bytes = codec.compress(&codes, 1, 1).unwrap();
        assert!(check_header(&bytes));

        let mut codec2 = StrV2::new();
        let decoded = codec2.uncompress(&bytes, 1, 1).unwrap();
        assert_eq!(decoded, codes);
    }
}
