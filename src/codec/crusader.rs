//! Crusader: the video half of a proprietary audio/video container.
//! Bitstream-wise it is another raw-header STR-style codec; what sets
//! Crusader apart from STRv2/Iki/Lain is at the demuxer layer, where the
//! sector demultiplexer and the audio decoder are the same object.

use super::ac_table;
use super::header::{self, FrameHeader, HEADER_LEN, MAGIC_CRUSADER};
use super::{block_coord, BitstreamCodec};
use crate::bitio::{BitReader, BitWriter};
use crate::errors;
use crate::mdec_code::MdecCode;
use crate::Result;

pub(crate) fn check_header(buf: &[u8]) -> bool {
    header::check_header_magic(buf, MAGIC_CRUSADER, None)
}

pub struct Crusader;

impl Crusader {
    pub fn new() -> Self {
        Crusader
    }
}

impl BitstreamCodec for Crusader {
    fn uncompress(&mut self, buf: &[u8], mb_width: u32, mb_height: u32) -> Result<Vec<MdecCode>> {
        let fh = FrameHeader::parse(buf)?;
        if fh.magic != MAGIC_CRUSADER {
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
            magic: MAGIC_CRUSADER,
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
