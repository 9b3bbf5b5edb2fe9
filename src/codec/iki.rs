//! Iki: a still/video hybrid format whose frame header carries its own
//! width and height (so an Iki frame is self-describing even outside a
//! video stream). DC is a raw header field, like STRv2; there is no
//! predictor.

use super::ac_table;
use super::header::MAGIC_IKI;
use super::{block_coord, BitstreamCodec};
use crate::bitio::{BitReader, BitWriter};
use crate::errors::{self, BlockCoord};
use crate::mdec_code::MdecCode;
use crate::Result;

const HEADER_LEN: usize = 10;

struct IkiHeader {
    magic: u16,
    width: u16,
    height: u16,
    qscale: i16,
    mb_count: u16,
}

impl IkiHeader {
    fn parse(buf: &[u8]) -> Result<IkiHeader> {
        if buf.len() < HEADER_LEN {
            return errors::end_of_stream(BlockCoord::default());
        }
        Ok(IkiHeader {
            magic: u16::from_le_bytes([buf[0], buf[1]]),
            width: u16::from_le_bytes([buf[2], buf[3]]),
            height: u16::from_le_bytes([buf[4], buf[5]]),
            qscale: i16::from_le_bytes([buf[6], buf[7]]),
            mb_count: u16::from_le_bytes([buf[8], buf[9]]),
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.qscale.to_le_bytes());
        out.extend_from_slice(&self.mb_count.to_le_bytes());
    }
}

pub(crate) fn check_header(buf: &[u8]) -> bool {
    match IkiHeader::parse(buf) {
        Ok(h) => h.magic == MAGIC_IKI,
        Err(_) => false,
    }
}

pub struct Iki;

impl Iki {
    pub fn new() -> Self {
        Iki
    }
}

impl BitstreamCodec for Iki {
    fn uncompress(&mut self, buf: &[u8], mb_width: u32, mb_height: u32) -> Result<Vec<MdecCode>> {
        let ih = IkiHeader::parse(buf)?;
        if ih.magic != MAGIC_IKI {
            return errors::unrecognized_format();
        }
        if ih.mb_count as u32 != mb_width * mb_height {
            return errors::corruption(
                BlockCoord::default(),
                "iki header macroblock count does not match frame dimensions",
            );
        }

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
        let ih = IkiHeader {
            magic: MAGIC_IKI,
            width: (mb_width * 16) as u16,
            height: (mb_height * 16) as u16,
            qscale: 0,
            mb_count: (mb_width * mb_height) as u16,
        };

        let mut out = Vec::new();
        ih.write(&mut out);

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
    fn round_trips_and_carries_dimensions() {
        let codes = vec![MdecCode::Header { qscale: 2, dc: 10 }, MdecCode::Eob];
        let mut codes_full = Vec::new();
        for _ in 0..6 {
            codes_full.extend(codes.clone());
        }

        let mut codec = Iki::new();
        let bytes = codec.compress(&codes_full, 1, 1).unwrap();
        assert!(check_header(&bytes));
        let ih = IkiHeader::parse(&bytes).unwrap();
        assert_eq!(ih.width, 16);
        assert_eq!(ih.height, 16);

        let mut codec2 = Iki::new();
        let decoded = codec2.uncompress(&bytes, 1, 1).unwrap();
        assert_eq!(decoded, codes_full);
    }
}
