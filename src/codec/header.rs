//! The 8-byte frame header shared by every STR-family codec: magic,
//! version/reserved word, signed qscale, and a macroblock count used to
//! cross-check against the caller-supplied frame dimensions.

use crate::errors::{self, BlockCoord};
use crate::Result;

pub(crate) const MAGIC_STR: u16 = 0x3800;
pub(crate) const VERSION_STR_V2: u16 = 1;
pub(crate) const VERSION_STR_V3: u16 = 2;
pub(crate) const MAGIC_IKI: u16 = 0x3801;
pub(crate) const MAGIC_LAIN: u16 = 0x4c41;
pub(crate) const MAGIC_CRUSADER: u16 = 0x4352;

pub const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u16,
    pub version: u16,
    pub qscale: i16,
    pub mb_count: u16,
}

impl FrameHeader {
    pub fn parse(buf: &[u8]) -> Result<FrameHeader> {
        if buf.len() < HEADER_LEN {
            return errors::end_of_stream(BlockCoord::default());
        }
        Ok(FrameHeader {
            magic: u16::from_le_bytes([buf[0], buf[1]]),
            version: u16::from_le_bytes([buf[2], buf[3]]),
            qscale: i16::from_le_bytes([buf[4], buf[5]]),
            mb_count: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.qscale.to_le_bytes());
        out.extend_from_slice(&self.mb_count.to_le_bytes());
    }

    pub fn check_mb_count(&self, mb_width: u32, mb_height: u32) -> Result<()> {
        if self.mb_count as u32 != mb_width * mb_height {
            return errors::corruption(
                BlockCoord::default(),
                "frame header macroblock count does not match frame dimensions",
            );
        }
        Ok(())
    }
}

pub(crate) fn check_header_magic(buf: &[u8], magic: u16, version: Option<u16>) -> bool {
    let header = match FrameHeader::parse(buf) {
        Ok(h) => h,
        Err(_) => return false,
    };
    if header.magic != magic {
        return false;
    }
    match version {
        Some(v) => header.version == v,
        None => true,
    }
}
