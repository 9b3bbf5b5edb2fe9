//! Once a stream's bitstream codec is identified, every later frame is
//! assumed to be the same codec rather than re-running identification
//! per frame - both faster and more robust against a single frame
//! whose header happens to collide with another format's check. If the
//! sticky codec ever fails to decode a frame, identification runs
//! again instead of giving up.

use crate::codec::Codec;
use crate::mdec_code::MdecCode;
use crate::Result;

enum State {
    Uninit,
    Identified(Codec),
}

pub struct StickyUncompressor {
    state: State,
}

impl StickyUncompressor {
    pub fn new() -> Self {
        StickyUncompressor { state: State::Uninit }
    }

    pub fn uncompress(&mut self, buf: &[u8], mb_width: u32, mb_height: u32) -> Result<Vec<MdecCode>> {
        if let State::Identified(codec) = self.state {
            if let Ok(codes) = codec.new_state().uncompress(buf, mb_width, mb_height) {
                return Ok(codes);
            }
            self.state = State::Uninit;
        }

        let codec = Codec::identify_bitstream(buf)?;
        self.state = State::Identified(codec);
        codec.new_state().uncompress(buf, mb_width, mb_height)
    }

    pub fn codec(&self) -> Option<Codec> {
        match self.state {
            State::Identified(c) => Some(c),
            State::Uninit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_with_the_first_identified_codec() {
        let mut sticky = StickyUncompressor::new();
        let mut codec_state = Codec::StrV2.new_state();
        let codes = vec![crate::mdec_code::MdecCode::Header { qscale: 1, dc: 0 }, crate::mdec_code::MdecCode::Eob];
        let mut full = Vec::new();
        for _ in 0..6 {
            full.extend(codes.clone());
        }
        let bytes = codec_state.compress(&full, 1, 1).unwrap();

        sticky.uncompress(&bytes, 1, 1).unwrap();
        assert_eq!(sticky.codec(), Some(Codec::StrV2));

        sticky.uncompress(&bytes, 1, 1).unwrap();
        assert_eq!(sticky.codec(), Some(Codec::StrV2));
    }

    #[test]
    fn unrecognized_first_frame_fails() {
        let mut sticky = StickyUncompressor::new();
        assert!(sticky.uncompress(&[0u8; 16], 1, 1).is_err());
    }
}
