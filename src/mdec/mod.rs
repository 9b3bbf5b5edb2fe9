//! The MDEC stage: decode a code stream into pixels, or encode pixels
//! back into a budget-constrained code stream.

pub mod convert;
pub mod decode;
pub mod encode;
mod tables;

pub use convert::{ChromaUpsampling, ColorMatrix};
pub use decode::{decode_frame, DecodeQuality, Picture, QuantTables};
pub use encode::{encode_frame, find_dirty_macroblocks, merge_dirty};

use crate::codec::{BitstreamCodec, Codec};
use crate::errors;
use crate::Result;

/// Quantization scale ceiling; STRv2/v3 and friends encode qscale in 6
/// bits but the PSX MDEC only honors 1..=63.
pub const MAX_QSCALE: u8 = 63;

/// Encodes `picture` and compresses it through `codec`, raising qscale
/// from 1 until the compressed byte length fits in `budget_bytes`.
/// Fails with `TooMuchEnergy` if qscale reaches 63 without fitting.
pub fn encode_with_budget(
    picture: &Picture,
    quant: &QuantTables,
    codec: Codec,
    budget_bytes: usize,
) -> Result<(Vec<u8>, u8)> {
    for qscale in 1..=MAX_QSCALE {
        let codes = encode_frame(picture, quant, qscale);
        let mut state = codec.new_state();
        let bytes = state.compress(&codes, picture.mb_width, picture.mb_height)?;
        if bytes.len() <= budget_bytes {
            return Ok((bytes, qscale));
        }
    }
    errors::too_much_energy()
}
