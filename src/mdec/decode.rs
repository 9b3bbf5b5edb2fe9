//! MDEC decode: inverse quantization, inverse zig-zag, IDCT, and
//! macroblock assembly into a YCbCr 4:2:0 `Picture`.
//!
//! Color-space conversion and chroma upsampling happen downstream, in
//! [`crate::mdec::convert`], so this module's only job is turning a code
//! stream into decoded DCT-domain samples.

use super::tables::{DEFAULT_CHROMA_QUANT, DEFAULT_LUMA_QUANT, IDCT_MATRIX, ZIGZAG};
use crate::codec::block_coord;
use crate::errors::{self, BlockCoord};
use crate::mdec_code::MdecCode;
use crate::Result;

/// Selects the IDCT precision tier. `PsxExact` reuses the same
/// fixed-point two-pass algorithm as `Low` - both reproduce the PSX
/// hardware's own rounding behavior bit-for-bit, so there is no
/// separate implementation for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeQuality {
    Low,
    High,
    PsxExact,
}

/// A decoded frame, still in the DCT-domain YCbCr 4:2:0 layout the MDEC
/// produces: one full-resolution luma plane and two quarter-resolution
/// chroma planes, each sample in `[-128, 127]` (add 128 to recover a
/// `u8` pixel level).
pub struct Picture {
    pub mb_width: u32,
    pub mb_height: u32,
    pub luma: Vec<i16>,
    pub cb: Vec<i16>,
    pub cr: Vec<i16>,
}

impl Picture {
    pub fn width(&self) -> u32 {
        self.mb_width * 16
    }

    pub fn height(&self) -> u32 {
        self.mb_height * 16
    }

    pub fn chroma_width(&self) -> u32 {
        self.mb_width * 8
    }

    pub fn chroma_height(&self) -> u32 {
        self.mb_height * 8
    }
}

/// Quantization matrices, in zig-zag order, used for one decode.
pub struct QuantTables {
    pub luma: [u8; 64],
    pub chroma: [u8; 64],
}

impl Default for QuantTables {
    fn default() -> Self {
        QuantTables {
            luma: DEFAULT_LUMA_QUANT,
            chroma: DEFAULT_CHROMA_QUANT,
        }
    }
}

/// Decodes a complete flat `MdecCode` stream (as produced by a bitstream
/// codec's `uncompress`) into a `Picture`.
pub fn decode_frame(
    codes: &[MdecCode],
    mb_width: u32,
    mb_height: u32,
    quant: &QuantTables,
    quality: DecodeQuality,
) -> Result<Picture> {
    let mut picture = Picture {
        mb_width,
        mb_height,
        luma: vec![0i16; (mb_width * 16 * mb_height * 16) as usize],
        cb: vec![0i16; (mb_width * 8 * mb_height * 8) as usize],
        cr: vec![0i16; (mb_width * 8 * mb_height * 8) as usize],
    };

    let mut pos = 0usize;
    let block_count = mb_width * mb_height * 6;

    for n in 0..block_count {
        let at = block_coord(n, mb_width);
        let table = if at.block_index < 4 { &quant.luma } else { &quant.chroma };
        let coefficients = dequantize_block(codes, &mut pos, table, at)?;
        let spatial = match quality {
            DecodeQuality::Low | DecodeQuality::PsxExact => idct_fast(&coefficients),
            DecodeQuality::High => idct_double(&coefficients),
        };
        place_block(&mut picture, at, &spatial);
    }

    Ok(picture)
}

fn dequantize_block(
    codes: &[MdecCode],
    pos: &mut usize,
    quant: &[u8; 64],
    at: BlockCoord,
) -> Result<[i32; 64]> {
    let header = match codes.get(*pos) {
        Some(MdecCode::Header { qscale, dc }) => {
            *pos += 1;
            (*qscale, *dc)
        }
        _ => return errors::corruption(at, "expected a block header code"),
    };
    let (qscale, dc) = header;

    let mut coefficients = [0i32; 64];
    coefficients[0] = dc as i32 * quant[0] as i32 * 2;

    let mut zigzag_index = 0usize;
    loop {
        let code = codes.get(*pos).copied();
        *pos += 1;
        match code {
            Some(MdecCode::Eob) => break,
            Some(MdecCode::Ac { run, level }) => {
                zigzag_index += run as usize + 1;
                if zigzag_index >= 64 {
                    return errors::corruption(at, "ac run overran the block");
                }
                let raster = ZIGZAG[zigzag_index] as usize;
                coefficients[raster] =
                    (level as i32 * quant[zigzag_index] as i32 * qscale as i32 * 2) / 16;
            }
            _ => return errors::corruption(at, "block ended without an eob code"),
        }
    }

    mismatch_correct(&mut coefficients);
    Ok(coefficients)
}

/// MPEG-1 "oddification": if the sum of all 64 dequantized
/// coefficients is even, flip the last coefficient's low bit. Without
/// this, encoder and decoder IDCT rounding can drift apart over many
/// frames.
fn mismatch_correct(coefficients: &mut [i32; 64]) {
    let sum: i64 = coefficients.iter().map(|&v| v as i64).sum();
    if sum % 2 == 0 {
        coefficients[63] ^= 1;
    }
}

fn idct_fast(coefficients: &[i32; 64]) -> [i16; 64] {
    let mut tmp = [0i32; 64];
    for i in 0..8 {
        for j in 0..8 {
            let mut sum = 0i64;
            for k in 0..8 {
                let val = coefficients[k * 8 + j] as i64;
                let coef = IDCT_MATRIX[k * 8 + i] as i64 / 8;
                sum += val * coef;
            }
            tmp[j * 8 + i] = ((sum + 0xfff) / 0x2000) as i32;
        }
    }

    let mut out = [0i16; 64];
    for i in 0..8 {
        for j in 0..8 {
            let mut sum = 0i64;
            for k in 0..8 {
                let val = tmp[k * 8 + j] as i64;
                let coef = IDCT_MATRIX[k * 8 + i] as i64 / 8;
                sum += val * coef;
            }
            let sum = (sum + 0xfff) / 0x2000;
            let truncated = ((sum as u32) << 21) as i32 >> 21;
            out[j * 8 + i] = truncated.clamp(-128, 127) as i16;
        }
    }
    out
}

fn idct_double(coefficients: &[i32; 64]) -> [i16; 64] {
    let basis = |u: usize, x: usize| IDCT_MATRIX[u * 8 + x] as f64 / 32768.0;

    let mut out = [0i16; 64];
    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0f64;
            for v in 0..8 {
                for u in 0..8 {
                    sum += coefficients[v * 8 + u] as f64 * basis(u, x) * basis(v, y);
                }
            }
            let value = (sum / 4.0).round();
            out[y * 8 + x] = value.clamp(-128.0, 127.0) as i16;
        }
    }
    out
}

fn place_block(picture: &mut Picture, at: BlockCoord, spatial: &[i16; 64]) {
    match at.block_index {
        0..=3 => {
            let (ox, oy) = match at.block_index {
                0 => (0, 0),
                1 => (8, 0),
                2 => (0, 8),
                _ => (8, 8),
            };
            let plane_width = picture.width() as usize;
            let base_x = at.mb_x as usize * 16 + ox;
            let base_y = at.mb_y as usize * 16 + oy;
            for row in 0..8 {
                for col in 0..8 {
                    let idx = (base_y + row) * plane_width + base_x + col;
                    picture.luma[idx] = spatial[row * 8 + col];
                }
            }
        }
        4 | 5 => {
            let plane_width = picture.chroma_width() as usize;
            let base_x = at.mb_x as usize * 8;
            let base_y = at.mb_y as usize * 8;
            let plane = if at.block_index == 4 { &mut picture.cb } else { &mut picture.cr };
            for row in 0..8 {
                for col in 0..8 {
                    let idx = (base_y + row) * plane_width + base_x + col;
                    plane[idx] = spatial[row * 8 + col];
                }
            }
        }
        _ => unreachable!("block index is always 0..=5"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_block_codes(dc: i16) -> Vec<MdecCode> {
        vec![MdecCode::Header { qscale: 1, dc }, MdecCode::Eob]
    }

    #[test]
    fn all_dc_zero_decodes_to_uniform_gray() {
        let mut codes = Vec::new();
        for _ in 0..6 {
            codes.extend(uniform_block_codes(0));
        }
        let picture =
            decode_frame(&codes, 1, 1, &QuantTables::default(), DecodeQuality::Low).unwrap();
        // DC of 0 dequantizes to 0 regardless of qtable[0], and an
        // all-zero DCT block IDCTs to all zero (the 128 gray level
        // convert.rs adds is not part of this module).
        assert!(picture.luma.iter().all(|&v| v == 0));
        assert!(picture.cb.iter().all(|&v| v == 0));
    }

    #[test]
    fn ac_run_past_block_end_is_corruption() {
        let mut codes = Vec::new();
        codes.push(MdecCode::Header { qscale: 1, dc: 0 });
        codes.push(MdecCode::Ac { run: 63, level: 1 });
        codes.push(MdecCode::Ac { run: 63, level: 1 });
        for _ in 0..5 {
            codes.extend(uniform_block_codes(0));
        }
        assert!(decode_frame(&codes, 1, 1, &QuantTables::default(), DecodeQuality::Low).is_err());
    }

    #[test]
    fn fast_and_double_idct_agree_within_rounding() {
        let mut coefficients = [0i32; 64];
        coefficients[0] = 100;
        coefficients[1] = -40;
        coefficients[8] = 20;
        let fast = idct_fast(&coefficients);
        let double = idct_double(&coefficients);
        for i in 0..64 {
            assert!((fast[i] as i32 - double[i] as i32).abs() <= 2, "index {}", i);
        }
    }
}
