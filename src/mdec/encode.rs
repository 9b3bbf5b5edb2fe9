//! MDEC encode: the inverse of [`super::decode`] - forward DCT,
//! quantize, zig-zag scan, RLE-encode into an `MdecCode` stream - plus
//! the dirty-macroblock discovery a partial re-encode uses to decide
//! which macroblocks take replacement pixels.

use super::decode::{DecodeQuality, Picture, QuantTables};
use super::tables::{IDCT_MATRIX, ZIGZAG};
use crate::mdec_code::MdecCode;

/// Forward 2D DCT, the algebraic inverse of the IDCT basis in
/// `tables::IDCT_MATRIX`: since that basis is orthonormal up to the
/// 1/4 factor the inverse already applies, running the same two-index
/// contraction without that factor recovers the frequency-domain
/// block exactly (up to double-precision rounding).
fn forward_dct(samples: &[i16; 64]) -> [i32; 64] {
    let basis = |u: usize, x: usize| IDCT_MATRIX[u * 8 + x] as f64 / 32768.0;

    let mut out = [0i32; 64];
    for v in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0f64;
            for y in 0..8 {
                for x in 0..8 {
                    sum += samples[y * 8 + x] as f64 * basis(u, x) * basis(v, y);
                }
            }
            out[v * 8 + u] = sum.round() as i32;
        }
    }
    out
}

fn quantize_block(coefficients: &[i32; 64], quant: &[u8; 64], qscale: u8) -> Vec<MdecCode> {
    let mut codes = Vec::new();

    let dc = coefficients[0] / (quant[0] as i32 * 2);
    codes.push(MdecCode::Header { qscale, dc: dc.clamp(-512, 511) as i16 });

    let mut run = 0u8;
    for zigzag_index in 1..64usize {
        let raster = ZIGZAG[zigzag_index] as usize;
        let denom = quant[zigzag_index] as i32 * qscale as i32 * 2;
        let level = if denom == 0 { 0 } else { coefficients[raster] * 16 / denom };

        if level == 0 {
            run += 1;
            continue;
        }

        codes.push(MdecCode::Ac { run, level: level.clamp(-512, 511) as i16 });
        run = 0;
    }

    codes.push(MdecCode::Eob);
    codes
}

/// Encodes every block of `picture` at `qscale` into a flat code
/// stream, macroblock order (4 Y, 1 Cb, 1 Cr), matching the layout
/// `BitstreamCodec` implementations expect.
pub fn encode_frame(picture: &Picture, quant: &QuantTables, qscale: u8) -> Vec<MdecCode> {
    let mut codes = Vec::new();
    let plane_width = picture.width() as usize;
    let chroma_width = picture.chroma_width() as usize;

    for mb_y in 0..picture.mb_height as usize {
        for mb_x in 0..picture.mb_width as usize {
            for block_index in 0..4usize {
                let (ox, oy) = match block_index {
                    0 => (0, 0),
                    1 => (8, 0),
                    2 => (0, 8),
                    _ => (8, 8),
                };
                let samples = extract_block(&picture.luma, plane_width, mb_x * 16 + ox, mb_y * 16 + oy);
                let coefficients = forward_dct(&samples);
                codes.extend(quantize_block(&coefficients, &quant.luma, qscale));
            }

            for plane in [&picture.cb, &picture.cr] {
                let samples = extract_block(plane, chroma_width, mb_x * 8, mb_y * 8);
                let coefficients = forward_dct(&samples);
                codes.extend(quantize_block(&coefficients, &quant.chroma, qscale));
            }
        }
    }

    codes
}

fn extract_block(plane: &[i16], plane_width: usize, x: usize, y: usize) -> [i16; 64] {
    let mut block = [0i16; 64];
    for row in 0..8 {
        for col in 0..8 {
            block[row * 8 + col] = plane[(y + row) * plane_width + x + col];
        }
    }
    block
}

/// Marks every macroblock whose luma or chroma differs from `original`
/// by more than `tolerance` in any sample.
pub fn find_dirty_macroblocks(original: &Picture, replacement: &Picture, tolerance: u8) -> Vec<bool> {
    let mb_total = (original.mb_width * original.mb_height) as usize;
    let mut dirty = vec![false; mb_total];

    for mb_y in 0..original.mb_height as usize {
        for mb_x in 0..original.mb_width as usize {
            let idx = mb_y * original.mb_width as usize + mb_x;
            dirty[idx] = luma_block_differs(original, replacement, mb_x, mb_y, tolerance)
                || chroma_block_differs(original, replacement, mb_x, mb_y, tolerance);
        }
    }

    dirty
}

fn luma_block_differs(original: &Picture, replacement: &Picture, mb_x: usize, mb_y: usize, tolerance: u8) -> bool {
    let width = original.width() as usize;
    for row in 0..16 {
        for col in 0..16 {
            let idx = (mb_y * 16 + row) * width + mb_x * 16 + col;
            if differs(original.luma[idx], replacement.luma[idx], tolerance) {
                return true;
            }
        }
    }
    false
}

fn chroma_block_differs(original: &Picture, replacement: &Picture, mb_x: usize, mb_y: usize, tolerance: u8) -> bool {
    let width = original.chroma_width() as usize;
    for row in 0..8 {
        for col in 0..8 {
            let idx = (mb_y * 8 + row) * width + mb_x * 8 + col;
            if differs(original.cb[idx], replacement.cb[idx], tolerance)
                || differs(original.cr[idx], replacement.cr[idx], tolerance)
            {
                return true;
            }
        }
    }
    false
}

fn differs(a: i16, b: i16, tolerance: u8) -> bool {
    (a as i32 - b as i32).unsigned_abs() > tolerance as u32
}

/// Merges `replacement` pixels into `original` for every dirty
/// macroblock, leaving clean macroblocks untouched. The merged picture
/// is what gets forward-DCT'd - clean macroblocks re-encode from their
/// already-decoded original samples rather than a fresh source image,
/// which is what keeps their bitstream close to (if not identical to)
/// what it was before.
pub fn merge_dirty(original: &Picture, replacement: &Picture, dirty: &[bool]) -> Picture {
    let mut merged = Picture {
        mb_width: original.mb_width,
        mb_height: original.mb_height,
        luma: original.luma.clone(),
        cb: original.cb.clone(),
        cr: original.cr.clone(),
    };

    let width = original.width() as usize;
    let chroma_width = original.chroma_width() as usize;

    for mb_y in 0..original.mb_height as usize {
        for mb_x in 0..original.mb_width as usize {
            if !dirty[mb_y * original.mb_width as usize + mb_x] {
                continue;
            }
            for row in 0..16 {
                for col in 0..16 {
                    let idx = (mb_y * 16 + row) * width + mb_x * 16 + col;
                    merged.luma[idx] = replacement.luma[idx];
                }
            }
            for row in 0..8 {
                for col in 0..8 {
                    let idx = (mb_y * 8 + row) * chroma_width + mb_x * 8 + col;
                    merged.cb[idx] = replacement.cb[idx];
                    merged.cr[idx] = replacement.cr[idx];
                }
            }
        }
    }

    merged
}

/// Re-decodes `codes` at the same quality used elsewhere, useful for
/// verifying an encode round-trip in tests without pulling in the full
/// pipeline.
pub fn roundtrip_decode(codes: &[MdecCode], mb_width: u32, mb_height: u32, quant: &QuantTables) -> Picture {
    super::decode::decode_frame(codes, mb_width, mb_height, quant, DecodeQuality::Low)
        .expect("encoder output must be decodable")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_picture(mb_width: u32, mb_height: u32, luma: i16) -> Picture {
        Picture {
            mb_width,
            mb_height,
            luma: vec![luma; (mb_width * 16 * mb_height * 16) as usize],
            cb: vec![0; (mb_width * 8 * mb_height * 8) as usize],
            cr: vec![0; (mb_width * 8 * mb_height * 8) as usize],
        }
    }

    #[test]
    fn flat_picture_round_trips_through_encode_decode() {
        let picture = flat_picture(1, 1, 50);
        let quant = QuantTables::default();
        let codes = encode_frame(&picture, &quant, 1);
        let decoded = roundtrip_decode(&codes, 1, 1, &quant);
        for v in decoded.luma.iter() {
            assert!((*v as i32 - 50).abs() <= 2, "got {}", v);
        }
    }

    #[test]
    fn dirty_detection_flags_only_changed_macroblocks() {
        let original = flat_picture(2, 1, 0);
        let mut replacement = flat_picture(2, 1, 0);
        for v in replacement.luma.iter_mut().take(16 * 16) {
            *v = 100;
        }
        let dirty = find_dirty_macroblocks(&original, &replacement, 4);
        assert_eq!(dirty, vec![true, false]);
    }

    #[test]
    fn merge_keeps_clean_macroblocks_from_original() {
        let original = flat_picture(2, 1, 10);
        let mut replacement = flat_picture(2, 1, 10);
        for v in replacement.luma.iter_mut().skip(16 * 16) {
            *v = 90;
        }
        let dirty = find_dirty_macroblocks(&original, &replacement, 4);
        let merged = merge_dirty(&original, &replacement, &dirty);
        assert_eq!(merged.luma[0], 10);
        assert_eq!(merged.luma[16 * 16], 90);
    }
}
