//! Constant tables the MDEC stage shares: zig-zag scan order, default
//! quantization matrices, and the fixed-point IDCT basis. The zig-zag
//! order and the IDCT basis are the PSX MDEC's well-known constants; the
//! default quant tables are the standard JPEG luminance/chrominance
//! matrices the MDEC falls back to before a stream loads its own.

/// Maps a zig-zag scan position to its position in an 8x8 block stored
/// in row-major order.
pub const ZIGZAG: [u8; 64] = [
    0x00, 0x01, 0x08, 0x10, 0x09, 0x02, 0x03, 0x0a, 0x11, 0x18, 0x20, 0x19, 0x12, 0x0b, 0x04, 0x05,
    0x0c, 0x13, 0x1a, 0x21, 0x28, 0x30, 0x29, 0x22, 0x1b, 0x14, 0x0d, 0x06, 0x07, 0x0e, 0x15, 0x1c,
    0x23, 0x2a, 0x31, 0x38, 0x39, 0x32, 0x2b, 0x24, 0x1d, 0x16, 0x0f, 0x17, 0x1e, 0x25, 0x2c, 0x33,
    0x3a, 0x3b, 0x34, 0x2d, 0x26, 0x1f, 0x27, 0x2e, 0x35, 0x3c, 0x3d, 0x36, 0x2f, 0x37, 0x3e, 0x3f,
];

/// Default luma quantization table, zig-zag order.
pub const DEFAULT_LUMA_QUANT: [u8; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104, 113,
    92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

/// Default chroma quantization table, zig-zag order.
pub const DEFAULT_CHROMA_QUANT: [u8; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, 18, 21, 26, 66, 99, 99, 99, 99, 24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
];

/// Fixed-point (Q15, scale 32768) separable IDCT basis: row `u`, column
/// `x` holds `round(32768 * C(u) * cos((2x+1)u*pi/16))`. Used two-pass
/// (columns, then rows), each pass dividing the running sum by `8 *
/// 8192` to undo the fixed-point scale, matching the PSX MDEC's own
/// two-pass integer IDCT.
pub const IDCT_MATRIX: [i32; 64] = [
    23170, 23170, 23170, 23170, 23170, 23170, 23170, 23170,
    32138, 27245, 18204, 6392, -6392, -18204, -27245, -32138,
    30273, 12539, -12539, -30273, -30273, -12539, 12539, 30273,
    27245, -6392, -32138, -18204, 18204, 32138, 6392, -27245,
    23170, -23170, -23170, 23170, 23170, -23170, -23170, 23170,
    18204, -32138, 6392, 27245, -27245, -6392, 32138, -18204,
    12539, -30273, 30273, -12539, -12539, 30273, -30273, 12539,
    6392, -18204, 27245, -32138, 32138, -27245, 18204, -6392,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_is_a_permutation() {
        let mut seen = [false; 64];
        for &pos in ZIGZAG.iter() {
            assert!(!seen[pos as usize]);
            seen[pos as usize] = true;
        }
    }

    #[test]
    fn idct_row_zero_is_constant() {
        for x in 0..8 {
            assert_eq!(IDCT_MATRIX[x], 23170);
        }
    }
}
