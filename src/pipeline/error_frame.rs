//! The synthetic error frame an AVI stage substitutes for a failed
//! decode: a black frame with the error message drawn in white,
//! starting at (5, 20), so the AVI's frame count - and `VideoSync`'s
//! clock riding on it - never drifts just because one frame failed.

use crate::mdec::Picture;

const GLYPH_WIDTH: usize = 3;
const GLYPH_HEIGHT: usize = 5;
const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;
const TEXT_ORIGIN_X: usize = 5;
const TEXT_ORIGIN_Y: usize = 20;

const BLACK_LUMA: i16 = -128;
const WHITE_LUMA: i16 = 127;

/// Builds an `mb_width` x `mb_height` all-black picture with `message`
/// stamped in white starting at (5, 20), clipping whatever falls off
/// the right or bottom edge rather than erroring on a short frame.
pub fn black_frame_with_message(mb_width: u32, mb_height: u32, message: &str) -> Picture {
    let mut picture = Picture {
        mb_width,
        mb_height,
        luma: vec![BLACK_LUMA; (mb_width * 16 * mb_height * 16) as usize],
        cb: vec![0; (mb_width * 8 * mb_height * 8) as usize],
        cr: vec![0; (mb_width * 8 * mb_height * 8) as usize],
    };

    let width = picture.width() as usize;
    let height = picture.height() as usize;

    let mut cursor_x = TEXT_ORIGIN_X;
    for ch in message.chars() {
        draw_glyph(&mut picture.luma, width, height, cursor_x, TEXT_ORIGIN_Y, ch);
        cursor_x += GLYPH_ADVANCE;
        if cursor_x >= width {
            break;
        }
    }

    picture
}

fn draw_glyph(luma: &mut [i16], width: usize, height: usize, x0: usize, y0: usize, ch: char) {
    let rows = glyph_rows(ch);
    for (row, bits) in rows.iter().enumerate() {
        let y = y0 + row;
        if y >= height {
            break;
        }
        for col in 0..GLYPH_WIDTH {
            if x0 + col >= width {
                break;
            }
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                luma[y * width + x0 + col] = WHITE_LUMA;
            }
        }
    }
}

/// Five rows of a 3-bit-wide glyph, MSB-first (bit 2 is the leftmost
/// column). Digits, uppercase letters (lowercase folds to uppercase),
/// space, and the punctuation the error `Display` impls actually use.
/// Anything else draws as a solid block rather than nothing, so an
/// unexpected byte in an `io::Error` message is still visible as a
/// glyph-shaped mark instead of silently vanishing.
fn glyph_rows(ch: char) -> [u8; GLYPH_HEIGHT] {
    match ch.to_ascii_uppercase() {
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b111, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        _ => [0b111, 0b111, 0b111, 0b111, 0b111],
    }
}
