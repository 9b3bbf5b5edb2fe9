//! The AC run/level VLC table shared by every bitstream codec plus the
//! escape path for pairs the table doesn't cover.
//!
//! Codes are unary class selectors (`n` zero bits then a `1`) followed by
//! a fixed-width payload that indexes straight into the class's
//! `(run, level)` slots. A unary selector is already a complete prefix
//! code on its own, so appending a fixed-width payload after it can never
//! create a prefix collision between classes - the same property Elias
//! gamma coding relies on. `n = 0` is reserved for EOB (no payload) and
//! `n = 5` is the escape (`000001`, no payload, the run and level follow
//! as raw 6- and 10-bit fields), matching the escape encoding used
//! throughout.

use crate::bitio::{BitReader, BitWriter};
use crate::errors::{self, BlockCoord};
use crate::mdec_code::MdecCode;
use crate::Result;

struct AcClass {
    payload_bits: u32,
    entries: &'static [Option<(u8, i16)>],
}

const CLASS_A: &[Option<(u8, i16)>] = &[
    Some((0, 1)),
    Some((0, -1)),
    Some((1, 1)),
    Some((1, -1)),
];

const CLASS_B: &[Option<(u8, i16)>] = &[
    Some((0, 2)),
    Some((0, -2)),
    Some((2, 1)),
    Some((2, -1)),
    Some((0, 3)),
    Some((0, -3)),
    Some((3, 1)),
    Some((3, -1)),
];

const CLASS_C: &[Option<(u8, i16)>] = &[
    Some((1, 2)),
    Some((1, -2)),
    Some((4, 1)),
    Some((4, -1)),
    Some((0, 4)),
    Some((0, -4)),
    Some((5, 1)),
    Some((5, -1)),
    Some((2, 2)),
    Some((2, -2)),
    Some((6, 1)),
    Some((6, -1)),
    Some((0, 5)),
    Some((0, -5)),
    Some((7, 1)),
    Some((7, -1)),
];

const CLASS_D: &[Option<(u8, i16)>] = &[
    Some((3, 2)),
    Some((3, -2)),
    Some((8, 1)),
    Some((8, -1)),
    Some((1, 3)),
    Some((1, -3)),
    Some((9, 1)),
    Some((9, -1)),
    Some((0, 6)),
    Some((0, -6)),
    Some((10, 1)),
    Some((10, -1)),
    Some((4, 2)),
    Some((4, -2)),
    Some((11, 1)),
    Some((11, -1)),
    Some((2, 3)),
    Some((2, -3)),
    Some((12, 1)),
    Some((12, -1)),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

// Index n-1 holds the class for unary selector length n (n in 1..=4).
const AC_CLASSES: [AcClass; 4] = [
    AcClass { payload_bits: 2, entries: CLASS_A },
    AcClass { payload_bits: 3, entries: CLASS_B },
    AcClass { payload_bits: 4, entries: CLASS_C },
    AcClass { payload_bits: 5, entries: CLASS_D },
];

const ESCAPE_UNARY: u32 = 5;
const MAX_UNARY: u32 = 5;

/// Reads one AC (or EOB) code from the bitstream.
pub fn decode_ac(reader: &mut BitReader, at: BlockCoord) -> Result<MdecCode> {
    let mut zeros = 0u32;
    while reader.read(1)? == 0 {
        zeros += 1;
        if zeros > MAX_UNARY {
            return errors::corruption(at, "ac run-length prefix too long");
        }
    }

    if zeros == 0 {
        return Ok(MdecCode::Eob);
    }
    if zeros == ESCAPE_UNARY {
        let run = reader.read(6)? as u8;
        let raw = reader.read(10)?;
        let level = ((raw as u16) << 6) as i16 >> 6;
        return Ok(MdecCode::Ac { run, level });
    }

    let class = &AC_CLASSES[(zeros - 1) as usize];
    let payload = reader.read(class.payload_bits)? as usize;
    match class.entries[payload] {
        Some((run, level)) => Ok(MdecCode::Ac { run, level }),
        None => errors::corruption(at, "unassigned ac vlc code"),
    }
}

/// Writes one AC (or EOB) code to the bitstream, falling back to the
/// escape sequence for any `(run, level)` pair not present in the table.
pub fn encode_ac(writer: &mut BitWriter, code: MdecCode) {
    match code {
        MdecCode::Eob => writer.write(1, 1),
        MdecCode::Ac { run, level } => match find_slot(run, level) {
            Some((unary_n, payload_bits, payload)) => {
                writer.write(0, unary_n);
                writer.write(1, 1);
                writer.write(payload, payload_bits);
            }
            None => {
                writer.write(0, ESCAPE_UNARY);
                writer.write(1, 1);
                writer.write(run as u32, 6);
                writer.write((level as u16 & 0x3ff) as u32, 10);
            }
        },
        MdecCode::Header { .. } => {
            debug_assert!(false, "header codes are not part of the AC stream");
        }
    }
}

fn find_slot(run: u8, level: i16) -> Option<(u32, u32, u32)> {
    for (idx, class) in AC_CLASSES.iter().enumerate() {
        for (payload, entry) in class.entries.iter().enumerate() {
            if *entry == Some((run, level)) {
                return Some((idx as u32 + 1, class.payload_bits, payload as u32));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> BlockCoord {
        BlockCoord::default()
    }

    #[test]
    fn eob_round_trips() {
        let mut w = BitWriter::new(false);
        encode_ac(&mut w, MdecCode::Eob);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes, false);
        assert_eq!(decode_ac(&mut r, at()).unwrap(), MdecCode::Eob);
    }

    #[test]
    fn table_entries_round_trip() {
        for class in AC_CLASSES.iter() {
            for entry in class.entries.iter() {
                if let Some((run, level)) = entry {
                    let code = MdecCode::Ac { run: *run, level: *level };
                    let mut w = BitWriter::new(false);
                    encode_ac(&mut w, code);
                    let bytes = w.finish();
                    let mut r = BitReader::new(&bytes, false);
                    assert_eq!(decode_ac(&mut r, at()).unwrap(), code);
                }
            }
        }
    }

    #[test]
    fn escape_round_trips_uncommon_pair() {
        // (run=40, level=-400) is never in any class, so this must
        // exercise the escape path.
        let code = MdecCode::Ac { run: 40, level: -400 };
        let mut w = BitWriter::new(false);
        encode_ac(&mut w, code);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes, false);
        assert_eq!(decode_ac(&mut r, at()).unwrap(), code);
    }

    #[test]
    fn unassigned_slot_is_corruption_not_panic() {
        // Class D's last 12 payload slots are unassigned.
        let mut w = BitWriter::new(false);
        w.write(0, 4);
        w.write(1, 1);
        w.write(0b11111, 5);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes, false);
        assert!(decode_ac(&mut r, at()).is_err());
    }
}
