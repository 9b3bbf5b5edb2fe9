use strmdec::codec::{BitstreamCodec, Codec};
use strmdec::errors::Error;
use strmdec::mdec::{decode_frame, encode_frame, DecodeQuality, Picture, QuantTables};
use strmdec::mdec::{find_dirty_macroblocks, merge_dirty};
use strmdec::mdec::encode_with_budget;
use strmdec::mdec_code::MdecCode;
use strmdec::sync::{initial_silent_frames, initial_silent_samples};

fn flat_picture(mb_width: u32, mb_height: u32, luma: i16) -> Picture {
    Picture {
        mb_width,
        mb_height,
        luma: vec![luma; (mb_width * 16 * mb_height * 16) as usize],
        cb: vec![0; (mb_width * 8 * mb_height * 8) as usize],
        cr: vec![0; (mb_width * 8 * mb_height * 8) as usize],
    }
}

/// A 16x16 STRv3 frame (one macroblock) with qscale=1 and every DC
/// coefficient at zero decodes to 6 `(qscale=1, dc=0)` blocks and, after
/// the MDEC level-shift, a uniform gray frame at value 128.
#[test]
fn strv3_minimum_frame_decodes_to_uniform_gray() {
    let codes: Vec<MdecCode> = (0..6)
        .flat_map(|_| vec![MdecCode::Header { qscale: 1, dc: 0 }, MdecCode::Eob])
        .collect();

    let mut codec = Codec::StrV3.new_state();
    let bytes = codec.compress(&codes, 1, 1).unwrap();

    let mut uncompressor = Codec::StrV3.new_state();
    let roundtripped = uncompressor.uncompress(&bytes, 1, 1).unwrap();
    assert_eq!(roundtripped.len(), 12);

    let quant = QuantTables::default();
    let picture = decode_frame(&roundtripped, 1, 1, &quant, DecodeQuality::Low).unwrap();

    assert_eq!(picture.width(), 16);
    assert_eq!(picture.height(), 16);
    for sample in picture.luma.iter() {
        let level = *sample + 128;
        assert_eq!(level, 128, "expected uniform gray, got DCT-domain sample {}", sample);
    }
}

/// sectorsPerSecond=150, fps=15/1, audio starts at sector 0, video
/// starts at sector 75: initialSilentFrames rounds 7.5 down to 7.
#[test]
fn avi_sync_audio_leads_video() {
    let silent = initial_silent_frames(15, 1, 150, 0, 75);
    assert_eq!(silent, 7);
}

/// Same rates, video starts at sector 0, audio starts at sector 150:
/// one second of audio (samplesPerSecond samples) must be prepended.
#[test]
fn avi_sync_video_leads_audio() {
    let silent = initial_silent_samples(44_100, 150, 0, 150);
    assert_eq!(silent, 44_100);
}

/// `origImg == newImg` produces an empty dirty set; a caller treats
/// that as a no-op replace.
#[test]
fn partial_replace_with_empty_diff_flags_nothing() {
    let original = flat_picture(2, 2, 64);
    let same = flat_picture(2, 2, 64);
    let dirty = find_dirty_macroblocks(&original, &same, 4);
    assert!(dirty.iter().all(|d| !d));
}

/// A difference of exactly the tolerance does not mark a macroblock
/// dirty; one past it does.
#[test]
fn partial_replace_honors_tolerance_boundary() {
    let tolerance = 10u8;
    let original = flat_picture(1, 1, 100);

    let mut at_tolerance = flat_picture(1, 1, 100);
    at_tolerance.luma[0] = 110;
    let dirty = find_dirty_macroblocks(&original, &at_tolerance, tolerance);
    assert!(!dirty[0], "a diff equal to tolerance must not be dirty");

    let mut past_tolerance = flat_picture(1, 1, 100);
    past_tolerance.luma[0] = 111;
    let dirty = find_dirty_macroblocks(&original, &past_tolerance, tolerance);
    assert!(dirty[0], "a diff one past tolerance must be dirty");
}

/// Merging only touches the macroblocks `find_dirty_macroblocks` flagged.
#[test]
fn partial_replace_merge_preserves_clean_macroblocks() {
    let original = flat_picture(2, 1, 20);
    let mut replacement = flat_picture(2, 1, 20);
    for v in replacement.luma.iter_mut().skip(16 * 16) {
        *v = 200;
    }
    let dirty = find_dirty_macroblocks(&original, &replacement, 4);
    let merged = merge_dirty(&original, &replacement, &dirty);
    assert_eq!(merged.luma[0], 20);
    assert_eq!(merged.luma[16 * 16], 200);
}

/// A highly detailed 320x240 frame re-encoded under a budget equal to
/// the original size must fail with `TooMuchEnergy` once qscale has
/// been raised through its full range and still does not fit.
#[test]
fn budget_failure_raises_too_much_energy() {
    let mb_width = 20;
    let mb_height = 15;
    let mut picture = flat_picture(mb_width, mb_height, 0);
    for (i, v) in picture.luma.iter_mut().enumerate() {
        *v = ((i * 97 % 255) as i16) - 128;
    }
    let quant = QuantTables::default();

    let result = encode_with_budget(&picture, &quant, Codec::StrV2, 0);
    match result {
        Err(Error::TooMuchEnergy) => {}
        other => panic!("expected TooMuchEnergy, got {:?}", other.map(|(b, q)| (b.len(), q))),
    }
}

/// `uncompress(compress(codes))` is the identity for STRv2.
#[test]
fn strv2_round_trip_is_the_identity() {
    let picture = flat_picture(3, 2, 42);
    let quant = QuantTables::default();
    let codes = encode_frame(&picture, &quant, 5);

    let mut codec = Codec::StrV2.new_state();
    let bytes = codec.compress(&codes, 3, 2).unwrap();

    let mut codec = Codec::StrV2.new_state();
    let roundtripped = codec.uncompress(&bytes, 3, 2).unwrap();

    assert_eq!(codes, roundtripped);
}
