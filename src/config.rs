//! Configuration surface for a video save operation: everything a
//! caller can dial in without touching pipeline internals.

use crate::mdec::{ChromaUpsampling, DecodeQuality};

/// Which container/output a saver stage writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    AviMjpg,
    AviYuv,
    AviJyuv,
    AviRgb,
    ImgSeqDemux,
    ImgSeqMdec,
    ImgSeqJpg,
    ImgSeqBmp,
    ImgSeqPng,
}

/// CD-ROM read speed, which sets the sector rate audio presentation
/// time is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscSpeed {
    X1,
    X2,
}

impl DiscSpeed {
    /// Sectors per second at this speed.
    pub fn sectors_per_second(self) -> u32 {
        match self {
            DiscSpeed::X1 => 75,
            DiscSpeed::X2 => 150,
        }
    }
}

/// Inclusive frame range to save, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
}

/// Every tunable a video saver exposes.
#[derive(Debug, Clone)]
pub struct SaverOptions {
    pub video_format: VideoFormat,
    pub decode_quality: DecodeQuality,
    pub chroma_upsampling: ChromaUpsampling,
    /// JPEG quality for MJPEG/JPEG outputs, in `[0.0, 1.0]`.
    pub jpg_quality: f32,
    /// When `false`, output dimensions round up to a multiple of 16
    /// instead of cropping to the stream's declared size.
    pub crop: bool,
    pub disc_speed: DiscSpeed,
    pub frame_range: Option<FrameRange>,
    pub emulate_psx_av_sync: bool,
    /// Linear audio volume scale, in `[0.0, 1.0]`.
    pub audio_volume: f32,
    /// Zero out the DC-only `Ac0Cleaner` artifact macroblocks produce
    /// when every AC coefficient quantizes to zero at low qscale.
    /// Off by default: it is a cosmetic smoothing pass, not a
    /// correctness fix, and changes the decoded image.
    pub clean_ac0: bool,
}

impl Default for SaverOptions {
    fn default() -> Self {
        SaverOptions {
            video_format: VideoFormat::AviMjpg,
            decode_quality: DecodeQuality::Low,
            chroma_upsampling: ChromaUpsampling::Bilinear,
            jpg_quality: 0.9,
            crop: true,
            disc_speed: DiscSpeed::X2,
            frame_range: None,
            emulate_psx_av_sync: true,
            audio_volume: 1.0,
            clean_ac0: false,
        }
    }
}
