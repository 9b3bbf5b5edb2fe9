//! Interfaces the pipeline consumes from its host (a sector source, a
//! file-naming scheme, a logger) and the narrow sink traits it writes
//! through. None of these are implemented here - a caller wires real
//! disc images and output files in; this module only pins the shapes.

use crate::Result;

/// One CD-ROM sector's worth of data, classified by what it carries.
/// The driver hands every sector it reads to both the video demuxer and
/// the audio decoder; for Crusader streams those are the same object,
/// so the sector is fed to it only once (see `driver::PipelineDriver`).
pub enum IdentifiedSector {
    StrVideo { channel: u8, user_data: Vec<u8> },
    XaAudio { channel: u8, samples_per_second: u32, user_data: Vec<u8> },
    CrusaderVideoAudio { channel: u8, user_data: Vec<u8> },
    Unknown,
}

impl IdentifiedSector {
    pub fn channel(&self) -> Option<u8> {
        match self {
            IdentifiedSector::StrVideo { channel, .. }
            | IdentifiedSector::XaAudio { channel, .. }
            | IdentifiedSector::CrusaderVideoAudio { channel, .. } => Some(*channel),
            IdentifiedSector::Unknown => None,
        }
    }

    pub fn user_data(&self) -> Option<&[u8]> {
        match self {
            IdentifiedSector::StrVideo { user_data, .. }
            | IdentifiedSector::XaAudio { user_data, .. }
            | IdentifiedSector::CrusaderVideoAudio { user_data, .. } => Some(user_data),
            IdentifiedSector::Unknown => None,
        }
    }

    pub fn samples_per_second(&self) -> Option<u32> {
        match self {
            IdentifiedSector::XaAudio { samples_per_second, .. } => Some(*samples_per_second),
            _ => None,
        }
    }
}

/// Pulls sectors one at a time from an underlying disc image. Returns
/// `Ok(None)` at end of stream.
pub trait SectorReader {
    fn read_sector(&mut self) -> Result<Option<IdentifiedSector>>;
}

/// Names an output file for one frame of an image-sequence save, e.g.
/// `"frame%04d.png"`-style formatting.
pub trait FrameFileFormatter {
    fn format(&self, frame_number: u32) -> String;
}

/// Reports decode problems in whatever form the host wants (a GUI
/// status bar, stderr, a log file); severity mirrors the error
/// taxonomy's logged levels.
pub trait LocalizedLogger {
    fn warn(&mut self, message: &str);
    fn severe(&mut self, message: &str);
}

/// Sink for one AVI output stream's worth of video and audio frames.
pub trait AviSink {
    fn write_video_frame(&mut self, data: &[u8]) -> Result<()>;
    fn write_audio_samples(&mut self, pcm: &[i16]) -> Result<()>;
}

/// Sink for a single JPEG (or MJPEG member frame).
pub trait JpegSink {
    fn write_jpeg(&mut self, data: &[u8]) -> Result<()>;
}

/// Sink for one frame of an image-sequence save (PNG/BMP/raw MDEC).
pub trait ImageSink {
    fn write_image(&mut self, frame_number: u32, rgb: &[u8], width: u32, height: u32) -> Result<()>;
}

/// Sink for decoded PCM audio samples.
pub trait PcmSink {
    fn write_samples(&mut self, pcm: &[i16]) -> Result<()>;
}
