//! Orchestrates sector-by-sector feeding: pulls sectors from a
//! `SectorReader`, hands each to the video demuxer and (separately,
//! unless they are the same object) the audio decoder, and forwards
//! completed frames and PCM buffers to whatever stage chain is wired
//! downstream.
//!
//! The core is single-threaded per stream: one driver feeds one sector
//! to one stage chain at a time. Threading for the live player lives in
//! `pool`, not here.

use crate::external::{IdentifiedSector, SectorReader};
use crate::Result;

/// A complete coded video frame reassembled from one or more sectors.
/// Exclusively owns its payload buffer; a pipeline stage may borrow it
/// for the duration of one call but does not keep it alive past that.
pub struct DemuxedFrame {
    pub width: u32,
    pub height: u32,
    pub start_sector: u32,
    pub end_sector: u32,
    pub presentation_sector: u32,
    pub frame_number: u32,
    pub payload: Vec<u8>,
}

/// One block of decoded PCM audio, tagged with the sector it should
/// present at.
pub struct AudioBlock {
    pub presentation_sector: u32,
    pub samples: Vec<i16>,
}

/// Accumulates sectors into complete frames. A video demuxer buffers
/// partial frames across `feed_video_sector` calls and returns a
/// `DemuxedFrame` only once the last sector of that frame arrives.
pub trait Demuxer {
    fn feed_video_sector(&mut self, sector_number: u32, channel: u8, payload: &[u8]) -> Result<Option<DemuxedFrame>>;
}

/// Decodes XA-ADPCM (or equivalent) sectors into PCM blocks.
pub trait AudioDecoder {
    fn feed_audio_sector(
        &mut self,
        sector_number: u32,
        channel: u8,
        samples_per_second: u32,
        payload: &[u8],
    ) -> Result<Option<AudioBlock>>;
}

/// Receives completed frames and audio blocks as the driver demuxes
/// them, in the order sectors arrived.
pub trait DriverSink {
    fn frame_complete(&mut self, frame: DemuxedFrame) -> Result<()>;
    fn audio_complete(&mut self, audio: AudioBlock) -> Result<()>;
}

/// How the driver should treat the object behind a `Demuxer` +
/// `AudioDecoder` pair: most formats keep them distinct so a sector
/// tagged `XaAudio` is fed only to the audio decoder. Crusader streams
/// multiplex both into one object, so a `CrusaderVideoAudio` sector
/// must be fed to it only once rather than to each half separately.
pub enum DemuxKind {
    Separate { video: Box<dyn Demuxer>, audio: Box<dyn AudioDecoder> },
    Combined(std::cell::RefCell<CrusaderDemuxer>),
}

/// Placeholder combined demuxer/audio-decoder object for Crusader
/// streams; the video and audio halves share one sector feed. The
/// concrete bitstream parsing lives in `codec::crusader`; this type only
/// models the driver-level "same object" relationship the format
/// requires.
pub struct CrusaderDemuxer {
    video: Box<dyn Demuxer>,
}

impl CrusaderDemuxer {
    pub fn new(video: Box<dyn Demuxer>) -> Self {
        CrusaderDemuxer { video }
    }

    fn feed(&mut self, sector_number: u32, channel: u8, payload: &[u8]) -> Result<Option<DemuxedFrame>> {
        self.video.feed_video_sector(sector_number, channel, payload)
    }
}

/// Pulls sectors one at a time from `reader` and dispatches each to the
/// video demuxer, the audio decoder, or both, per `DemuxKind`. Ordering
/// within a stream is strictly sector order in, demux-completion order
/// out.
pub struct PipelineDriver {
    reader: Box<dyn SectorReader>,
    demux: DemuxKind,
}

impl PipelineDriver {
    pub fn new_separate(reader: Box<dyn SectorReader>, video: Box<dyn Demuxer>, audio: Box<dyn AudioDecoder>) -> Self {
        PipelineDriver {
            reader,
            demux: DemuxKind::Separate { video, audio },
        }
    }

    pub fn new_combined(reader: Box<dyn SectorReader>, combined: CrusaderDemuxer) -> Self {
        PipelineDriver {
            reader,
            demux: DemuxKind::Combined(std::cell::RefCell::new(combined)),
        }
    }

    /// Drains every sector from the reader, calling `sink.frame_complete`
    /// and `sink.audio_complete` as demuxing produces them. Returns once
    /// the reader reports end of stream.
    pub fn run(&mut self, sink: &mut dyn DriverSink) -> Result<()> {
        while let Some(sector) = self.reader.read_sector()? {
            self.dispatch(sector, sink)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, sector: IdentifiedSector, sink: &mut dyn DriverSink) -> Result<()> {
        match sector {
            IdentifiedSector::StrVideo { channel, user_data } => {
                if let DemuxKind::Separate { video, .. } = &mut self.demux {
                    if let Some(frame) = video.feed_video_sector(0, channel, &user_data)? {
                        sink.frame_complete(frame)?;
                    }
                }
            }
            IdentifiedSector::XaAudio { channel, samples_per_second, user_data } => {
                if let DemuxKind::Separate { audio, .. } = &mut self.demux {
                    if let Some(block) = audio.feed_audio_sector(0, channel, samples_per_second, &user_data)? {
                        sink.audio_complete(block)?;
                    }
                }
            }
            IdentifiedSector::CrusaderVideoAudio { channel, user_data } => {
                if let DemuxKind::Combined(combined) = &self.demux {
                    if let Some(frame) = combined.borrow_mut().feed(0, channel, &user_data)? {
                        sink.frame_complete(frame)?;
                    }
                }
            }
            IdentifiedSector::Unknown => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingVideoDemuxer {
        sectors_seen: u32,
        complete_after: u32,
    }

    impl Demuxer for CountingVideoDemuxer {
        fn feed_video_sector(&mut self, _sector_number: u32, _channel: u8, payload: &[u8]) -> Result<Option<DemuxedFrame>> {
            self.sectors_seen += 1;
            if self.sectors_seen % self.complete_after == 0 {
                Ok(Some(DemuxedFrame {
                    width: 320,
                    height: 240,
                    start_sector: 0,
                    end_sector: 0,
                    presentation_sector: 0,
                    frame_number: self.sectors_seen / self.complete_after - 1,
                    payload: payload.to_vec(),
                }))
            } else {
                Ok(None)
            }
        }
    }

    struct NoopAudioDecoder;
    impl AudioDecoder for NoopAudioDecoder {
        fn feed_audio_sector(&mut self, _sector_number: u32, _channel: u8, _samples_per_second: u32, _payload: &[u8]) -> Result<Option<AudioBlock>> {
            Ok(None)
        }
    }

    struct FixedSectorReader {
        sectors: Vec<IdentifiedSector>,
        pos: usize,
    }
    impl SectorReader for FixedSectorReader {
        fn read_sector(&mut self) -> Result<Option<IdentifiedSector>> {
            if self.pos >= self.sectors.len() {
                return Ok(None);
            }
            let s = std::mem::replace(&mut self.sectors[self.pos], IdentifiedSector::Unknown);
            self.pos += 1;
            Ok(Some(s))
        }
    }

    struct VecSink {
        frames: Vec<u32>,
    }
    impl DriverSink for VecSink {
        fn frame_complete(&mut self, frame: DemuxedFrame) -> Result<()> {
            self.frames.push(frame.frame_number);
            Ok(())
        }
        fn audio_complete(&mut self, _audio: AudioBlock) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn driver_emits_one_frame_per_two_video_sectors() {
        let reader: Box<dyn SectorReader> = Box::new(FixedSectorReader {
            sectors: vec![
                IdentifiedSector::StrVideo { channel: 0, user_data: vec![1] },
                IdentifiedSector::StrVideo { channel: 0, user_data: vec![2] },
                IdentifiedSector::StrVideo { channel: 0, user_data: vec![3] },
                IdentifiedSector::StrVideo { channel: 0, user_data: vec![4] },
            ],
            pos: 0,
        });
        let mut driver = PipelineDriver::new_separate(
            reader,
            Box::new(CountingVideoDemuxer { sectors_seen: 0, complete_after: 2 }),
            Box::new(NoopAudioDecoder),
        );
        let mut sink = VecSink { frames: Vec::new() };
        driver.run(&mut sink).unwrap();
        assert_eq!(sink.frames, vec![0, 1]);
    }
}
