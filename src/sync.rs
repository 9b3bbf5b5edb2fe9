//! `VideoSync` and `AudioVideoSync`: small clock-reconciliation value
//! objects that tell an AVI writer (or a live player) how many blank
//! frames or silent samples to inject so a sector-timed audio stream and
//! a frame-timed video stream stay aligned.

/// Frame/sector clock reconciliation for one output video stream.
///
/// Presentation sectors arrive from the demuxer; `frame_duplication_for`
/// converts the latest one into how many frames the cumulative frame
/// count is now behind (or, rarely, ahead of) where it should be.
#[derive(Debug, Clone, Copy)]
pub struct VideoSync {
    fps_num: u32,
    fps_denom: u32,
    sectors_per_second: u32,
    start_sector: i64,
    frames_written: u32,
}

impl VideoSync {
    /// `initial_silent_frames` pre-seeds the frame count for when video
    /// starts later than audio: the first real frame this sync admits
    /// will already read as that many frames behind, so the caller
    /// still emits the right number of leading blanks.
    pub fn new(
        fps_num: u32,
        fps_denom: u32,
        sectors_per_second: u32,
        start_sector: i64,
        initial_silent_frames: u32,
    ) -> Self {
        VideoSync {
            fps_num,
            fps_denom,
            sectors_per_second,
            start_sector,
            frames_written: initial_silent_frames,
        }
    }

    /// Expected cumulative frame count at presentation-end-sector `p`.
    fn expected_frames(&self, p: i64) -> i64 {
        let elapsed = p - self.start_sector;
        (elapsed * self.fps_num as i64) / (self.fps_denom as i64 * self.sectors_per_second as i64)
    }

    /// Returns how many blank (if this is the first frame) or repeated
    /// (otherwise) frames the writer should emit before the frame that
    /// arrived at sector `p`, and advances the internal clock by that
    /// many plus the one real frame the caller is about to write.
    ///
    /// A negative expected-minus-written difference means the frame
    /// arrived ahead of schedule; that is reported back as `None` (a
    /// caller logs it as a warning) rather than shifting the clock
    /// backwards.
    pub fn frame_duplication_for(&mut self, p: i64) -> Option<u32> {
        let expected = self.expected_frames(p);
        let written = self.frames_written as i64;
        let duplicates = expected - written;
        if duplicates < 0 {
            self.frames_written += 1;
            return None;
        }
        self.frames_written += duplicates as u32 + 1;
        Some(duplicates as u32)
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }
}

/// Extends `VideoSync` with a sample-level audio clock for muxed
/// streams: one `AudioVideoSync` per output file, shared between the
/// video and audio write paths.
#[derive(Debug, Clone, Copy)]
pub struct AudioVideoSync {
    video: VideoSync,
    samples_per_second: u32,
    sectors_per_second: u32,
    start_sector: i64,
    samples_written: u64,
}

impl AudioVideoSync {
    pub fn new(
        fps_num: u32,
        fps_denom: u32,
        sectors_per_second: u32,
        samples_per_second: u32,
        start_sector: i64,
        initial_silent_frames: u32,
        initial_silent_samples: u64,
    ) -> Self {
        AudioVideoSync {
            video: VideoSync::new(fps_num, fps_denom, sectors_per_second, start_sector, initial_silent_frames),
            samples_per_second,
            sectors_per_second,
            start_sector,
            samples_written: initial_silent_samples,
        }
    }

    pub fn frame_duplication_for(&mut self, p: i64) -> Option<u32> {
        self.video.frame_duplication_for(p)
    }

    pub fn frames_written(&self) -> u32 {
        self.video.frames_written()
    }

    fn expected_samples(&self, s: i64) -> i64 {
        let elapsed = s - self.start_sector;
        (elapsed * self.samples_per_second as i64) / self.sectors_per_second as i64
    }

    /// Returns how many silent samples to prepend before the audio
    /// buffer that arrived at presentation sector `s`, and advances the
    /// sample clock by that count plus `sample_count` (the real samples
    /// about to be written).
    pub fn silent_samples_for(&mut self, s: i64, sample_count: u32) -> u32 {
        let expected = self.expected_samples(s);
        let written = self.samples_written as i64;
        let silence = (expected - written).max(0) as u32;
        self.samples_written += silence as u64 + sample_count as u64;
        silence
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

/// Truncating division for the `sectors_per_second / fps` style ratios
/// initial-offset seeding needs, matching the same elapsed-time-to-count
/// rule `expected_frames`/`expected_samples` use: a 7.5-frame delay seeds
/// 7 silent frames, not 8.
fn floor_div(numerator: i64, denominator: i64) -> i64 {
    numerator / denominator
}

/// Computes `initial_silent_frames` for a video stream that starts
/// `video_start_sector` sectors after audio started at `audio_start_sector`.
///
/// Matches `VideoSync::expected_frames`'s truncating division so the
/// seed count and the steady-state duplication count agree on the same
/// elapsed-time-to-frame-count rule.
pub fn initial_silent_frames(
    fps_num: u32,
    fps_denom: u32,
    sectors_per_second: u32,
    audio_start_sector: i64,
    video_start_sector: i64,
) -> u32 {
    if video_start_sector <= audio_start_sector {
        return 0;
    }
    let delay_sectors = video_start_sector - audio_start_sector;
    let numerator = delay_sectors * fps_num as i64;
    let denominator = fps_denom as i64 * sectors_per_second as i64;
    floor_div(numerator, denominator).max(0) as u32
}

/// Computes `initial_silent_samples` for an audio stream that starts
/// `audio_start_sector` sectors after video started at `video_start_sector`.
pub fn initial_silent_samples(
    samples_per_second: u32,
    sectors_per_second: u32,
    video_start_sector: i64,
    audio_start_sector: i64,
) -> u64 {
    if audio_start_sector <= video_start_sector {
        return 0;
    }
    let delay_sectors = audio_start_sector - video_start_sector;
    floor_div(delay_sectors * samples_per_second as i64, sectors_per_second as i64).max(0) as u64
}

/// Presentation time in nanoseconds for a container at `sector` sectors
/// from the stream's start, at `sectors_per_second`.
pub fn presentation_time_ns(sector_from_start: i64, sectors_per_second: u32) -> i64 {
    sector_from_start * 1_000_000_000 / sectors_per_second as i64
}
