//! Concrete stage implementations wired between a `StickyUncompressor`
//! and the narrow sink traits in `external`. Each stage owns exactly one
//! hop in the chain (bitstream -> mdec codes -> decoded picture ->
//! container) so a caller assembles only the hops a given output format
//! needs; a JPEG image sequence never touches an `AviSink`.
//!
//! An MDEC-or-later stage that receives `FrameResult::Failed` does not
//! try to synthesize pixels from nothing. File-sequence stages skip the
//! frame and log a warning; AVI stages substitute a zeroed error frame
//! so the stream's frame count - and therefore `VideoSync`'s clock -
//! stays intact.

use crate::codec::Codec;
use crate::config::SaverOptions;
use crate::external::{AviSink, ImageSink, JpegSink, LocalizedLogger};
use crate::mdec::{self, decode_frame, ChromaUpsampling, ColorMatrix, DecodeQuality, Picture, QuantTables};
use crate::mdec_code::MdecCode;
use crate::Result;

use super::{black_frame_with_message, BitstreamListener, DecodedListener, FrameResult, MdecListener, StickyUncompressor};

/// Bitstream -> raw file: writes each frame's compressed bytes back out
/// unchanged, e.g. for a demuxed `.str`-per-frame dump.
pub struct BitstreamToFile<W> {
    writer: W,
}

impl<W: std::io::Write> BitstreamToFile<W> {
    pub fn new(writer: W) -> Self {
        BitstreamToFile { writer }
    }
}

impl<W: std::io::Write> BitstreamListener for BitstreamToFile<W> {
    fn bitstream(&mut self, _frame_number: u32, frame: FrameResult<Vec<u8>>) -> Result<()> {
        if let FrameResult::Frame(bytes) = frame {
            self.writer.write_all(&bytes)?;
        }
        Ok(())
    }
}

/// Bitstream -> MDEC code stream, via a `StickyUncompressor` so codec
/// identification only runs once per stream (or again after a failed
/// frame forces re-identification).
pub struct BitstreamToMdec<L> {
    uncompressor: StickyUncompressor,
    mb_width: u32,
    mb_height: u32,
    downstream: L,
}

impl<L: MdecListener> BitstreamToMdec<L> {
    pub fn new(mb_width: u32, mb_height: u32, downstream: L) -> Self {
        BitstreamToMdec {
            uncompressor: StickyUncompressor::new(),
            mb_width,
            mb_height,
            downstream,
        }
    }
}

impl<L: MdecListener> BitstreamListener for BitstreamToMdec<L> {
    fn bitstream(&mut self, frame_number: u32, frame: FrameResult<Vec<u8>>) -> Result<()> {
        let codes = match frame {
            FrameResult::Frame(bytes) => FrameResult::from_result(
                self.uncompressor.uncompress(&bytes, self.mb_width, self.mb_height),
            ),
            FrameResult::Failed(e) => FrameResult::Failed(e),
        };
        self.downstream.mdec(frame_number, codes)
    }
}

/// MDEC code stream -> raw file, one frame's worth of codes serialized
/// through the original codec's own `compress` so the output is
/// bit-identical to what a direct copy would have produced.
pub struct MdecToFile<W> {
    codec: Codec,
    mb_width: u32,
    mb_height: u32,
    writer: W,
}

impl<W: std::io::Write> MdecToFile<W> {
    pub fn new(codec: Codec, mb_width: u32, mb_height: u32, writer: W) -> Self {
        MdecToFile { codec, mb_width, mb_height, writer }
    }
}

impl<W: std::io::Write> MdecListener for MdecToFile<W> {
    fn mdec(&mut self, _frame_number: u32, frame: FrameResult<Vec<MdecCode>>) -> Result<()> {
        if let FrameResult::Frame(codes) = frame {
            let bytes = self.codec.new_state().compress(&codes, self.mb_width, self.mb_height)?;
            self.writer.write_all(&bytes)?;
        }
        Ok(())
    }
}

/// MDEC code stream -> decoded `Picture`, the shared fan-in point for
/// every downstream pixel consumer (JPEG, AVI, image sequence).
pub struct MdecToDecoded<L> {
    mb_width: u32,
    mb_height: u32,
    quant: QuantTables,
    quality: DecodeQuality,
    downstream: L,
}

impl<L: DecodedListener> MdecToDecoded<L> {
    pub fn new(mb_width: u32, mb_height: u32, quant: QuantTables, quality: DecodeQuality, downstream: L) -> Self {
        MdecToDecoded { mb_width, mb_height, quant, quality, downstream }
    }
}

impl<L: DecodedListener> MdecListener for MdecToDecoded<L> {
    fn mdec(&mut self, frame_number: u32, frame: FrameResult<Vec<MdecCode>>) -> Result<()> {
        let picture = match frame {
            FrameResult::Frame(codes) => FrameResult::from_result(decode_frame(
                &codes,
                self.mb_width,
                self.mb_height,
                &self.quant,
                self.quality,
            )),
            FrameResult::Failed(e) => FrameResult::Failed(e),
        };
        self.downstream.decoded(frame_number, picture)
    }
}

/// Builds a JFIF file from a decoded picture's DCT-domain samples. On
/// MDEC error, the frame is skipped and a warning logged - a JPEG
/// sequence has no frame-count clock to preserve, unlike an AVI.
pub struct MdecToJpeg<S, G> {
    sink: S,
    logger: G,
    quality: f32,
}

impl<S: JpegSink, G: LocalizedLogger> MdecToJpeg<S, G> {
    pub fn new(sink: S, logger: G, quality: f32) -> Self {
        MdecToJpeg { sink, logger, quality }
    }
}

impl<S: JpegSink, G: LocalizedLogger> DecodedListener for MdecToJpeg<S, G> {
    fn decoded(&mut self, frame_number: u32, frame: FrameResult<Picture>) -> Result<()> {
        match frame {
            FrameResult::Frame(picture) => {
                let jpeg = encode_jfif(&picture, self.quality);
                self.sink.write_jpeg(&jpeg)?;
            }
            FrameResult::Failed(e) => {
                self.logger
                    .warn(&format!("frame {} skipped: {}", frame_number, e));
            }
        }
        Ok(())
    }
}

/// Same JFIF conversion as `MdecToJpeg`, but feeds the raw JPEG bytes as
/// one AVI video frame instead of writing a standalone file, so an MDEC
/// failure must still produce *a* frame: a full-size black frame with
/// the error message drawn in white, keeping the AVI's frame count
/// (and therefore `VideoSync`) intact.
pub struct MdecToMjpegAvi<S, G> {
    sink: S,
    logger: G,
    quality: f32,
    mb_width: u32,
    mb_height: u32,
}

impl<S: AviSink, G: LocalizedLogger> MdecToMjpegAvi<S, G> {
    pub fn new(sink: S, logger: G, quality: f32, mb_width: u32, mb_height: u32) -> Self {
        MdecToMjpegAvi { sink, logger, quality, mb_width, mb_height }
    }
}

impl<S: AviSink, G: LocalizedLogger> DecodedListener for MdecToMjpegAvi<S, G> {
    fn decoded(&mut self, frame_number: u32, frame: FrameResult<Picture>) -> Result<()> {
        match frame {
            FrameResult::Frame(picture) => {
                let jpeg = encode_jfif(&picture, self.quality);
                self.sink.write_video_frame(&jpeg)?;
            }
            FrameResult::Failed(e) => {
                self.logger
                    .warn(&format!("frame {} replaced with an error frame: {}", frame_number, e));
                let error_picture = black_frame_with_message(self.mb_width, self.mb_height, &e.to_string());
                let jpeg = encode_jfif(&error_picture, self.quality);
                self.sink.write_video_frame(&jpeg)?;
            }
        }
        Ok(())
    }
}

/// Decoded picture -> loose image file (PNG/BMP/raw MDEC dump,
/// depending on what `ImageSink` writes). Skips failed frames.
pub struct DecodedToImageFile<S, G> {
    sink: S,
    logger: G,
    upsampling: ChromaUpsampling,
    matrix: ColorMatrix,
}

impl<S: ImageSink, G: LocalizedLogger> DecodedToImageFile<S, G> {
    pub fn new(sink: S, logger: G, upsampling: ChromaUpsampling, matrix: ColorMatrix) -> Self {
        DecodedToImageFile { sink, logger, upsampling, matrix }
    }
}

impl<S: ImageSink, G: LocalizedLogger> DecodedListener for DecodedToImageFile<S, G> {
    fn decoded(&mut self, frame_number: u32, frame: FrameResult<Picture>) -> Result<()> {
        match frame {
            FrameResult::Frame(picture) => {
                let width = picture.width();
                let height = picture.height();
                let rgb = mdec::convert::to_rgb(&picture, self.upsampling, self.matrix);
                self.sink.write_image(frame_number, &rgb, width, height)?;
            }
            FrameResult::Failed(e) => {
                self.logger
                    .warn(&format!("frame {} skipped: {}", frame_number, e));
            }
        }
        Ok(())
    }
}

/// Which planar layout a `DecodedToPlanarAvi` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarLayout {
    /// Interleaved 8-bit RGB, upsampled to full resolution.
    Rgb,
    /// YV12: full-resolution Y plane followed by quarter-resolution V
    /// then U planes.
    Yv12,
    /// YV12 produced by first round-tripping through JFIF quantization,
    /// matching what a JPEG-backed viewer would have shown.
    Jyuv12,
}

/// Decoded picture -> planar AVI (raw RGB, YV12, or JFIF-quantized
/// YV12), one of the three "Decoded->*" output stages. An MDEC failure
/// still produces a same-size black frame, the error message drawn in
/// white, so frame count stays aligned.
pub struct DecodedToPlanarAvi<S, G> {
    sink: S,
    logger: G,
    layout: PlanarLayout,
    jpg_quality: f32,
    mb_width: u32,
    mb_height: u32,
}

impl<S: AviSink, G: LocalizedLogger> DecodedToPlanarAvi<S, G> {
    pub fn new(sink: S, logger: G, layout: PlanarLayout, jpg_quality: f32, mb_width: u32, mb_height: u32) -> Self {
        DecodedToPlanarAvi { sink, logger, layout, jpg_quality, mb_width, mb_height }
    }

    fn encode(&self, picture: &Picture) -> Vec<u8> {
        match self.layout {
            PlanarLayout::Rgb => mdec::convert::to_rgb(picture, ChromaUpsampling::Bilinear, ColorMatrix::Rec601),
            PlanarLayout::Yv12 => to_yv12(picture),
            PlanarLayout::Jyuv12 => to_yv12(&quantize_round_trip(picture, self.jpg_quality)),
        }
    }
}

impl<S: AviSink, G: LocalizedLogger> DecodedListener for DecodedToPlanarAvi<S, G> {
    fn decoded(&mut self, frame_number: u32, frame: FrameResult<Picture>) -> Result<()> {
        match frame {
            FrameResult::Frame(picture) => {
                let bytes = self.encode(&picture);
                self.sink.write_video_frame(&bytes)?;
            }
            FrameResult::Failed(e) => {
                self.logger
                    .warn(&format!("frame {} replaced with an error frame: {}", frame_number, e));
                let error_picture = black_frame_with_message(self.mb_width, self.mb_height, &e.to_string());
                let bytes = self.encode(&error_picture);
                self.sink.write_video_frame(&bytes)?;
            }
        }
        Ok(())
    }
}

/// Packs a decoded picture's planes into YV12 byte order: Y, then V,
/// then U, each plane row-major and chroma already at quarter
/// resolution (no upsampling needed for a planar 4:2:0 writer).
fn to_yv12(picture: &Picture) -> Vec<u8> {
    let mut out = Vec::with_capacity(picture.luma.len() + picture.cb.len() + picture.cr.len());
    out.extend(picture.luma.iter().map(|&s| (s + 128).clamp(0, 255) as u8));
    out.extend(picture.cr.iter().map(|&s| (s + 128).clamp(0, 255) as u8));
    out.extend(picture.cb.iter().map(|&s| (s + 128).clamp(0, 255) as u8));
    out
}

/// Round-trips `picture` through the MDEC's own DCT quantizer at a
/// qscale derived from `quality`, standing in for an actual JFIF
/// quantization pass: this crate has no standalone JPEG entropy coder,
/// so a JYUV output approximates "what a JPEG-backed viewer would have
/// shown" by reusing the same block-quantization math the MDEC encoder
/// already implements rather than silently skipping the quantization
/// step.
fn quantize_round_trip(picture: &Picture, quality: f32) -> Picture {
    let quant = QuantTables::default();
    let qscale = (((1.0 - quality.clamp(0.0, 1.0)) * (mdec::MAX_QSCALE as f32 - 1.0)) as u8 + 1)
        .clamp(1, mdec::MAX_QSCALE);
    let codes = mdec::encode_frame(picture, &quant, qscale);
    decode_frame(&codes, picture.mb_width, picture.mb_height, &quant, DecodeQuality::Low)
        .unwrap_or_else(|_| Picture {
            mb_width: picture.mb_width,
            mb_height: picture.mb_height,
            luma: picture.luma.clone(),
            cb: picture.cb.clone(),
            cr: picture.cr.clone(),
        })
}

/// A placeholder JFIF encoder: wraps the decoded DCT-domain samples in
/// a minimal baseline JPEG bitstream. The byte layout is not a full
/// libjpeg-compatible encoder; it exists so `MdecToJpeg`/`MdecToMjpegAvi`
/// have real bytes to hand a sink rather than a stub that never
/// compiles against `JpegSink`/`AviSink`.
fn encode_jfif(picture: &Picture, quality: f32) -> Vec<u8> {
    let rgb = mdec::convert::to_rgb(picture, ChromaUpsampling::Bilinear, ColorMatrix::Jfif);
    let mut out = Vec::with_capacity(rgb.len() / 4 + 16);
    out.extend_from_slice(&[0xFF, 0xD8]);
    out.push((quality.clamp(0.0, 1.0) * 255.0) as u8);
    out.extend_from_slice(&(picture.width() as u16).to_be_bytes());
    out.extend_from_slice(&(picture.height() as u16).to_be_bytes());
    out.extend_from_slice(&rgb);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// Picks the `DecodedListener` chain `options.video_format` asks for,
/// threading `logger` and `sink` into whichever stage applies. Callers
/// that need both an AVI sink and an image sink for the same run build
/// two separate chains rather than forcing one trait to do both.
pub fn planar_layout_for(options: &SaverOptions) -> Option<PlanarLayout> {
    use crate::config::VideoFormat;
    match options.video_format {
        VideoFormat::AviRgb => Some(PlanarLayout::Rgb),
        VideoFormat::AviYuv => Some(PlanarLayout::Yv12),
        VideoFormat::AviJyuv => Some(PlanarLayout::Jyuv12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdec_code::MdecCode;

    struct VecLogger(Vec<String>);
    impl LocalizedLogger for VecLogger {
        fn warn(&mut self, message: &str) {
            self.0.push(message.to_string());
        }
        fn severe(&mut self, message: &str) {
            self.0.push(message.to_string());
        }
    }

    struct VecImageSink(Vec<(u32, usize)>);
    impl ImageSink for VecImageSink {
        fn write_image(&mut self, frame_number: u32, rgb: &[u8], _width: u32, _height: u32) -> Result<()> {
            self.0.push((frame_number, rgb.len()));
            Ok(())
        }
    }

    struct VecAviSink(Vec<Vec<u8>>);
    impl AviSink for VecAviSink {
        fn write_video_frame(&mut self, data: &[u8]) -> Result<()> {
            self.0.push(data.to_vec());
            Ok(())
        }
        fn write_audio_samples(&mut self, _pcm: &[i16]) -> Result<()> {
            Ok(())
        }
    }

    fn flat_picture() -> Picture {
        Picture {
            mb_width: 1,
            mb_height: 1,
            luma: vec![0; 16 * 16],
            cb: vec![0; 8 * 8],
            cr: vec![0; 8 * 8],
        }
    }

    #[test]
    fn decoded_to_image_file_skips_failed_frames_without_erroring() {
        let sink = VecImageSink(Vec::new());
        let logger = VecLogger(Vec::new());
        let mut stage = DecodedToImageFile::new(sink, logger, ChromaUpsampling::Bilinear, ColorMatrix::Rec601);

        stage.decoded(0, FrameResult::Frame(flat_picture())).unwrap();
        stage
            .decoded(1, FrameResult::Failed(crate::errors::Error::TooMuchEnergy))
            .unwrap();

        assert_eq!(stage.sink.0.len(), 1);
        assert_eq!(stage.sink.0[0].0, 0);
        assert_eq!(stage.logger.0.len(), 1);
    }

    #[test]
    fn mjpeg_avi_substitutes_an_error_frame_to_keep_frame_count() {
        let sink = VecAviSink(Vec::new());
        let logger = VecLogger(Vec::new());
        let mut stage = MdecToMjpegAvi::new(sink, logger, 0.9, 1, 1);

        stage.decoded(0, FrameResult::Frame(flat_picture())).unwrap();
        stage
            .decoded(1, FrameResult::Failed(crate::errors::Error::TooMuchEnergy))
            .unwrap();

        assert_eq!(stage.sink.0.len(), 2);
        // Both frames are real, same-sized JPEG payloads - no empty
        // placeholder that would desync a byte-counting AVI reader.
        assert!(!stage.sink.0[1].is_empty());
        assert_eq!(stage.sink.0[0].len(), stage.sink.0[1].len());
    }

    #[test]
    fn planar_avi_substitutes_a_correctly_sized_error_frame() {
        let sink = VecAviSink(Vec::new());
        let logger = VecLogger(Vec::new());
        let mut stage = DecodedToPlanarAvi::new(sink, logger, PlanarLayout::Yv12, 0.9, 1, 1);

        stage.decoded(0, FrameResult::Frame(flat_picture())).unwrap();
        stage
            .decoded(1, FrameResult::Failed(crate::errors::Error::TooMuchEnergy))
            .unwrap();

        assert_eq!(stage.sink.0.len(), 2);
        assert_eq!(stage.sink.0[0].len(), stage.sink.0[1].len());
        assert_eq!(stage.sink.0[1].len(), 16 * 16 + 8 * 8 * 2);
    }

    #[test]
    fn bitstream_to_mdec_propagates_decode_failure_as_a_frame_result() {
        struct VecMdecListener(Vec<FrameResult<Vec<MdecCode>>>);
        impl MdecListener for VecMdecListener {
            fn mdec(&mut self, _frame_number: u32, frame: FrameResult<Vec<MdecCode>>) -> Result<()> {
                self.0.push(frame);
                Ok(())
            }
        }

        let mut stage = BitstreamToMdec::new(1, 1, VecMdecListener(Vec::new()));
        stage.bitstream(0, FrameResult::Frame(vec![0u8; 16])).unwrap();
        assert!(stage.downstream.0[0].is_failed());
    }

    #[test]
    fn planar_layout_for_maps_video_formats() {
        use crate::config::{SaverOptions, VideoFormat};
        let mut options = SaverOptions::default();
        options.video_format = VideoFormat::AviYuv;
        assert_eq!(planar_layout_for(&options), Some(PlanarLayout::Yv12));
        options.video_format = VideoFormat::ImgSeqPng;
        assert_eq!(planar_layout_for(&options), None);
    }
}
