//! The pluggable stage chain: bitstream -> MDEC code stream -> decoded
//! picture -> container writer. Each stage is a typed listener; a frame
//! that fails partway through still reaches downstream listeners, as a
//! `FrameResult::Failed`, so an AVI writer can substitute an error frame
//! instead of truncating the file.

mod error_frame;
pub mod stages;
mod sticky;

pub use error_frame::black_frame_with_message;

pub use sticky::StickyUncompressor;

use crate::errors::Error;
use crate::mdec::Picture;
use crate::mdec_code::MdecCode;
use crate::Result;

/// A stage's per-frame outcome: either the data it produced, or the
/// typed error that frame failed with. Distinct from this crate's
/// `Result`, which is for calls that abort the whole pipeline (I/O
/// failure, a canceled task) - a single corrupt frame should not stop
/// the rest of the stream from decoding.
pub enum FrameResult<T> {
    Frame(T),
    Failed(Error),
}

impl<T> FrameResult<T> {
    pub fn from_result(result: Result<T>) -> FrameResult<T> {
        match result {
            Ok(v) => FrameResult::Frame(v),
            Err(e) => FrameResult::Failed(e),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FrameResult::Failed(_))
    }
}

pub trait BitstreamListener {
    fn bitstream(&mut self, frame_number: u32, frame: FrameResult<Vec<u8>>) -> Result<()>;
}

pub trait MdecListener {
    fn mdec(&mut self, frame_number: u32, frame: FrameResult<Vec<MdecCode>>) -> Result<()>;
}

pub trait DecodedListener {
    fn decoded(&mut self, frame_number: u32, frame: FrameResult<Picture>) -> Result<()>;
}
