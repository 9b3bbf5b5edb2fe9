//! The `errors` module defines the common error types used across the
//! decode/encode pipeline.

use std::error;
use std::fmt;
use std::io;

use super::Result;

/// Coordinates of the macroblock / sub-block a decode error occurred in,
/// attached to `ReadCorruption` and `EndOfStream` so a caller can report
/// exactly where a stream went bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockCoord {
    pub mb_x: u32,
    pub mb_y: u32,
    /// 0..=3 luma (TL, TR, BL, BR), 4 Cb, 5 Cr.
    pub block_index: u8,
}

impl fmt::Display for BlockCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "mb=({}, {}) block={}",
            self.mb_x, self.mb_y, self.block_index
        )
    }
}

/// `Error` enumerates every failure the core can report, per the taxonomy
/// in the error handling design.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or writing a stream.
    Io(io::Error),
    /// Bitstream header does not match any known codec.
    UnrecognizedFormat,
    /// Valid header but semantically impossible data (bad VLC, DC out of
    /// range, overlong run).
    ReadCorruption { at: BlockCoord, reason: &'static str },
    /// Bitstream too short for the declared block geometry.
    EndOfStream { at: BlockCoord },
    /// Encoder could not fit the frame in its byte budget at any qscale.
    TooMuchEnergy,
    /// User-requested cancellation; caller should unwind cleanly.
    TaskCanceled,
    /// Programmer error: caller violated a precondition (e.g. mismatched
    /// writer dimensions). Not recoverable.
    IllegalArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::UnrecognizedFormat => write!(f, "bitstream does not match any known codec"),
            Error::ReadCorruption { at, reason } => {
                write!(f, "corrupt bitstream at {}: {}", at, reason)
            }
            Error::EndOfStream { at } => write!(f, "bitstream ended early at {}", at),
            Error::TooMuchEnergy => write!(
                f,
                "frame could not be re-encoded within its byte budget at any qscale"
            ),
            Error::TaskCanceled => write!(f, "task canceled"),
            Error::IllegalArgument(msg) => write!(f, "illegal argument: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn cause(&self) -> Option<&dyn error::Error> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/// Builds a `ReadCorruption` error.
pub fn corruption<T>(at: BlockCoord, reason: &'static str) -> Result<T> {
    Err(Error::ReadCorruption { at, reason })
}

/// Builds an `EndOfStream` error.
pub fn end_of_stream<T>(at: BlockCoord) -> Result<T> {
    Err(Error::EndOfStream { at })
}

/// Builds an `UnrecognizedFormat` error.
pub fn unrecognized_format<T>() -> Result<T> {
    Err(Error::UnrecognizedFormat)
}

/// Builds a `TooMuchEnergy` error.
pub fn too_much_energy<T>() -> Result<T> {
    Err(Error::TooMuchEnergy)
}

/// Builds an `IllegalArgument` error.
pub fn illegal_argument<T>(msg: &'static str) -> Result<T> {
    Err(Error::IllegalArgument(msg))
}
