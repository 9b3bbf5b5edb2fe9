//! `strmdec` is the decode/encode core for PlayStation 1 interleaved
//! video bitstreams (STR v2/v3, Iki, Lain, Crusader): the video decoding
//! pipeline that turns a demuxed bitstream into decoded pixels and back,
//! plus the A/V synchronization engine that keeps sector-timed audio and
//! frame-timed video aligned when muxing to AVI or playing live.
//!
//! File-format byte layouts (AVI containers, JPEG Huffman tables, PNG,
//! WAV), CD sector parsing, disc discovery, and the frontend are all
//! external collaborators; this crate consumes them through the narrow
//! interfaces in [`external`].

pub mod bitio;
pub mod codec;
pub mod config;
pub mod driver;
pub mod errors;
pub mod external;
pub mod mdec;
pub mod mdec_code;
pub mod pipeline;
pub mod pool;
pub mod sync;

/// This crate's result type: `errors::Error` on the `Err` side
/// everywhere a fallible operation is exposed.
pub type Result<T> = std::result::Result<T, errors::Error>;

/// Propagates a `Result` out of a function returning `Option<Result<T>>`:
/// `None` passes through unchanged, `Some(Err(e))` returns early with
/// `Some(Err(e))`, and `Some(Ok(v))` unwraps to `v`. Used where a
/// decoder step can legitimately report "nothing to do" (end of stream,
/// no frame completed yet) distinctly from an error.
#[macro_export]
macro_rules! otry {
    ($e:expr) => {
        match $e {
            Some(Ok(v)) => v,
            Some(Err(e)) => return Some(Err(e)),
            None => return None,
        }
    };
}
