#![forbid(unsafe_code)]

//! Fragmented-container (ISO base media) introspection.
//!
//! Pure, side-effect-free parsing over box-structured byte buffers: sibling
//! walks, nested lookups, and the timing queries the binding layer needs to
//! schedule appended media (track timescale, fragment decode time, fragment
//! duration).
//!
//! Structurally incomplete or version-unrecognized input yields "not found",
//! never an error — with one exception: a zero-sized box encountered during
//! a collect-all sibling walk would pin the walk in place forever, so it
//! aborts the whole query with [`Mp4Error::ZeroSizedBox`].

mod boxes;
mod timing;

use thiserror::Error;

pub use boxes::{
    BoxSpan, MDHD, MDIA, MOOF, MOOV, TFDT, TFHD, TRAF, TRAK, TRUN, UUID, boxes_named, find_box,
    find_box_path, fourcc,
};
pub use timing::{fragment_decode_time, fragment_duration, track_timescale};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Mp4Error {
    /// A zero-sized box at the head of a non-empty remainder during a
    /// sibling walk; advancing past it is impossible.
    #[error("zero-sized box in sibling walk")]
    ZeroSizedBox,
}

pub type Mp4Result<T> = Result<T, Mp4Error>;
