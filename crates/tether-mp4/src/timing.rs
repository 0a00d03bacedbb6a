//! Timing queries over fragmented-container buffers.

use crate::{
    Mp4Result,
    boxes::{
        BoxSpan, MDHD, MDIA, MOOF, MOOV, TFDT, TFHD, TRAF, TRAK, TRUN, be_u24, be_u32, be_u64,
        boxes_named, find_box, find_box_path,
    },
};

const TRUN_DATA_OFFSET: u32 = 0x0000_0001;
const TRUN_FIRST_SAMPLE_FLAGS: u32 = 0x0000_0004;
const TRUN_SAMPLE_DURATION: u32 = 0x0000_0100;
const TRUN_SAMPLE_SIZE: u32 = 0x0000_0200;
const TRUN_SAMPLE_FLAGS: u32 = 0x0000_0400;
const TRUN_SAMPLE_COMPOSITION_OFFSET: u32 = 0x0000_0800;

const TFHD_BASE_DATA_OFFSET: u32 = 0x0000_0001;
const TFHD_SAMPLE_DESCRIPTION_INDEX: u32 = 0x0000_0002;
const TFHD_DEFAULT_SAMPLE_DURATION: u32 = 0x0000_0008;

fn content_of<'a>(buf: &'a [u8], span: &BoxSpan) -> &'a [u8] {
    &buf[span.content..span.end]
}

/// Timescale of the first track, from `moov → trak → mdia → mdhd`.
///
/// `None` for absent/incomplete structure or an unknown header version.
#[must_use]
pub fn track_timescale(buf: &[u8]) -> Option<u32> {
    let mdhd = find_box_path(buf, &[MOOV, TRAK, MDIA, MDHD])?;
    let content = content_of(buf, &mdhd);
    match content.first()? {
        0 => be_u32(content, 8),
        1 => be_u32(content, 16),
        _ => None,
    }
}

/// Decode time of the first fragment, from the first `moof → traf → tfdt`.
#[must_use]
pub fn fragment_decode_time(buf: &[u8]) -> Option<u64> {
    let tfdt = find_box_path(buf, &[MOOF, TRAF, TFDT])?;
    let content = content_of(buf, &tfdt);
    match content.first()? {
        0 => be_u32(content, 4).map(u64::from),
        1 => be_u64(content, 4),
        _ => None,
    }
}

/// Total duration of every fragment in the buffer, in track timescale units.
///
/// Sums per-sample durations across all samples of all `traf` boxes of all
/// `moof`s. Any `traf` without a usable `trun` (or without a `tfhd` default
/// when per-sample durations are absent) fails the whole query with
/// `Ok(None)` rather than returning a partial sum.
///
/// # Errors
///
/// [`Mp4Error::ZeroSizedBox`](crate::Mp4Error::ZeroSizedBox) from the
/// sibling walks.
pub fn fragment_duration(buf: &[u8]) -> Mp4Result<Option<u64>> {
    let mut total: u64 = 0;
    let mut trafs_seen = false;
    for moof in boxes_named(buf, MOOF)? {
        let moof_content = content_of(buf, &moof);
        for traf in boxes_named(moof_content, TRAF)? {
            trafs_seen = true;
            let Some(duration) = traf_duration(content_of(moof_content, &traf)) else {
                return Ok(None);
            };
            total = total.saturating_add(duration);
        }
    }
    Ok(if trafs_seen { Some(total) } else { None })
}

/// Duration described by one `traf`'s `trun`, falling back to the sibling
/// `tfhd` default-sample-duration when the per-sample flag is unset.
fn traf_duration(traf: &[u8]) -> Option<u64> {
    let trun = find_box(traf, TRUN)?;
    let content = content_of(traf, &trun);
    let version = *content.first()?;
    if version > 1 {
        return None;
    }
    let flags = be_u24(content, 1)?;

    let mut cursor = 4usize;
    if flags & TRUN_DATA_OFFSET != 0 {
        cursor += 4;
    }
    if flags & TRUN_FIRST_SAMPLE_FLAGS != 0 {
        cursor += 4;
    }
    let sample_count = be_u32(content, cursor)?;
    cursor += 4;

    let per_sample_duration = flags & TRUN_SAMPLE_DURATION != 0;
    let default_duration = if per_sample_duration {
        None
    } else {
        Some(tfhd_default_duration(traf)?)
    };

    let mut entry_size = 0usize;
    if per_sample_duration {
        entry_size += 4;
    }
    if flags & TRUN_SAMPLE_SIZE != 0 {
        entry_size += 4;
    }
    if flags & TRUN_SAMPLE_FLAGS != 0 {
        entry_size += 4;
    }
    if flags & TRUN_SAMPLE_COMPOSITION_OFFSET != 0 {
        entry_size += 4;
    }
    let needed = (sample_count as usize).checked_mul(entry_size)?;
    if cursor.checked_add(needed)? > content.len() {
        return None;
    }

    let mut total: u64 = 0;
    for _ in 0..sample_count {
        let duration = if per_sample_duration {
            let duration = be_u32(content, cursor)?;
            u64::from(duration)
        } else {
            u64::from(default_duration?)
        };
        total = total.saturating_add(duration);
        cursor += entry_size;
    }
    Some(total)
}

fn tfhd_default_duration(traf: &[u8]) -> Option<u32> {
    let tfhd = find_box(traf, TFHD)?;
    let content = content_of(traf, &tfhd);
    let flags = be_u24(content, 1)?;
    if flags & TFHD_DEFAULT_SAMPLE_DURATION == 0 {
        return None;
    }
    let mut cursor = 8usize; // version/flags + track id
    if flags & TFHD_BASE_DATA_OFFSET != 0 {
        cursor += 8;
    }
    if flags & TFHD_SAMPLE_DESCRIPTION_INDEX != 0 {
        cursor += 4;
    }
    be_u32(content, cursor)
}
