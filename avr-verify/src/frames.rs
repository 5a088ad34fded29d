//! Frame grouping
//!
//! A frame is the maximal run of consecutive annotation records sharing a
//! video and a rounded video-frame number. Records arrive pre-sorted by
//! `(video_id, time_in_video)`; nothing here re-sorts.

use crate::models::Annotation;
use std::ops::Range;

/// Fixed NTSC drop-frame rate used to turn seconds into frame numbers
pub const FPS: f64 = 29.97002997002997;

/// Unrounded frame position of a timestamp (the value committed to the backend)
pub fn frame_position(time_in_video: f64) -> f64 {
    time_in_video * FPS
}

/// Rounded frame number (round half away from zero)
pub fn frame_number(time_in_video: f64) -> i64 {
    frame_position(time_in_video).round() as i64
}

/// True when both records show the same instant of the same video
pub fn same_frame(a: &Annotation, b: &Annotation) -> bool {
    a.video_id == b.video_id && frame_number(a.time_in_video) == frame_number(b.time_in_video)
}

/// True when `index` is the final record of its frame
///
/// The last element of the list always ends its frame. An out-of-range index
/// is treated as last so callers never read past the end.
pub fn is_last_in_frame(annotations: &[Annotation], index: usize) -> bool {
    match (annotations.get(index), annotations.get(index + 1)) {
        (Some(current), Some(next)) => !same_frame(current, next),
        _ => true,
    }
}

/// Index range of the frame containing `index`
///
/// Returns an empty range when `index` is out of bounds.
pub fn frame_range(annotations: &[Annotation], index: usize) -> Range<usize> {
    let Some(current) = annotations.get(index) else {
        return index..index;
    };

    let mut start = index;
    while start > 0 && same_frame(&annotations[start - 1], current) {
        start -= 1;
    }

    let mut end = index + 1;
    while end < annotations.len() && same_frame(&annotations[end], current) {
        end += 1;
    }

    start..end
}
