use super::types::InspectReport;
use super::utils::draw_rect;
use crate::error::{FactoryError, Result};
use crate::stream::FrameReader;
use std::io::Read;
use tracing::debug;

/// Replays a rectangle stream onto a `width` x `height` canvas and reports
/// what a player would see.
pub fn inspect_stream<R: Read>(source: R, width: usize, height: usize) -> Result<InspectReport> {
    if width == 0 || height == 0 {
        return Err(FactoryError::InvalidDimensions {
            width,
            height,
            len: 0,
        });
    }

    let mut report = InspectReport {
        width,
        height,
        ..InspectReport::default()
    };
    let mut hits = vec![0u8; width * height];

    for (frame_idx, frame) in FrameReader::new(source).enumerate() {
        let rects = frame?;
        let frame_idx = frame_idx as u64;

        hits.fill(0);
        for rect in &rects {
            if !draw_rect(&mut hits, width, height, rect) {
                report.out_of_bounds += 1;
            }
        }

        report.frames += 1;
        report.total_rects += rects.len() as u64;
        report.ink_pixels += hits.iter().filter(|&&h| h > 0).count() as u64;
        report.overlapping_pixels += hits.iter().filter(|&&h| h > 1).count() as u64;

        if report.busiest_frame.is_none() || rects.len() > report.max_rects {
            report.max_rects = rects.len();
            report.busiest_frame = Some(frame_idx);
        }
    }

    debug!(
        frames = report.frames,
        rects = report.total_rects,
        "stream inspected"
    );
    Ok(report)
}
