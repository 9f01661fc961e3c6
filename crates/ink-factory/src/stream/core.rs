use crate::error::{FactoryError, Result};
use crate::tiler::Rect;
use byteorder::{LittleEndian, WriteBytesExt};
use ink_core::{PixelRect, RECORD_SIZE};
use std::io::Write;

/// Appends frames to a byte sink in the rectangle stream format.
///
/// Each frame is its rectangles as `(x, y, w, h)` little-endian `u16`
/// records followed by one all-zero sentinel record. There is no header and
/// no frame count; readers split on sentinels.
pub struct FrameWriter<W: Write> {
    sink: W,
    frames_written: u64,
    records_written: u64,
    scratch: Vec<u8>,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            frames_written: 0,
            records_written: 0,
            scratch: Vec::new(),
        }
    }

    /// Validates and appends one frame.
    ///
    /// Nothing is written when any rectangle is empty or does not fit in 16
    /// bits.
    pub fn write_frame(&mut self, rects: &[Rect]) -> Result<()> {
        self.scratch.clear();
        self.scratch.reserve((rects.len() + 1) * RECORD_SIZE);

        for rect in rects {
            if rect.w == 0 || rect.h == 0 {
                return Err(FactoryError::EmptyRect {
                    x: rect.x,
                    y: rect.y,
                });
            }
            push_record(&mut self.scratch, rect.to_pixel_rect()?)?;
        }
        push_record(&mut self.scratch, PixelRect::EOS_MARKER)?;

        self.sink.write_all(&self.scratch)?;

        self.frames_written += 1;
        self.records_written += rects.len() as u64 + 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Rectangles plus sentinels written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

fn push_record(buf: &mut Vec<u8>, record: PixelRect) -> std::io::Result<()> {
    buf.write_u16::<LittleEndian>(record.x)?;
    buf.write_u16::<LittleEndian>(record.y)?;
    buf.write_u16::<LittleEndian>(record.w)?;
    buf.write_u16::<LittleEndian>(record.h)
}

/// Appends every frame in order and flushes the sink.
pub fn write_frames<W, F>(sink: W, frames: &[F]) -> Result<W>
where
    W: Write,
    F: AsRef<[Rect]>,
{
    let mut writer = FrameWriter::new(sink);
    for frame in frames {
        writer.write_frame(frame.as_ref())?;
    }
    writer.into_inner()
}
