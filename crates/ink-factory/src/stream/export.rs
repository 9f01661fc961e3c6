//! Human-readable dump of the same data as the binary stream:
//! a list of frames, each a list of `[x, y, w, h]`.

use crate::error::Result;
use crate::tiler::Frame;
use std::io::{Read, Write};

pub fn write_json<W: Write>(sink: W, frames: &[Frame]) -> Result<()> {
    serde_json::to_writer(sink, frames)?;
    Ok(())
}

pub fn read_json<R: Read>(source: R) -> Result<Vec<Frame>> {
    Ok(serde_json::from_reader(source)?)
}
