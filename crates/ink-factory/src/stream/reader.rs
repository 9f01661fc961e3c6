use crate::error::{FactoryError, Result};
use ink_core::{PixelRect, RECORD_SIZE};
use std::io::Read;

/// Splits a rectangle stream back into frames.
///
/// Yields one `Vec<PixelRect>` per sentinel. Iteration stops after the first
/// error.
pub struct FrameReader<R: Read> {
    source: R,
    record: Vec<u8>,
    records_read: u64,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            record: Vec::with_capacity(RECORD_SIZE),
            records_read: 0,
            done: false,
        }
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    fn read_record(&mut self) -> Result<Option<PixelRect>> {
        self.record.clear();
        let filled = self
            .source
            .by_ref()
            .take(RECORD_SIZE as u64)
            .read_to_end(&mut self.record)?;

        match filled {
            0 => Ok(None),
            RECORD_SIZE => Ok(Some(PixelRect::read_from(self.record.as_slice())?)),
            partial => Err(FactoryError::TruncatedRecord(partial)),
        }
    }

    fn next_frame(&mut self) -> Result<Option<Vec<PixelRect>>> {
        let mut frame = Vec::new();
        loop {
            let Some(record) = self.read_record()? else {
                if frame.is_empty() {
                    return Ok(None);
                }
                return Err(FactoryError::UnterminatedFrame(frame.len()));
            };

            let index = self.records_read;
            self.records_read += 1;

            if record.is_frame_end() {
                return Ok(Some(frame));
            }
            if record.w == 0 || record.h == 0 {
                return Err(FactoryError::MalformedRecord { index, record });
            }
            frame.push(record);
        }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Vec<PixelRect>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Parses a whole in-memory stream.
pub fn read_frames(bytes: &[u8]) -> Result<Vec<Vec<PixelRect>>> {
    FrameReader::new(bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rects: &[[u16; 4]]) -> Vec<u8> {
        rects
            .iter()
            .flat_map(|&r| PixelRect::from(r).to_le_bytes())
            .collect()
    }

    #[test]
    fn splits_on_sentinels() {
        let bytes = records(&[[0, 0, 2, 2], [2, 2, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let frames = read_frames(&bytes).unwrap();
        assert_eq!(
            frames,
            vec![
                vec![PixelRect::new(0, 0, 2, 2), PixelRect::new(2, 2, 1, 1)],
                vec![],
            ]
        );
    }

    #[test]
    fn empty_stream_has_no_frames() {
        assert!(read_frames(&[]).unwrap().is_empty());
    }

    #[test]
    fn partial_record_is_truncated() {
        let mut bytes = records(&[[1, 1, 1, 1], [0, 0, 0, 0]]);
        bytes.extend_from_slice(&[7, 0, 7]);
        let mut reader = FrameReader::new(bytes.as_slice());
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next(),
            Some(Err(FactoryError::TruncatedRecord(3)))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn missing_final_sentinel() {
        let bytes = records(&[[1, 1, 1, 1], [0, 0, 0, 0], [4, 4, 2, 2]]);
        let err = read_frames(&bytes).unwrap_err();
        assert!(matches!(err, FactoryError::UnterminatedFrame(1)));
    }

    #[test]
    fn half_empty_record_is_malformed() {
        let bytes = records(&[[1, 1, 1, 1], [5, 0, 3, 0], [0, 0, 0, 0]]);
        let err = read_frames(&bytes).unwrap_err();
        assert!(matches!(err, FactoryError::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn counts_records() {
        let bytes = records(&[[1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut reader = FrameReader::new(bytes.as_slice());
        assert_eq!(reader.by_ref().count(), 2);
        assert_eq!(reader.records_read(), 3);
    }

    /// Hands out at most one byte per `read` call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some((&first, rest)) = self.0.split_first() else {
                return Ok(0);
            };
            match buf.first_mut() {
                Some(slot) => {
                    *slot = first;
                    self.0 = rest;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn short_reads_are_reassembled_into_records() {
        let bytes = records(&[[0x0102, 3, 0x0405, 6], [0, 0, 0, 0]]);
        let frames: Vec<_> = FrameReader::new(Trickle(&bytes))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames, vec![vec![PixelRect::new(0x0102, 3, 0x0405, 6)]]);

        let mut reader = FrameReader::new(Trickle(&bytes[..13]));
        assert!(matches!(
            reader.next(),
            Some(Err(FactoryError::TruncatedRecord(5)))
        ));
    }
}
