use std::collections::HashMap;

/// Releases out-of-order results strictly by frame index.
///
/// Parallel workers finish frames in any order but the stream encodes order
/// only by position, so the writer drains this buffer instead of writing
/// frames as they arrive.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    next_id: u64,
    pending: HashMap<u64, T>,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: HashMap::new(),
        }
    }

    pub fn push(&mut self, id: u64, item: T) {
        self.pending.insert(id, item);
    }

    /// Next item in sequence, if it has arrived.
    pub fn pop_ready(&mut self) -> Option<T> {
        let item = self.pending.remove(&self.next_id)?;
        self.next_id += 1;
        Some(item)
    }

    /// Id of the next frame to be released.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Frames held back waiting for an earlier one.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
