use ahash::HashSet;
use derive_getters::Getters;
use derive_more::Constructor;

use crate::BatchError;

/// Work item header. Sequences live in the batch buffers at a fixed stride.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Constructor, Getters)]
pub struct Request {
    pattern_len: usize,
    text_len: usize,
    index: usize,
}

/// Read pairs packed at a fixed stride equal to the maximum read length.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    max_read_len: usize,
    requests: Vec<Request>,
    patterns: Vec<u8>,
    texts: Vec<u8>,
    indices: HashSet<usize>,
}

impl Batch {
    pub fn new(max_read_len: usize) -> Self {
        Self {
            max_read_len,
            ..Default::default()
        }
    }

    /// Appends a read pair. Overlong sequences and repeated indices are rejected and leave the
    /// batch untouched.
    pub fn push(&mut self, index: usize, pattern: &[u8], text: &[u8]) -> Result<(), BatchError> {
        for len in [pattern.len(), text.len()] {
            if len > self.max_read_len {
                return Err(BatchError::Overlength {
                    index,
                    len,
                    max: self.max_read_len,
                });
            }
        }
        if !self.indices.insert(index) {
            return Err(BatchError::DuplicateIndex { index });
        }

        for (buffer, sequence) in [(&mut self.patterns, pattern), (&mut self.texts, text)] {
            let start = buffer.len();
            buffer.resize(start + self.max_read_len, 0);
            buffer[start..start + sequence.len()].copy_from_slice(sequence);
        }
        self.requests
            .push(Request::new(pattern.len(), text.len(), index));
        Ok(())
    }

    pub fn max_read_len(&self) -> usize {
        self.max_read_len
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn pattern(&self, item: usize) -> &[u8] {
        let start = item * self.max_read_len;
        &self.patterns[start..start + self.requests[item].pattern_len]
    }

    pub fn text(&self, item: usize) -> &[u8] {
        let start = item * self.max_read_len;
        &self.texts[start..start + self.requests[item].text_len]
    }

    pub fn clear(&mut self) {
        self.requests.clear();
        self.patterns.clear();
        self.texts.clear();
        self.indices.clear();
    }
}
