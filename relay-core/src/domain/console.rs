//! Console output types

/// One slice of a build's console log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleChunk {
    pub text: String,
    /// Offset to request the next slice from
    pub next_offset: u64,
    /// Whether the server holds more text beyond `next_offset`
    pub has_more: bool,
}

/// Position in a build's console stream
///
/// Starts at the stream origin and only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCursor {
    offset: u64,
    has_more: bool,
}

impl OutputCursor {
    pub fn new() -> Self {
        Self {
            offset: 0,
            has_more: true,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Move past a fetched chunk
    ///
    /// An offset behind the current one is ignored so the cursor never rewinds.
    pub fn advance(&mut self, chunk: &ConsoleChunk) {
        self.offset = self.offset.max(chunk.next_offset);
        self.has_more = chunk.has_more;
    }
}

impl Default for OutputCursor {
    fn default() -> Self {
        Self::new()
    }
}
