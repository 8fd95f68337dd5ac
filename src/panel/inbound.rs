//! Temporary buffer for entries produced outside a submission.

use super::entry::TranscriptEntry;

/// Ordered entries waiting to be drained into the transcript.
#[derive(Debug, Default, Clone)]
pub struct InboundBuffer {
    entries: Vec<TranscriptEntry>,
}

impl InboundBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue entries behind anything already buffered.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = TranscriptEntry>) {
        self.entries.extend(entries);
    }

    /// Take every buffered entry, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<TranscriptEntry> {
        std::mem::take(&mut self.entries)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::entry::EntryIdGenerator;

    #[test]
    fn test_drain_empties_and_preserves_order() {
        let ids = EntryIdGenerator::new();
        let mut buffer = InboundBuffer::new();
        let a = TranscriptEntry::user(ids.next_id(), "a");
        let b = TranscriptEntry::user(ids.next_id(), "b");
        buffer.extend([a.clone()]);
        buffer.extend([b.clone()]);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.drain(), vec![a, b]);
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_empty());
    }
}
