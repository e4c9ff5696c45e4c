use std::collections::HashMap;

/// Best-known text per transcription segment for one participant.
///
/// Transcription providers re-send a segment several times while it is
/// provisional; the id stays stable while the text grows or gets corrected.
/// The store keeps one entry per id and latches the text once a final
/// observation arrives.
///
/// When a provider omits the segment id, the caller passes a stream-level
/// fallback key instead, and dedup degrades to arrival order. That is an
/// accepted approximation, not an error.
#[derive(Debug, Default)]
pub struct SegmentStore {
    order: Vec<String>,
    segments: HashMap<String, StoredSegment>,
}

#[derive(Debug)]
struct StoredSegment {
    text: String,
    is_final: bool,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates a segment observation.
    ///
    /// A segment already observed as final keeps its text; otherwise the
    /// latest provisional text wins and `is_final` latches finality.
    pub fn observe(&mut self, id: &str, text: &str, is_final: bool) {
        match self.segments.get_mut(id) {
            Some(stored) => {
                if stored.is_final {
                    return;
                }
                stored.text = text.to_string();
                stored.is_final = is_final;
            }
            None => {
                self.order.push(id.to_string());
                self.segments.insert(
                    id.to_string(),
                    StoredSegment {
                        text: text.to_string(),
                        is_final,
                    },
                );
            }
        }
    }

    /// Segment texts in first-seen order. Pure read.
    pub fn snapshot(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|id| self.segments.get(id))
            .map(|segment| segment.text.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_provisional_text_wins() {
        let mut store = SegmentStore::new();
        store.observe("seg-1", "book", false);
        store.observe("seg-1", "book a", false);
        store.observe("seg-1", "book a flight", false);

        assert_eq!(store.snapshot(), vec!["book a flight"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn final_text_is_immutable() {
        let mut store = SegmentStore::new();
        store.observe("seg-1", "a flight", true);
        store.observe("seg-1", "a fright", false);
        store.observe("seg-1", "a freight", true);

        assert_eq!(store.snapshot(), vec!["a flight"]);
    }

    #[test]
    fn finality_latches_from_provisional_updates() {
        let mut store = SegmentStore::new();
        store.observe("seg-1", "hello", false);
        store.observe("seg-1", "hello there", true);
        store.observe("seg-1", "hullo", false);

        assert_eq!(store.snapshot(), vec!["hello there"]);
    }

    #[test]
    fn snapshot_preserves_first_seen_order() {
        let mut store = SegmentStore::new();
        store.observe("b", "second", false);
        store.observe("a", "first", false);
        store.observe("b", "second corrected", true);

        assert_eq!(store.snapshot(), vec!["second corrected", "first"]);
    }

    #[test]
    fn clear_resets_order_and_contents() {
        let mut store = SegmentStore::new();
        store.observe("a", "one", true);
        assert!(!store.is_empty());

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.snapshot().is_empty());
    }
}
