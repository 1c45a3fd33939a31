//! Bulk element ingestion (`spec.md` C6 "Builder").
//!
//! A [`RopeBuilder`] owns a growing *prefix* rope, a bounded buffer of
//! not-yet-folded *tail* elements (the "partially-filled leaf" the spec
//! names), and an optional *suffix* rope held unchanged until
//! `finalize`. Pushed elements accumulate in the tail buffer and only
//! get woven into the prefix in batches, so the common case of pushing
//! everything up front and finalizing once still costs one
//! [`super::Rope::from_elements`] bulk load rather than many small
//! rebalances — the spec's `O(n/B · log B)` bound. The two
//! grapheme-breaker edge states the spec also names are BigString-level
//! concerns the builder never touches directly: `Element` carries no
//! notion of segmenter state, so resyncing the suffix against whatever
//! context the caller pushed is left to `finalize_with` and driven from
//! `crate::bigstring`.

use super::{Element, Rope, MAX_NODE_SIZE};

/// Number of buffered elements a [`RopeBuilder`] holds before folding
/// them into the prefix rope. A handful of node widths keeps each fold
/// a meaningfully sized bulk load without holding the whole input in
/// memory as a flat `Vec`.
const FLUSH_THRESHOLD: usize = 4 * MAX_NODE_SIZE;

/// Accumulates elements for a single rope build, optionally splicing
/// the result onto a held suffix.
pub struct RopeBuilder<E: Element> {
    prefix: Rope<E>,
    committed: usize,
    tail: Vec<E>,
    suffix: Rope<E>,
}

impl<E: Element> Default for RopeBuilder<E> {
    fn default() -> Self {
        RopeBuilder::new()
    }
}

impl<E: Element> RopeBuilder<E> {
    pub fn new() -> Self {
        RopeBuilder { prefix: Rope::new(), committed: 0, tail: Vec::new(), suffix: Rope::new() }
    }

    /// A builder whose `finalize` concatenates the growing prefix onto
    /// `suffix`, the right rope held unchanged (`spec.md` §4.6: "a
    /// suffix — a right rope held unchanged").
    pub fn new_with_suffix(suffix: Rope<E>) -> Self {
        RopeBuilder { prefix: Rope::new(), committed: 0, tail: Vec::new(), suffix }
    }

    pub fn push(&mut self, element: E) {
        self.tail.push(element);
        if self.tail.len() >= FLUSH_THRESHOLD {
            self.flush();
        }
    }

    pub fn push_all(&mut self, elements: impl IntoIterator<Item = E>) {
        for element in elements {
            self.push(element);
        }
    }

    pub fn len(&self) -> usize {
        self.committed + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Folds the buffered tail into the prefix rope as one bulk load.
    fn flush(&mut self) {
        if self.tail.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.tail);
        self.committed += batch.len();
        log::debug!("RopeBuilder::flush: folding {} elements into the prefix", batch.len());
        let prefix = std::mem::replace(&mut self.prefix, Rope::new());
        self.prefix = prefix.concat(Rope::from_elements(batch));
    }

    pub fn finalize(self) -> Rope<E> {
        self.finalize_with(|suffix| suffix)
    }

    /// Like [`RopeBuilder::finalize`], but first passes the held suffix
    /// through `resync` — e.g. to recompute grapheme-cluster edge
    /// counts at the new seam — before concatenating it onto the
    /// prefix.
    pub fn finalize_with(mut self, resync: impl FnOnce(Rope<E>) -> Rope<E>) -> Rope<E> {
        self.flush();
        log::debug!("RopeBuilder::finalize: {} elements committed", self.committed);
        let suffix = resync(self.suffix);
        if suffix.is_empty() {
            self.prefix
        } else {
            self.prefix.concat(suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigstring::chunk::{metric_utf8, Chunk};
    use crate::bigstring::grapheme::GraphemeBreaker;

    fn chunk(s: &str, state: &GraphemeBreaker) -> (Chunk, GraphemeBreaker) {
        Chunk::new(s, state)
    }

    #[test]
    fn finalize_builds_rope_with_all_pushed_elements() {
        let mut builder: RopeBuilder<Chunk> = RopeBuilder::new();
        let mut state = GraphemeBreaker::new();
        for word in ["abc", "def", "ghi"] {
            let (c, next) = chunk(word, &state);
            state = next;
            builder.push(c);
        }
        let rope = builder.finalize();
        assert_eq!(rope.measure(metric_utf8), 9);
    }

    #[test]
    fn flush_fires_mid_stream_without_losing_elements() {
        let mut builder: RopeBuilder<Chunk> = RopeBuilder::new();
        let mut state = GraphemeBreaker::new();
        let words: Vec<String> = (0..200).map(|i| format!("w{i}")).collect();
        for word in &words {
            let (c, next) = chunk(word, &state);
            state = next;
            builder.push(c);
        }
        assert_eq!(builder.len(), 200);
        let rope = builder.finalize();
        let expected: u64 = words.iter().map(|w| w.len() as u64).sum();
        assert_eq!(rope.measure(metric_utf8), expected);
    }

    #[test]
    fn held_suffix_is_appended_on_finalize() {
        let mut state = GraphemeBreaker::new();
        let (prefix_chunk, next) = chunk("abc", &state);
        state = next;
        let (suffix_chunk, _) = chunk("xyz", &state);
        let suffix = Rope::from_elements(vec![suffix_chunk]);

        let mut builder: RopeBuilder<Chunk> = RopeBuilder::new_with_suffix(suffix);
        builder.push(prefix_chunk);
        let rope = builder.finalize();
        assert_eq!(rope.measure(metric_utf8), 6);
    }

    #[test]
    fn finalize_with_transforms_suffix_before_concatenating() {
        let mut state = GraphemeBreaker::new();
        let (prefix_chunk, next) = chunk("abc", &state);
        state = next;
        let (suffix_chunk, _) = chunk("xyz", &state);
        let suffix = Rope::from_elements(vec![suffix_chunk]);

        let mut builder: RopeBuilder<Chunk> = RopeBuilder::new_with_suffix(suffix);
        builder.push(prefix_chunk);
        let rope = builder.finalize_with(|s| {
            let mut elements = s.into_elements();
            elements.truncate(0);
            Rope::from_elements(elements)
        });
        assert_eq!(rope.measure(metric_utf8), 3);
    }
}
