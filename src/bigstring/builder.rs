//! Splicing new text into an existing rope (`spec.md` §4.7
//! `replaceSubrange`, steps 2-3).
//!
//! [`SpliceBuilder`] is the BigString-level counterpart to
//! [`crate::rope::RopeBuilder`]'s generic prefix/suffix machinery: it
//! drives the generic builder with [`Chunk`]s the way [`super::ingest`]
//! does, but seeds it with the real [`GraphemeBreaker`] state trailing
//! off the rope content that will stay to the left of the edit, and
//! resyncs the held suffix's leading chunks against that state on
//! `finalize` instead of leaving them as `Chunk::split`'s blank-context
//! guess. This is the "two external states" the spec's Builder
//! paragraph names — carried here, not inside the generic rope builder,
//! since `Element` has no notion of segmenter state.

use super::chunk::{self, Chunk};
use super::grapheme::GraphemeBreaker;
use crate::rope::{Rope, RopeBuilder};

/// The breaker state trailing off the last character-producing chunk of
/// `rope`, found by walking backward over leaves still fully consumed
/// by an open cluster (the same cross-leaf scan `round_down_character`
/// needs, run from the other end).
pub(super) fn trailing_breaker_state(rope: &Rope<Chunk>) -> GraphemeBreaker {
    let total = rope.measure(chunk::metric_utf8);
    if total == 0 {
        return GraphemeBreaker::new();
    }
    let mut tail = String::new();
    let mut probe = total;
    loop {
        let cur = rope.cursor_at(chunk::metric_utf8, probe - 1);
        let leaf_start = cur.start(chunk::metric_utf8);
        let c = cur.element();
        if c.last_break() < c.utf8_len() {
            tail = format!("{}{tail}", &c.text()[c.last_break()..]);
            break;
        }
        tail = format!("{}{tail}", c.text());
        if leaf_start == 0 {
            break;
        }
        probe = leaf_start;
    }
    GraphemeBreaker::from_tail(tail)
}

/// Resyncs `suffix`'s leading run of still-open chunks against `state`
/// (the breaker state carried out of whatever now precedes it), leaving
/// every chunk after the first one that terminates a cluster untouched.
fn resync_leading_chunks(suffix: Rope<Chunk>, mut state: GraphemeBreaker) -> Rope<Chunk> {
    let mut chunks = suffix.into_elements();
    for c in chunks.iter_mut() {
        let len = c.utf8_len();
        state = c.resync_breaks(&state);
        if c.last_break() < len {
            break;
        }
    }
    Rope::from_elements(chunks)
}

/// Builds the replacement middle of a `replace_subrange` edit, seeded
/// with the left context's trailing breaker state and holding the
/// right-hand rope to be resynced and concatenated on `finalize`.
pub(super) struct SpliceBuilder {
    inner: RopeBuilder<Chunk>,
    state: GraphemeBreaker,
}

impl SpliceBuilder {
    pub(super) fn new(left_state: GraphemeBreaker, suffix: Rope<Chunk>) -> Self {
        SpliceBuilder { inner: RopeBuilder::new_with_suffix(suffix), state: left_state }
    }

    pub(super) fn push_str(&mut self, text: &str) {
        let mut rest = text;
        while !rest.is_empty() {
            let mut boundary = chunk::MAX_UTF8.min(rest.len());
            while boundary > 0 && !rest.is_char_boundary(boundary) {
                boundary -= 1;
            }
            if boundary == 0 {
                boundary = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(rest.len());
            }
            let (piece, remainder) = rest.split_at(boundary);
            let (c, next_state) = Chunk::new(piece, &self.state);
            self.state = next_state;
            self.inner.push(c);
            rest = remainder;
        }
    }

    pub(super) fn finalize(self) -> Rope<Chunk> {
        let state = self.state;
        self.inner.finalize_with(|suffix| resync_leading_chunks(suffix, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rope_of(text: &str) -> Rope<Chunk> {
        let mut builder: RopeBuilder<Chunk> = RopeBuilder::new();
        let mut state = GraphemeBreaker::new();
        let mut rest = text;
        while !rest.is_empty() {
            let n = chunk::MAX_UTF8.min(rest.len());
            let boundary = (0..=n).rev().find(|&b| rest.is_char_boundary(b)).unwrap();
            let (piece, remainder) = rest.split_at(boundary);
            let (c, next) = Chunk::new(piece, &state);
            state = next;
            builder.push(c);
            rest = remainder;
        }
        builder.finalize()
    }

    #[test]
    fn trailing_state_is_empty_after_a_clean_break() {
        let rope = rope_of("abc");
        let state = trailing_breaker_state(&rope);
        assert_eq!(GraphemeBreaker::edge_counts(&state, "def").characters, 3);
    }

    #[test]
    fn splice_resyncs_straddling_cluster_at_new_seam() {
        // Left ends on a bare "e"; the suffix starts with a combining
        // mark that must fuse with it once the two are joined, even
        // though the suffix rope was built with no knowledge of "e".
        let left = rope_of("e");
        let right = rope_of("\u{0301}cd"); // combining mark continues "e" once joined
        let left_state = trailing_breaker_state(&left);
        let mut builder = SpliceBuilder::new(left_state, right);
        builder.push_str("");
        let spliced = builder.finalize();
        let joined = left.concat(spliced);
        // "e" + combining mark fuse into one cluster, then "c", "d".
        assert_eq!(joined.measure(chunk::metric_characters), 3);
        assert_eq!(joined.measure(chunk::metric_utf8), 5);
    }
}
