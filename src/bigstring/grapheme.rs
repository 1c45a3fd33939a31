//! Streaming extended-grapheme-cluster segmenter (`spec.md` C5).
//!
//! A [`GraphemeBreaker`] is a reified piece of segmenter state carried
//! between adjacent chunks: the byte suffix of the previous chunk that
//! might still combine with whatever comes next (an unterminated
//! combining-mark run, a half-finished regional-indicator pair, a ZWJ
//! emoji sequence). Resyncing a chunk only ever needs this bounded left
//! context plus the chunk's own text — never a look-ahead into the
//! chunk after it — because "characters" counts clusters that *start*
//! in a chunk, and a cluster's start boundary is decided by what comes
//! before it, not by where it ends.
//!
//! This mirrors the seam-fixing idea in
//! `examples/other_examples/…ropey…/src/node.rs` (`fix_grapheme_seam`),
//! generalized into a value that chunk construction and the rope
//! builder can both drive incrementally instead of only patching a
//! single left/right pair at a time.

use unicode_segmentation::GraphemeCursor;

/// Segmenter state carried across a chunk boundary.
///
/// Holds the as-yet-unterminated tail of the previous chunk: empty if
/// the previous chunk ended exactly on a grapheme boundary.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct GraphemeBreaker {
    tail: String,
}

/// Per-chunk edge counts produced by [`GraphemeBreaker::edge_counts`].
pub struct EdgeCounts {
    /// Byte offset of the first grapheme boundary at or after position 0.
    pub first_break: usize,
    /// Byte offset of the last grapheme boundary reachable without
    /// crossing into the next chunk; equals `first_break` (and the
    /// chunk's length) when no character starts in this chunk.
    pub last_break: usize,
    /// Number of grapheme clusters that *start* in this chunk.
    pub characters: u64,
    /// State to feed into the next chunk's `edge_counts` call.
    pub next: GraphemeBreaker,
}

impl GraphemeBreaker {
    pub const fn new() -> Self {
        GraphemeBreaker { tail: String::new() }
    }

    /// Reconstructs the breaker state implied by `tail` alone — used to
    /// resume threading from an existing rope's trailing context (see
    /// `bigstring::builder::trailing_breaker_state`).
    pub(crate) fn from_tail(tail: String) -> Self {
        GraphemeBreaker { tail }
    }

    /// Advances state across `prefix` without emitting break
    /// information — used when a builder pushes text that isn't yet
    /// being turned into a finished chunk.
    pub fn consume_partial_character(&mut self, prefix: &str) {
        self.tail.push_str(prefix);
    }

    /// The next grapheme boundary within `slice`, given the breaker's
    /// current left-context, or `None` if `slice` is entirely consumed
    /// by a cluster that started before it.
    pub fn first_break(&self, slice: &str) -> Option<usize> {
        let offsets = Self::boundaries_in(&self.tail, slice);
        offsets.first().copied()
    }

    /// Every grapheme-cluster start offset local to `text` (i.e. with
    /// `old`'s tail length already subtracted), including a trailing
    /// marker at `text.len()` representing the forced end-of-text
    /// boundary. Used to walk character-by-character within a chunk
    /// once its edges are already resolved.
    pub fn all_breaks(old: &GraphemeBreaker, text: &str) -> Vec<usize> {
        Self::boundaries_in(&old.tail, text)
    }

    /// Measures one chunk's worth of text in a single pass: returns the
    /// `(characters, firstBreak, lastBreak)` triple plus the state to
    /// carry into the next chunk. Idempotent when called twice with the
    /// same `old` and `text` (no hidden mutation of `old`).
    pub fn edge_counts(old: &GraphemeBreaker, text: &str) -> EdgeCounts {
        let local = Self::boundaries_in(&old.tail, text);
        let first_break = local.first().copied().unwrap_or(text.len());
        let last_break = local
            .iter()
            .rev()
            .find(|&&b| b < text.len())
            .copied()
            .unwrap_or(text.len());
        let characters = if first_break == text.len() {
            0
        } else {
            local.iter().filter(|&&b| b >= first_break && b <= last_break).count() as u64
        };
        let next_tail = if last_break == text.len() {
            // The whole chunk is consumed by a cluster that hasn't
            // terminated yet; carry the old tail forward too.
            let mut tail = old.tail.clone();
            tail.push_str(text);
            tail
        } else {
            text[last_break..].to_string()
        };
        log::trace!(
            "grapheme resync: first_break={} last_break={} characters={} tail_len={}",
            first_break, last_break, characters, next_tail.len()
        );
        EdgeCounts { first_break, last_break, characters, next: GraphemeBreaker { tail: next_tail } }
    }

    /// Byte offsets (local to `text`, i.e. with `tail.len()` already
    /// subtracted) of every grapheme-cluster start reachable by
    /// scanning `tail + text` with full left context. Always ends with
    /// `text.len()` itself (the combined string's end is a forced
    /// boundary, which callers must not mistake for "a character
    /// starts here" — see the `< text.len()` filters above).
    fn boundaries_in(tail: &str, text: &str) -> Vec<usize> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut combined = String::with_capacity(tail.len() + text.len());
        combined.push_str(tail);
        combined.push_str(text);
        let base = tail.len();
        let total = combined.len();
        let mut cursor = GraphemeCursor::new(0, total, true);
        let mut out = Vec::new();
        // `next_boundary` only ever reports boundaries strictly after the
        // cursor's starting offset (0), so when there is no carried-over
        // tail, position 0 itself — trivially a boundary, since nothing
        // precedes it — would otherwise never be recorded.
        if base == 0 {
            out.push(0);
        }
        loop {
            match cursor.next_boundary(&combined, 0) {
                Ok(Some(b)) => {
                    if b > base {
                        out.push(b - base);
                    } else if b == base {
                        out.push(0);
                    }
                    if b >= total {
                        break;
                    }
                }
                Ok(None) => break,
                // We always hand the cursor the whole combined string
                // in one piece, so it never needs more context than we
                // gave it.
                Err(_) => break,
            }
        }
        out
    }
}
