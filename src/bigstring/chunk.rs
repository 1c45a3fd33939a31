//! Bounded UTF-8 leaf with precomputed multi-metric counts (`spec.md` C4).
//!
//! A [`Chunk`] never splits a Unicode scalar across its boundary, and
//! its `characters` count follows the "owned by the chunk the cluster
//! *starts* in" rule from `spec.md` §3 — the reason [`super::grapheme`]
//! exists as a separate, resyncable piece of state.

use arrayvec::ArrayString;

use super::grapheme::GraphemeBreaker;
use crate::rope::{Element, Summary};

/// Target maximum UTF-8 byte length of a chunk.
pub const MAX_UTF8: usize = 255;
/// `ceil(MAX_UTF8 / 2)`.
pub const MIN_UTF8: usize = (MAX_UTF8 + 1) / 2;

/// Additive 4-tuple per-subtree annotation: UTF-8 bytes, UTF-16 code
/// units, Unicode scalars, extended grapheme clusters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary4 {
    pub utf8: u64,
    pub utf16: u64,
    pub scalars: u64,
    pub characters: u64,
}

impl Summary for Summary4 {
    fn zero() -> Self {
        Summary4::default()
    }

    fn add(self, other: Self) -> Self {
        Summary4 {
            utf8: self.utf8 + other.utf8,
            utf16: self.utf16 + other.utf16,
            scalars: self.scalars + other.scalars,
            characters: self.characters + other.characters,
        }
    }

    fn sub(self, other: Self) -> Self {
        Summary4 {
            utf8: self.utf8 - other.utf8,
            utf16: self.utf16 - other.utf16,
            scalars: self.scalars - other.scalars,
            characters: self.characters - other.characters,
        }
    }

    fn is_zero(&self) -> bool {
        self.utf8 == 0
    }
}

/// A bounded UTF-8 text leaf.
///
/// Invariant: outside of a singleton tree's sole leaf,
/// `MIN_UTF8 <= text.len() <= MAX_UTF8`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    text: ArrayString<MAX_UTF8>,
    counts: Summary4,
    first_break: u16,
    last_break: u16,
}

impl Chunk {
    /// Builds a chunk from raw text and the breaker state left by the
    /// preceding chunk, returning the chunk and the state to hand to
    /// whatever chunk follows.
    pub fn new(text: &str, old: &GraphemeBreaker) -> (Chunk, GraphemeBreaker) {
        debug_assert!(text.len() <= MAX_UTF8, "Chunk::new: text exceeds MAX_UTF8");
        let edge = GraphemeBreaker::edge_counts(old, text);
        let counts = Summary4 {
            utf8: text.len() as u64,
            utf16: text.encode_utf16().count() as u64,
            scalars: text.chars().count() as u64,
            characters: edge.characters,
        };
        let chunk = Chunk {
            text: ArrayString::from(text).expect("Chunk::new: text exceeds MAX_UTF8 capacity"),
            counts,
            first_break: edge.first_break as u16,
            last_break: edge.last_break as u16,
        };
        (chunk, edge.next)
    }

    /// Recomputes `first_break`/`last_break`/`characters` in place
    /// against a (possibly new) preceding breaker state. Idempotent
    /// when `old == new` relative to a previous call. Used after an
    /// in-place edit that might have shifted the left seam.
    pub fn resync_breaks(&mut self, old: &GraphemeBreaker) -> GraphemeBreaker {
        let edge = GraphemeBreaker::edge_counts(old, self.text.as_str());
        self.first_break = edge.first_break as u16;
        self.last_break = edge.last_break as u16;
        self.counts.characters = edge.characters;
        edge.next
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn counts(&self) -> Summary4 {
        self.counts
    }

    pub fn first_break(&self) -> usize {
        self.first_break as usize
    }

    pub fn last_break(&self) -> usize {
        self.last_break as usize
    }

    pub fn has_breaks(&self) -> bool {
        self.last_break() < self.text.len() || self.first_break() < self.text.len()
    }

    pub fn utf8_len(&self) -> usize {
        self.text.len()
    }

    pub fn is_char_boundary(&self, byte_offset: usize) -> bool {
        self.text.is_char_boundary(byte_offset)
    }

    /// Rounds `byte_offset` down to the nearest scalar boundary.
    pub fn round_down_scalar(&self, byte_offset: usize) -> usize {
        let mut b = byte_offset.min(self.text.len());
        while !self.text.is_char_boundary(b) {
            b -= 1;
        }
        b
    }

    /// Advances one scalar forward from `byte_offset` (must be
    /// scalar-aligned); returns `text.len()` at the end.
    pub fn index_after_scalar(&self, byte_offset: usize) -> usize {
        debug_assert!(self.text.is_char_boundary(byte_offset));
        match self.text[byte_offset..].chars().next() {
            Some(c) => byte_offset + c.len_utf8(),
            None => self.text.len(),
        }
    }

    /// Steps one scalar backward from `byte_offset` (must be
    /// scalar-aligned, `> 0`).
    pub fn index_before_scalar(&self, byte_offset: usize) -> usize {
        debug_assert!(self.text.is_char_boundary(byte_offset));
        debug_assert!(byte_offset > 0);
        let mut b = byte_offset - 1;
        while !self.text.is_char_boundary(b) {
            b -= 1;
        }
        b
    }

    /// Number of scalars in `[a, b)`, both scalar-aligned.
    pub fn scalar_distance(&self, a: usize, b: usize) -> i64 {
        debug_assert!(self.text.is_char_boundary(a) && self.text.is_char_boundary(b));
        if a <= b {
            self.text[a..b].chars().count() as i64
        } else {
            -(self.text[b..a].chars().count() as i64)
        }
    }

    /// Number of UTF-16 code units in `[a, b)`, both scalar-aligned.
    pub fn utf16_distance(&self, a: usize, b: usize) -> i64 {
        debug_assert!(self.text.is_char_boundary(a) && self.text.is_char_boundary(b));
        if a <= b {
            self.text[a..b].encode_utf16().count() as i64
        } else {
            -(self.text[b..a].encode_utf16().count() as i64)
        }
    }

    /// `a - b` in raw bytes.
    pub fn utf8_distance(&self, a: usize, b: usize) -> i64 {
        a as i64 - b as i64
    }

    /// Number of grapheme clusters starting in `[a, b)`; both endpoints
    /// must already be character-aligned (within `[first_break,
    /// last_break]`).
    pub fn character_distance(&self, a: usize, b: usize) -> i64 {
        debug_assert!(a >= self.first_break() && a <= self.last_break());
        debug_assert!(b >= self.first_break() && b <= self.last_break());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let count = self.character_breaks_between(lo, hi) as i64;
        if a <= b { count } else { -count }
    }

    /// Every character-start offset in `[first_break, last_break]`,
    /// local to the whole chunk's byte offsets. Positions strictly
    /// between the edges never depend on what preceded this chunk, so
    /// this is safe to recompute with an empty left context anchored
    /// at `first_break`.
    /// The byte offset of the `idx`-th grapheme cluster that starts in
    /// this chunk (0-based), or `last_break()` if `idx` is out of range.
    pub fn nth_character_break(&self, idx: usize) -> usize {
        self.character_breaks().get(idx).copied().unwrap_or_else(|| self.last_break())
    }

    fn character_breaks(&self) -> Vec<usize> {
        if self.first_break() == self.text.len() {
            return Vec::new();
        }
        GraphemeBreaker::all_breaks(&GraphemeBreaker::new(), &self.text[self.first_break()..])
            .into_iter()
            .map(|b| b + self.first_break())
            .filter(|&b| b <= self.last_break())
            .collect()
    }

    /// Byte offset of the next character-start boundary at or after
    /// `byte_offset`, within `[first_break, last_break]`.
    pub fn index_after_character(&self, byte_offset: usize) -> usize {
        debug_assert!(byte_offset >= self.first_break() && byte_offset <= self.last_break());
        self.character_breaks()
            .into_iter()
            .find(|&b| b > byte_offset)
            .unwrap_or_else(|| self.last_break())
    }

    pub fn index_before_character(&self, byte_offset: usize) -> usize {
        debug_assert!(byte_offset > self.first_break() && byte_offset <= self.last_break());
        self.character_breaks()
            .into_iter()
            .rev()
            .find(|&b| b < byte_offset)
            .unwrap_or_else(|| self.first_break())
    }

    fn character_breaks_between(&self, lo: usize, hi: usize) -> usize {
        self.character_breaks().into_iter().filter(|&b| b >= lo && b < hi).count()
    }

    /// The scalar starting at `byte_offset`.
    pub fn char_at(&self, byte_offset: usize) -> char {
        debug_assert!(self.text.is_char_boundary(byte_offset));
        self.text[byte_offset..].chars().next().expect("char_at: offset at end of chunk")
    }

    /// Whether the scalar starting at `byte_offset` encodes to a UTF-16
    /// surrogate pair (i.e. lies outside the Basic Multilingual Plane).
    pub fn scalar_is_surrogate_pair(&self, byte_offset: usize) -> bool {
        self.char_at(byte_offset).len_utf16() == 2
    }

    /// The UTF-16 code unit at `byte_offset`; `trailing` selects the
    /// second unit of a surrogate pair.
    pub fn utf16_unit_at(&self, byte_offset: usize, trailing: bool) -> u16 {
        let c = self.char_at(byte_offset);
        let mut buf = [0u16; 2];
        let units = c.encode_utf16(&mut buf);
        if trailing {
            units[1]
        } else {
            units[0]
        }
    }

    /// The raw UTF-8 byte at `byte_offset`.
    pub fn byte_at(&self, byte_offset: usize) -> u8 {
        self.text.as_bytes()[byte_offset]
    }

    /// The grapheme cluster starting at `byte_offset`, which must equal
    /// some entry of [`Chunk::character_breaks`] other than the chunk's
    /// own `last_break`.
    pub fn grapheme_at(&self, byte_offset: usize) -> &str {
        let end = self.index_after_character(byte_offset);
        &self.text[byte_offset..end]
    }
}

/// The four metrics over [`Summary4`], exposed as plain function
/// pointers (per `spec.md` §9's "tagged variants or four monomorphized
/// instantiations" note — non-capturing `fn` values compare by address,
/// which is enough to dispatch on which metric `Rope::split`/`find` is
/// driving without a separate enum).
pub fn metric_utf8(s: &Summary4) -> u64 {
    s.utf8
}
pub fn metric_utf16(s: &Summary4) -> u64 {
    s.utf16
}
pub fn metric_scalars(s: &Summary4) -> u64 {
    s.scalars
}
pub fn metric_characters(s: &Summary4) -> u64 {
    s.characters
}

impl Chunk {
    /// Translates a metric-space offset (as measured by `measure`) into
    /// a byte offset within this chunk's text.
    fn byte_offset_for_metric(&self, measure: fn(&Summary4) -> u64, offset: u64) -> usize {
        if measure == metric_utf8 {
            offset as usize
        } else if measure == metric_utf16 {
            let target = offset;
            let mut units = 0u64;
            for (i, c) in self.text.char_indices() {
                if units == target {
                    return i;
                }
                units += c.len_utf16() as u64;
            }
            self.text.len()
        } else if measure == metric_scalars {
            let target = offset;
            let mut seen = 0u64;
            for (i, _) in self.text.char_indices() {
                if seen == target {
                    return i;
                }
                seen += 1;
            }
            self.text.len()
        } else if measure == metric_characters {
            let target = offset as usize;
            self.character_breaks().get(target).copied().unwrap_or_else(|| self.last_break())
        } else {
            unreachable!("Chunk::split: unrecognized metric");
        }
    }
}

impl Element for Chunk {
    type Summary = Summary4;

    fn summary(&self) -> Summary4 {
        self.counts
    }

    fn split(&self, measure: fn(&Summary4) -> u64, offset: u64) -> (Self, Self) {
        let byte_offset = self.byte_offset_for_metric(measure, offset);
        debug_assert!(self.text.is_char_boundary(byte_offset));
        let (l, r) = self.text.split_at(byte_offset);
        let (left, mid_state) = Chunk::new(l, &GraphemeBreaker::new());
        let (right, _) = Chunk::new(r, &mid_state);
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_chunk_counts() {
        let (c, _) = Chunk::new("hello", &GraphemeBreaker::new());
        assert_eq!(c.counts().utf8, 5);
        assert_eq!(c.counts().utf16, 5);
        assert_eq!(c.counts().scalars, 5);
        assert_eq!(c.counts().characters, 5);
        assert_eq!(c.first_break(), 0);
        assert_eq!(c.last_break(), 4);
    }

    #[test]
    fn chunk_boundary_rule_across_combining_mark() {
        // "ab\u{0301}cd" split so that the combining mark starts chunk 2.
        let (c1, state) = Chunk::new("ab", &GraphemeBreaker::new());
        let (c2, _) = Chunk::new("\u{0301}cd", &state);
        assert_eq!(c1.counts().characters, 2); // "a", "b" (b's combiner not yet seen)
        assert_eq!(c2.counts().characters, 2); // "c", "d" -- the b+combiner cluster belongs to c1
        assert_eq!(c1.counts().characters + c2.counts().characters, 4);
    }

    #[test]
    fn non_bmp_scalar_counts_two_utf16_units() {
        let (c, _) = Chunk::new("a\u{1F600}b", &GraphemeBreaker::new());
        assert_eq!(c.counts().scalars, 3);
        assert_eq!(c.counts().utf16, 4);
        assert_eq!(c.counts().characters, 3);
    }
}
