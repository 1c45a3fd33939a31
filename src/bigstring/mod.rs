//! Unicode-aware big string built on [`crate::rope::Rope`] (`spec.md`
//! C7 / C3 / the packed `Index`).
//!
//! A [`BigString`] is a `Rope<Chunk>`: content lives in bounded UTF-8
//! [`chunk::Chunk`] leaves, and every query is answered through one of
//! four metric views — [`Utf8View`], [`Utf16View`], [`ScalarView`],
//! [`CharacterView`] — that agree on the same underlying text but count
//! positions differently (raw bytes, UTF-16 code units including
//! surrogate halves, Unicode scalars, or extended grapheme clusters).
//! [`Index`] is the position type shared by all four: a packed byte
//! offset plus a trailing-surrogate flag, with an optional cached rope
//! cursor for O(1) re-resolution on the hot path of sequential
//! iteration.

mod builder;
pub mod chunk;
pub mod grapheme;

use std::fmt;
use std::hash::{Hash, Hasher};

use chunk::{metric_characters, metric_scalars, metric_utf16, metric_utf8, Chunk, Summary4};
use grapheme::GraphemeBreaker;

use crate::rope::{Cursor, Element, Rope, RopeBuilder};

const UTF8_OFFSET_SHIFT: u32 = 11;
const TRAILING_SURROGATE_BIT: u64 = 1 << 10;

/// A position into a [`BigString`], shared by all four views.
///
/// Bit layout (`spec.md` §3): bits `63..11` hold the absolute UTF-8
/// byte offset, bit `10` flags that this index addresses the second
/// code unit of a UTF-16 surrogate pair, and bits `9..0` are reserved
/// padding (kept at zero; no view in this crate assigns them meaning).
/// Equality, ordering, and hashing only ever look at the packed bits —
/// the cached cursor is pure acceleration and never changes what an
/// `Index` denotes.
#[derive(Clone)]
pub struct Index {
    packed: u64,
    cursor: Option<Cursor<Chunk>>,
}

impl Index {
    fn new(byte_offset: u64, trailing_surrogate: bool) -> Self {
        let packed = (byte_offset << UTF8_OFFSET_SHIFT) | if trailing_surrogate { TRAILING_SURROGATE_BIT } else { 0 };
        Index { packed, cursor: None }
    }

    fn with_cursor(mut self, cursor: Cursor<Chunk>) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn byte_offset(&self) -> u64 {
        self.packed >> UTF8_OFFSET_SHIFT
    }

    pub fn is_trailing_surrogate(&self) -> bool {
        self.packed & TRAILING_SURROGATE_BIT != 0
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.packed == other.packed
    }
}
impl Eq for Index {}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Index {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.packed.cmp(&other.packed)
    }
}

impl Hash for Index {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.packed.hash(state);
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("byte_offset", &self.byte_offset())
            .field("trailing_surrogate", &self.is_trailing_surrogate())
            .finish()
    }
}

/// Slices `text` into `Chunk`-sized pieces at scalar boundaries,
/// threading a [`GraphemeBreaker`] left to right so no grapheme cluster
/// is ever split across a chunk edge, then bulk-loads the result.
fn ingest(text: &str) -> Rope<Chunk> {
    let mut builder: RopeBuilder<Chunk> = RopeBuilder::new();
    let mut state = GraphemeBreaker::new();
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
        let (chunk, next_state) = Chunk::new(piece, &state);
        state = next_state;
        builder.push(chunk);
        rest = remainder;
    }
    builder.finalize()
}

/// A Unicode string backed by a balanced tree of bounded UTF-8 chunks.
#[derive(Clone, Debug)]
pub struct BigString {
    rope: Rope<Chunk>,
}

impl Default for BigString {
    fn default() -> Self {
        BigString::new()
    }
}

impl BigString {
    pub fn new() -> Self {
        BigString { rope: Rope::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    pub fn len_utf8(&self) -> u64 {
        self.rope.measure(metric_utf8)
    }
    pub fn len_utf16(&self) -> u64 {
        self.rope.measure(metric_utf16)
    }
    pub fn len_scalars(&self) -> u64 {
        self.rope.measure(metric_scalars)
    }
    pub fn len_characters(&self) -> u64 {
        self.rope.measure(metric_characters)
    }

    pub fn start_index(&self) -> Index {
        Index::new(0, false)
    }

    pub fn end_index(&self) -> Index {
        Index::new(self.len_utf8(), false)
    }

    pub fn utf8(&self) -> Utf8View<'_> {
        Utf8View { big: self }
    }
    pub fn utf16(&self) -> Utf16View<'_> {
        Utf16View { big: self }
    }
    pub fn scalars(&self) -> ScalarView<'_> {
        ScalarView { big: self }
    }
    pub fn characters(&self) -> CharacterView<'_> {
        CharacterView { big: self }
    }

    fn cursor_at(&self, byte_offset: u64) -> Cursor<Chunk> {
        self.rope.cursor_at(metric_utf8, byte_offset)
    }

    /// Rounds a raw byte offset down to the nearest grapheme-cluster
    /// boundary, clamped to `[0, len_utf8()]`.
    fn round_down_character(&self, byte_offset: u64) -> u64 {
        let total = self.len_utf8();
        let byte_offset = byte_offset.min(total);
        if byte_offset == 0 || byte_offset == total {
            return byte_offset;
        }
        let cur = self.cursor_at(byte_offset);
        let leaf_start = cur.start(metric_utf8);
        let local = (byte_offset - leaf_start) as usize;
        let chunk = cur.element();
        if local < chunk.first_break() {
            // `byte_offset` lands inside a grapheme cluster that started
            // in an earlier chunk (`first_break` is this chunk's own
            // earliest real character start, so anything before it is
            // still the tail of that straddling cluster). Spec §4.7:
            // walk leftward over leaves until one has `has_breaks`, then
            // use its `last_break`.
            return self.round_down_character_across_leaves(leaf_start);
        }
        let rounded = if local >= chunk.last_break() {
            chunk.last_break()
        } else {
            chunk.index_before_character(local + 1).min(local)
        };
        leaf_start + rounded as u64
    }

    /// Scans leftward, one leaf at a time, from just before `before`
    /// until a chunk actually starts a character (`Chunk::has_breaks`),
    /// then returns the absolute byte offset of that chunk's
    /// `last_break` — the start of the cluster straddling every
    /// entirely-pending chunk in between.
    fn round_down_character_across_leaves(&self, before: u64) -> u64 {
        let mut probe = before;
        while probe > 0 {
            let prev = self.cursor_at(probe - 1);
            let prev_start = prev.start(metric_utf8);
            let prev_chunk = prev.element();
            if prev_chunk.has_breaks() {
                return prev_start + prev_chunk.last_break() as u64;
            }
            probe = prev_start;
        }
        0
    }

    /// Replaces the UTF-8 byte range `[lo, hi)` (rounded outward to the
    /// nearest enclosing grapheme boundaries) with `replacement`
    /// (`spec.md` §4.7): split the rope at both endpoints, build the
    /// replacement middle through [`builder::SpliceBuilder`] seeded with
    /// the real `GraphemeBreaker` state trailing off `left`, let it
    /// resync the held `right` rope's leading chunks against that state,
    /// then concatenate `left · middle · right`. `Chunk::split` (used by
    /// `Rope::split` when an endpoint falls inside a chunk) always
    /// reconstructs its two halves from an empty breaker state, which is
    /// exactly the stale assumption the splice builder's resync step
    /// corrects before `right` is joined back on.
    pub fn replace_subrange(&mut self, lo: &Index, hi: &Index, replacement: &str) {
        let lo_off = self.round_down_character(lo.byte_offset());
        let hi_off = self.round_down_character(hi.byte_offset()).max(lo_off);
        log::debug!("BigString::replace_subrange: [{lo_off}, {hi_off}) <- {} bytes", replacement.len());
        let (left, rest) = self.rope.split(metric_utf8, lo_off);
        let (_, right) = rest.split(metric_utf8, hi_off - lo_off);
        let left_state = builder::trailing_breaker_state(&left);
        let mut splice = builder::SpliceBuilder::new(left_state, right);
        splice.push_str(replacement);
        self.rope = left.concat(splice.finalize());
    }

    /// Collects the full contents into an owned `String`.
    pub fn to_string_lossy(&self) -> String {
        let mut out = String::with_capacity(self.len_utf8() as usize);
        for chunk in self.rope.clone().into_elements() {
            out.push_str(chunk.text());
        }
        out
    }
}

impl From<&str> for BigString {
    fn from(text: &str) -> Self {
        BigString { rope: ingest(text) }
    }
}

impl From<String> for BigString {
    fn from(text: String) -> Self {
        BigString::from(text.as_str())
    }
}

impl fmt::Display for BigString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Shared navigation logic for the four metric-specific views. Not
/// exposed directly — [`Utf8View`]/[`Utf16View`]/[`ScalarView`]/
/// [`CharacterView`] each wrap one with their own element type.
struct RawView<'a> {
    big: &'a BigString,
    metric: fn(&Summary4) -> u64,
}

impl<'a> RawView<'a> {
    fn count(&self) -> u64 {
        self.big.rope.measure(self.metric)
    }

    fn first(&self) -> Option<Index> {
        if self.big.is_empty() {
            None
        } else {
            Some(self.index_at_metric_offset(0))
        }
    }

    fn last(&self) -> Option<Index> {
        let n = self.count();
        if n == 0 {
            None
        } else {
            Some(self.index_at_metric_offset(n - 1))
        }
    }

    /// Resolves the `offset`-th position in this view's metric to an
    /// `Index`, including the UTF-16 trailing-surrogate flag when
    /// `offset` lands on the second half of a pair.
    fn index_at_metric_offset(&self, offset: u64) -> Index {
        let cur = self.big.rope.cursor_at(self.metric, offset);
        let leaf_start = cur.start(self.metric);
        let chunk = cur.element();
        let local_offset = offset - leaf_start;
        let byte_start = cur.start(metric_utf8);
        let (byte_local, trailing) = self.locate_in_chunk(chunk, local_offset);
        Index::new(byte_start + byte_local as u64, trailing).with_cursor(cur)
    }

    /// Maps a metric-local offset within one chunk to `(byte_offset,
    /// trailing_surrogate)`.
    fn locate_in_chunk(&self, chunk: &Chunk, local_offset: u64) -> (usize, bool) {
        if self.metric == metric_utf8 {
            (local_offset as usize, false)
        } else if self.metric == metric_scalars {
            let mut seen = 0u64;
            for (i, _) in chunk.text().char_indices() {
                if seen == local_offset {
                    return (i, false);
                }
                seen += 1;
            }
            (chunk.utf8_len(), false)
        } else if self.metric == metric_utf16 {
            let mut units = 0u64;
            for (i, c) in chunk.text().char_indices() {
                let width = c.len_utf16() as u64;
                if local_offset < units + width {
                    return (i, local_offset == units + 1);
                }
                units += width;
            }
            (chunk.utf8_len(), false)
        } else if self.metric == metric_characters {
            (chunk.nth_character_break(local_offset as usize), false)
        } else {
            unreachable!("RawView: unrecognized metric")
        }
    }

    fn index_after(&self, i: &Index) -> Index {
        self.index_offset_by(i, 1)
    }

    fn index_before(&self, i: &Index) -> Index {
        self.index_offset_by(i, -1)
    }

    fn index_offset_by(&self, i: &Index, n: i64) -> Index {
        let here = self.metric_offset_of(i) as i64;
        let target = here + n;
        let count = self.count() as i64;
        assert!((0..=count).contains(&target), "BigString view index out of bounds");
        if target == count {
            // One past the last element: the universal end position,
            // identical in every view since it's simply "no more text".
            Index::new(self.big.len_utf8(), false)
        } else {
            self.index_at_metric_offset(target as u64)
        }
    }

    /// The position of `i` expressed in this view's metric, derived
    /// from its cached cursor when present (O(1)) or by re-descending
    /// the tree from the UTF-8 byte offset otherwise (O(log N)).
    fn metric_offset_of(&self, i: &Index) -> u64 {
        let cur = match &i.cursor {
            Some(c) => c.clone(),
            None => self.big.cursor_at(i.byte_offset()),
        };
        let byte_local = i.byte_offset() - cur.start(metric_utf8);
        let chunk = cur.element();
        if self.metric == metric_characters {
            let aligned = byte_local as usize;
            if aligned <= chunk.first_break() && chunk.first_break() > 0 {
                // `aligned` sits inside a cluster that started in an
                // earlier chunk, so it's already counted in
                // `cur.start(metric_characters)` — its rank is one less,
                // not the same as the chunk's own first character.
                return cur.start(metric_characters) - 1;
            }
        }
        let local_metric = if self.metric == metric_utf8 {
            byte_local
        } else if self.metric == metric_scalars {
            chunk.scalar_distance(0, byte_local as usize) as u64
        } else if self.metric == metric_utf16 {
            chunk.utf16_distance(0, byte_local as usize) as u64 + if i.is_trailing_surrogate() { 1 } else { 0 }
        } else if self.metric == metric_characters {
            let aligned = byte_local as usize;
            if aligned <= chunk.first_break() {
                0
            } else if aligned >= chunk.utf8_len() {
                // Only reachable for the rope's final chunk (any other
                // chunk's end offset resolves into the next chunk's
                // local position 0 instead): every character in the
                // chunk has been passed.
                metric_characters(&chunk.summary())
            } else {
                // A scalar- or byte-aligned offset that falls strictly
                // inside the chunk's still-pending trailing cluster;
                // round down to the last confirmed character boundary.
                chunk.character_distance(chunk.first_break(), aligned.min(chunk.last_break())) as u64
            }
        } else {
            unreachable!()
        };
        cur.start(self.metric) + local_metric
    }

    fn distance(&self, from: &Index, to: &Index) -> i64 {
        self.metric_offset_of(to) as i64 - self.metric_offset_of(from) as i64
    }
}

/// The UTF-8 byte view: every `Index` between `0` and `len_utf8()` is
/// valid, regardless of character boundaries.
pub struct Utf8View<'a> {
    big: &'a BigString,
}

impl<'a> Utf8View<'a> {
    fn raw(&self) -> RawView<'a> {
        RawView { big: self.big, metric: metric_utf8 }
    }
    pub fn count(&self) -> u64 {
        self.raw().count()
    }
    pub fn first(&self) -> Option<Index> {
        self.raw().first()
    }
    pub fn last(&self) -> Option<Index> {
        self.raw().last()
    }
    pub fn index_after(&self, i: &Index) -> Index {
        self.raw().index_after(i)
    }
    pub fn index_before(&self, i: &Index) -> Index {
        self.raw().index_before(i)
    }
    pub fn index_offset_by(&self, i: &Index, n: i64) -> Index {
        self.raw().index_offset_by(i, n)
    }
    pub fn distance(&self, from: &Index, to: &Index) -> i64 {
        self.raw().distance(from, to)
    }
    pub fn get(&self, i: &Index) -> Option<u8> {
        if i.byte_offset() >= self.big.len_utf8() {
            return None;
        }
        let cur = self.big.cursor_at(i.byte_offset());
        let local = (i.byte_offset() - cur.start(metric_utf8)) as usize;
        Some(cur.element().byte_at(local))
    }
}

/// The Unicode scalar view: every `Index` sits on a scalar boundary.
pub struct ScalarView<'a> {
    big: &'a BigString,
}

impl<'a> ScalarView<'a> {
    fn raw(&self) -> RawView<'a> {
        RawView { big: self.big, metric: metric_scalars }
    }
    pub fn count(&self) -> u64 {
        self.raw().count()
    }
    pub fn first(&self) -> Option<Index> {
        self.raw().first()
    }
    pub fn last(&self) -> Option<Index> {
        self.raw().last()
    }
    pub fn index_after(&self, i: &Index) -> Index {
        self.raw().index_after(i)
    }
    pub fn index_before(&self, i: &Index) -> Index {
        self.raw().index_before(i)
    }
    pub fn index_offset_by(&self, i: &Index, n: i64) -> Index {
        self.raw().index_offset_by(i, n)
    }
    pub fn distance(&self, from: &Index, to: &Index) -> i64 {
        self.raw().distance(from, to)
    }
    pub fn get(&self, i: &Index) -> Option<char> {
        if i.byte_offset() >= self.big.len_utf8() {
            return None;
        }
        let cur = self.big.cursor_at(i.byte_offset());
        let local = (i.byte_offset() - cur.start(metric_utf8)) as usize;
        Some(cur.element().char_at(local))
    }
}

/// The UTF-16 view: an `Index` may address either code unit of a
/// surrogate pair, distinguished by [`Index::is_trailing_surrogate`].
pub struct Utf16View<'a> {
    big: &'a BigString,
}

impl<'a> Utf16View<'a> {
    fn raw(&self) -> RawView<'a> {
        RawView { big: self.big, metric: metric_utf16 }
    }
    pub fn count(&self) -> u64 {
        self.raw().count()
    }
    pub fn first(&self) -> Option<Index> {
        self.raw().first()
    }
    pub fn last(&self) -> Option<Index> {
        self.raw().last()
    }
    pub fn index_after(&self, i: &Index) -> Index {
        self.raw().index_after(i)
    }
    pub fn index_before(&self, i: &Index) -> Index {
        self.raw().index_before(i)
    }
    pub fn index_offset_by(&self, i: &Index, n: i64) -> Index {
        self.raw().index_offset_by(i, n)
    }
    pub fn distance(&self, from: &Index, to: &Index) -> i64 {
        self.raw().distance(from, to)
    }
    pub fn get(&self, i: &Index) -> Option<u16> {
        if i.byte_offset() >= self.big.len_utf8() {
            return None;
        }
        let cur = self.big.cursor_at(i.byte_offset());
        let local = (i.byte_offset() - cur.start(metric_utf8)) as usize;
        Some(cur.element().utf16_unit_at(local, i.is_trailing_surrogate()))
    }
}

/// The extended-grapheme-cluster view: every `Index` sits on a
/// character boundary (`spec.md` C5's resync rule determines which
/// chunk "owns" a cluster that straddles a chunk edge).
pub struct CharacterView<'a> {
    big: &'a BigString,
}

impl<'a> CharacterView<'a> {
    fn raw(&self) -> RawView<'a> {
        RawView { big: self.big, metric: metric_characters }
    }
    pub fn count(&self) -> u64 {
        self.raw().count()
    }
    pub fn first(&self) -> Option<Index> {
        self.raw().first()
    }
    pub fn last(&self) -> Option<Index> {
        self.raw().last()
    }
    pub fn index_after(&self, i: &Index) -> Index {
        self.raw().index_after(i)
    }
    pub fn index_before(&self, i: &Index) -> Index {
        self.raw().index_before(i)
    }
    pub fn index_offset_by(&self, i: &Index, n: i64) -> Index {
        self.raw().index_offset_by(i, n)
    }
    pub fn distance(&self, from: &Index, to: &Index) -> i64 {
        self.raw().distance(from, to)
    }
    pub fn get(&self, i: &Index) -> Option<String> {
        if i.byte_offset() >= self.big.len_utf8() {
            return None;
        }
        let cur = self.big.cursor_at(i.byte_offset());
        let local = (i.byte_offset() - cur.start(metric_utf8)) as usize;
        Some(cur.element().grapheme_at(local).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display() {
        let s = BigString::from("hello, world");
        assert_eq!(s.to_string_lossy(), "hello, world");
        assert_eq!(format!("{s}"), "hello, world");
    }

    #[test]
    fn character_count_spans_many_chunks() {
        let text = "a".repeat(chunk::MAX_UTF8 * 3 + 17);
        let s = BigString::from(text.as_str());
        assert_eq!(s.len_characters(), text.len() as u64);
        assert_eq!(s.len_utf8(), text.len() as u64);
    }

    #[test]
    fn characters_view_walks_grapheme_clusters() {
        let s = BigString::from("e\u{0301}clair"); // e + combining acute + "clair"
        let view = s.characters();
        assert_eq!(view.count(), 6); // "é" (combined), c,l,a,i,r
        let first = view.first().unwrap();
        let cluster = view.get(&first).unwrap();
        assert_eq!(cluster, "e\u{0301}");
    }

    #[test]
    fn non_bmp_scalar_round_trips_through_utf16_view() {
        let s = BigString::from("a\u{1F600}b");
        assert_eq!(s.len_utf16(), 4);
        let view = s.utf16();
        let first = view.first().unwrap();
        let second = view.index_after(&first);
        let third = view.index_after(&second);
        assert!(!first.is_trailing_surrogate());
        assert!(!second.is_trailing_surrogate());
        assert!(third.is_trailing_surrogate());
        assert_eq!(view.get(&first), Some('a' as u16));
    }

    #[test]
    fn replace_subrange_changes_content() {
        let mut s = BigString::from("hello world");
        let lo = Index::new(6, false);
        let hi = Index::new(11, false);
        s.replace_subrange(&lo, &hi, "there");
        assert_eq!(s.to_string_lossy(), "hello there");
    }

    #[test]
    fn index_ordering_matches_byte_offset() {
        let a = Index::new(3, false);
        let b = Index::new(5, false);
        assert!(a < b);
        assert_eq!(a.clone(), Index::new(3, false));
    }
}
