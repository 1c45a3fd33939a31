//! Ergonomic, signed-integer-facing wrapper over [`BitSetCore`] (`spec.md` C3).

use rand::RngCore;
use std::ops::Range;

use super::core::BitSetCore;
use super::word::{Word, BITS};

/// A sorted set of nonnegative integers backed by a dense bitmap.
///
/// `BitSet` accepts signed `i64` at its public boundary and gates
/// negative values the way §4.3/§7 specify: queries silently treat a
/// negative value as absent, mutators panic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    core: BitSetCore,
}

fn require_nonneg(v: i64) -> u64 {
    if v < 0 {
        panic!("BitSet: negative value {v} is not a valid element");
    }
    v as u64
}

fn clamp_query(v: i64) -> Option<u64> {
    if v < 0 {
        None
    } else {
        Some(v as u64)
    }
}

/// Clamp a signed range to `[0, u64::MAX]`, for query-side operations
/// that degrade to "empty" rather than panicking (§7 item 3).
fn clamp_range(r: Range<i64>) -> Range<u64> {
    let start = r.start.max(0) as u64;
    let end = r.end.max(0) as u64;
    start..end
}

/// A range whose mutation-side bounds must be non-negative; panics
/// otherwise (§7 item 3: insertions are fatal on bad bounds).
fn require_range(r: Range<i64>) -> Range<u64> {
    if r.start < 0 || r.end < 0 {
        panic!("BitSet: range {:?} has a negative bound", r);
    }
    r.start as u64..r.end as u64
}

impl BitSet {
    pub fn new() -> Self {
        Self { core: BitSetCore::new() }
    }

    pub fn from_range(r: Range<i64>) -> Self {
        let mut s = Self::new();
        s.insert_range(r);
        s
    }

    pub fn len(&self) -> u64 {
        self.core.count()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Negative queries are simply absent, never a panic.
    pub fn contains(&self, v: i64) -> bool {
        clamp_query(v).is_some_and(|v| self.core.contains(v))
    }

    /// Panics on negative `v` (§7 item 1: a domain error is fatal).
    pub fn insert(&mut self, v: i64) -> bool {
        self.core.insert(require_nonneg(v))
    }

    pub fn remove(&mut self, v: i64) -> bool {
        match clamp_query(v) {
            Some(v) => self.core.remove(v),
            None => false,
        }
    }

    /// Inserts every value in the range (§9 open question: the spec's
    /// own semantics, not the teacher-era buggy stub).
    pub fn insert_range(&mut self, r: Range<i64>) {
        self.core.insert_range(require_range(r));
    }

    pub fn remove_range(&mut self, r: Range<i64>) {
        self.core.remove_range(clamp_range(r));
    }

    pub fn toggle_range(&mut self, r: Range<i64>) {
        self.core.toggle_range(clamp_range(r));
    }

    pub fn intersect_range(&mut self, r: Range<i64>) {
        self.core.intersect_range(clamp_range(r));
    }

    /// Insert every element of an arbitrary integer iterable
    /// (`update(with:)` in §6's contract); negative values are skipped.
    pub fn update(&mut self, iter: impl IntoIterator<Item = i64>) {
        for v in iter {
            if v >= 0 {
                self.core.insert(v as u64);
            }
        }
    }

    // -- value-returning set algebra --

    pub fn union(&self, other: &BitSet) -> BitSet {
        BitSet { core: self.core.union(&other.core) }
    }

    pub fn intersection(&self, other: &BitSet) -> BitSet {
        BitSet { core: self.core.intersection(&other.core) }
    }

    pub fn subtracting(&self, other: &BitSet) -> BitSet {
        BitSet { core: self.core.subtracting(&other.core) }
    }

    pub fn symmetric_difference(&self, other: &BitSet) -> BitSet {
        BitSet { core: self.core.symmetric_difference(&other.core) }
    }

    // -- in-place set algebra --

    pub fn form_union(&mut self, other: &BitSet) {
        self.core.form_union(&other.core);
    }

    pub fn form_intersection(&mut self, other: &BitSet) {
        self.core.form_intersection(&other.core);
    }

    pub fn form_subtracting(&mut self, other: &BitSet) {
        self.core.form_subtracting(&other.core);
    }

    pub fn form_symmetric_difference(&mut self, other: &BitSet) {
        self.core.form_symmetric_difference(&other.core);
    }

    // -- predicates --

    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.core.is_subset(&other.core)
    }

    pub fn is_strict_subset(&self, other: &BitSet) -> bool {
        self.core.is_strict_subset(&other.core)
    }

    pub fn is_superset(&self, other: &BitSet) -> bool {
        self.core.is_superset(&other.core)
    }

    pub fn is_strict_superset(&self, other: &BitSet) -> bool {
        self.core.is_strict_superset(&other.core)
    }

    pub fn is_disjoint(&self, other: &BitSet) -> bool {
        self.core.is_disjoint(&other.core)
    }

    pub fn is_equal_set(&self, other: &BitSet) -> bool {
        self.core.is_equal_set(&other.core)
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.core.iter().map(|v| v as i64)
    }

    pub fn index_after(&self, v: i64) -> Option<i64> {
        let v = clamp_query(v)?;
        self.core.index_after(v).map(|v| v as i64)
    }

    pub fn index_before(&self, v: i64) -> Option<i64> {
        let v = clamp_query(v)?;
        self.core.index_before(v).map(|v| v as i64)
    }

    /// Ergonomic `self[member: i] = bool`.
    pub fn set_member(&mut self, i: i64, present: bool) {
        if present {
            self.insert(i);
        } else {
            self.remove(i);
        }
    }

    /// A view over the subset of elements falling in `[a, b)`, clamped.
    pub fn members_in(&self, r: Range<i64>) -> BitSet {
        let mut out = self.clone();
        out.intersect_range(r);
        out
    }

    /// Allocate a same-length bitmap, keep elements for which `pred`
    /// holds, shrink to canonical form.
    pub fn filter(&self, mut pred: impl FnMut(i64) -> bool) -> BitSet {
        let mut words = vec![Word::EMPTY; self.core.word_len()];
        for v in self.core.iter() {
            if pred(v as i64) {
                let wi = (v / BITS as u64) as usize;
                let bi = (v % BITS as u64) as u32;
                words[wi].insert(bi);
            }
        }
        BitSet { core: BitSetCore::from_words(words) }
    }

    /// Fill `[0, n)` with uniformly random membership.
    pub fn random(up_to: i64) -> BitSet {
        let n = require_nonneg(up_to);
        let full_words = (n / BITS as u64) as usize;
        let rem = (n % BITS as u64) as u32;
        let mut rng = rand::rng();
        let mut words = Vec::with_capacity(full_words + usize::from(rem > 0));
        for _ in 0..full_words {
            words.push(Word::from_raw(rng.next_u64()));
        }
        if rem > 0 {
            let top = Word::from_raw(rng.next_u64()).intersection(Word::up_to(rem));
            words.push(top);
        }
        BitSet { core: BitSetCore::from_words(words) }
    }

    // -- wire format (§6): unkeyed little-endian u64 words --

    pub fn to_wire_words(&self) -> Vec<u64> {
        self.core.words().iter().map(|w| w.raw()).collect()
    }

    pub fn from_wire_words(words: impl IntoIterator<Item = u64>) -> Self {
        let words: Vec<Word> = words.into_iter().map(Word::from_raw).collect();
        Self { core: BitSetCore::from_words(words) }
    }

    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.core.word_len() * 8);
        for w in self.core.words() {
            out.extend_from_slice(&w.raw().to_le_bytes());
        }
        out
    }

    pub fn from_wire_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len() % 8, 0, "BitSet wire format is a sequence of u64 words");
        let words = bytes.chunks_exact(8).map(|c| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(c);
            u64::from_le_bytes(buf)
        });
        Self::from_wire_words(words)
    }
}

impl FromIterator<i64> for BitSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        let mut s = BitSet::new();
        s.update(iter);
        s
    }
}
