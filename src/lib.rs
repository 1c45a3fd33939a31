//! # bitrope
//!
//! A small collection of value-semantic data structures for working
//! with large sequences:
//!
//! * [`bitset`] — a canonical-form dense bitmap set over nonnegative
//!   integers, with a full complement of set algebra and a stable
//!   little-endian wire format.
//! * [`bigstring`] — a Unicode string backed by a B-tree of bounded
//!   UTF-8 chunks ([`rope::Rope`]), queryable through four agreeing
//!   views: raw bytes, UTF-16 code units, Unicode scalars, and extended
//!   grapheme clusters.
//! * [`rope`] — the generic B-tree the string is built on, parameterized
//!   over any additively-summarized element type.
//! * [`deque`] — a fixed-capacity ring buffer with amortized-cheap
//!   insertion/removal anywhere in the buffer, not just at the ends.
//!
//! Every type here is a plain value: cloning is cheap (an `Arc` bump
//! for the tree-backed types) and mutation never reaches through a
//! shared clone. Invalid use — a negative index into a set, an
//! out-of-range deque position — panics rather than returning a
//! `Result`; see each module's documentation for exactly which calls
//! can panic.
//!
//! ## Feature flags
//!
//! * `invariant-checks` shrinks the rope's maximum fan-out and turns on
//!   `O(N)` structural cross-checks in debug builds — useful in tests,
//!   not meant for a release profile.
//! * `cli` builds the `bitrope-cli` binary and pulls in `clap` /
//!   `env_logger`.

pub mod bigstring;
pub mod bitset;
pub mod deque;
pub mod rope;
