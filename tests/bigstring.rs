//! Cross-module / scenario-level `BigString` tests (`spec.md` §8 seed tests).

use bitrope::bigstring::BigString;

#[test]
fn character_count_across_chunk_boundary() {
    // 5 scalars, 4 characters: "a" + "b\u{0301}" + "c" + "d".
    let s = BigString::from("ab\u{0301}cd");
    assert_eq!(s.len_characters(), 4);
    assert_eq!(s.len_scalars(), 5);
    assert_eq!(s.len_utf16(), 5);
    assert_eq!(s.len_utf8(), 6);
}

#[test]
fn replace_subrange_round_trip() {
    let mut s = BigString::from("Hello, world!");
    let lo = s.utf8().index_offset_by(&s.start_index(), 7);
    let hi = s.utf8().index_offset_by(&s.start_index(), 12);
    s.replace_subrange(&lo, &hi, "Swift");
    assert_eq!(s.to_string_lossy(), "Hello, Swift!");

    let hi2 = s.utf8().index_offset_by(&s.start_index(), 12);
    s.replace_subrange(&lo, &hi2, "world");
    assert_eq!(s.to_string_lossy(), "Hello, world!");
    assert_eq!(s.len_utf8(), 13);
    assert_eq!(s.len_utf16(), 13);
    assert_eq!(s.len_scalars(), 13);
    assert_eq!(s.len_characters(), 13);
}

#[test]
fn index_stability_across_view_conversion() {
    // non-BMP scalar \u{1F600} at UTF-8 offset 3 ("abc\u{1F600}def").
    let s = BigString::from("abc\u{1F600}def");
    let utf8_idx = s.utf8().index_offset_by(&s.start_index(), 3);
    assert_eq!(utf8_idx.byte_offset(), 3);

    let utf16_view = s.utf16();
    let mut cur = utf16_view.first().unwrap();
    let mut offset = 0i64;
    while utf16_view.distance(&cur, &utf8_idx) != 0 && offset < 100 {
        cur = utf16_view.index_after(&cur);
        offset += 1;
    }
    assert_eq!(cur.byte_offset(), 3);
    let trailing = utf16_view.index_after(&cur);
    assert!(trailing.is_trailing_surrogate());
    assert_eq!(utf16_view.distance(&cur, &trailing), 1);

    let rounded = s.scalars().index_offset_by(&trailing, 0);
    assert_eq!(rounded.byte_offset(), trailing.byte_offset());
    assert!(cur < trailing);
}

#[test]
fn concatenation_counts_add_except_straddling_character() {
    let a = BigString::from("ab");
    let b = BigString::from("\u{0301}cd"); // combining mark continues "b"
    let combined = BigString::from(format!("{a}{b}").as_str());
    assert_eq!(combined.len_utf8(), a.len_utf8() + b.len_utf8());
    assert_eq!(combined.len_scalars(), a.len_scalars() + b.len_scalars());
    // "b" + combining mark fuses into one cluster, so the combined count
    // is one less than the naive per-piece sum (2 + 2 = 4, actual 3).
    assert_eq!(a.len_characters() + b.len_characters(), 4);
    assert_eq!(combined.len_characters(), 3);
}

#[test]
fn chunk_character_count_invariant_holds_across_many_chunks() {
    let text: String = (0..2000).map(|i| if i % 7 == 0 { 'e' } else { 'x' }).collect();
    let s = BigString::from(text.as_str());
    assert_eq!(s.len_characters(), text.chars().count() as u64);
}

#[test]
fn round_down_idempotence_in_character_view() {
    let s = BigString::from("e\u{0301}clair");
    let view = s.characters();
    let mid = view.index_after(&view.first().unwrap());
    let once = view.index_offset_by(&mid, 0);
    let twice = view.index_offset_by(&once, 0);
    assert_eq!(once, twice);
}

#[test]
fn index_after_before_round_trip_in_every_view() {
    let s = BigString::from("abc\u{1F600}def");

    let view = s.utf8();
    let i = view.index_after(&view.first().unwrap());
    assert_eq!(view.index_after(&view.index_before(&i)), i);

    let sview = s.scalars();
    let si = sview.index_after(&sview.first().unwrap());
    assert_eq!(sview.index_after(&sview.index_before(&si)), si);

    let cview = s.characters();
    let ci = cview.index_after(&cview.first().unwrap());
    assert_eq!(cview.index_after(&cview.index_before(&ci)), ci);
}

#[test]
fn replace_subrange_rounds_down_correctly_across_a_straddling_chunk_boundary() {
    // 254 a's fill chunk one; 'e' is the 255th byte (still chunk one);
    // the combining mark right after it starts chunk two and fuses with
    // 'e' into a single grapheme cluster once read as a whole.
    let text = format!("{}e\u{{0301}}cd", "a".repeat(254));
    let mut s = BigString::from(text.as_str());
    let lo = s.start_index();
    let hi = s.utf8().index_offset_by(&s.start_index(), 255);
    s.replace_subrange(&lo, &hi, "");
    // Rounding down from byte 255 must land before the fused "e" +
    // combining-mark cluster, not after it.
    assert_eq!(s.to_string_lossy(), "e\u{0301}cd");
}

#[test]
fn character_view_distance_is_consistent_across_a_straddling_chunk_boundary() {
    let text = format!("{}e\u{{0301}}cd", "a".repeat(254));
    let s = BigString::from(text.as_str());
    let view = s.characters();
    let start = s.start_index();
    // Every byte position inside the fused cluster's tail (bytes 254
    // and 255, i.e. "e" and the combining mark) must report the same
    // character-view distance from the start: the cluster hasn't been
    // fully passed yet at either position.
    let at_e = s.utf8().index_offset_by(&start, 254);
    let at_mark = s.utf8().index_offset_by(&start, 255);
    assert_eq!(view.distance(&start, &at_e), view.distance(&start, &at_mark));
    assert_eq!(view.distance(&start, &at_e), 254);
}

#[test]
fn utf8_slice_round_trips_valid_utf8() {
    let s = BigString::from("héllo wörld");
    assert_eq!(s.to_string_lossy(), "héllo wörld");
}
