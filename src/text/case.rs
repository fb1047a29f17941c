//! Unicode case helpers for the literal indexer.
//!
//! Case-insensitive literal search needs more than `to_lowercase` on both
//! sides: the different case representations of a rune can have different
//! byte counts, so byte offsets computed against a lowered haystack do not
//! line up with the original. Instead we expand the needle into every
//! casing it can take (including simple-fold equivalents such as `S`, `s`
//! and `ſ`) and search for each literal form.

use ahash::AHashSet;
use regex_syntax::hir::{ClassUnicode, ClassUnicodeRange};

/// All runes equivalent to `origin` under Unicode simple case folding,
/// starting with the rune itself. Simple folding is one-to-one, so unlike
/// full folding `ß` stays `ß` rather than expanding to `SS`.
pub fn all_simple_fold(origin: char) -> Vec<char> {
    let mut class = ClassUnicode::new([ClassUnicodeRange::new(origin, origin)]);
    class.case_fold_simple();

    let mut result = vec![origin];
    for range in class.ranges() {
        for c in range.start()..=range.end() {
            if c != origin {
                result.push(c);
            }
        }
    }
    result
}

/// All upper/lower case combinations of the input, so `fo` produces
/// `FO Fo fO fo`. Inputs longer than a handful of runes explode
/// combinatorially; callers cap the needle at three runes. An input so
/// long the combination count overflows produces nothing.
pub fn permute_case(input: &str) -> Vec<String> {
    let max = 1usize.checked_shl(input.len() as u32).unwrap_or(0);

    let mut combinations = Vec::with_capacity(max.min(64));
    for i in 0..max {
        let mut s = String::with_capacity(input.len());
        for (j, ch) in input.char_indices() {
            if i & (1 << j) == 0 {
                s.extend(ch.to_uppercase());
            } else {
                s.extend(ch.to_lowercase());
            }
        }
        combinations.push(s);
    }
    remove_duplicates(combinations)
}

/// Case permutations with each rune additionally substituted by its
/// simple-fold equivalents, so `ſ` produces `S s ſ`.
pub fn permute_case_folding(input: &str) -> Vec<String> {
    let mut combos = Vec::new();
    for combo in permute_case(input) {
        for (index, ch) in combo.char_indices() {
            for fold in all_simple_fold(ch) {
                let mut s = String::with_capacity(combo.len() + 2);
                s.push_str(&combo[..index]);
                s.push(fold);
                s.push_str(&combo[index + ch.len_utf8()..]);
                combos.push(s);
            }
        }
    }
    remove_duplicates(combos)
}

/// Drop duplicate strings, keeping the first occurrence of each.
pub fn remove_duplicates(elements: Vec<String>) -> Vec<String> {
    let mut encountered = AHashSet::with_capacity(elements.len());
    elements
        .into_iter()
        .filter(|e| encountered.insert(e.clone()))
        .collect()
}

/// True if the byte is the first byte of a UTF-8 sequence (or a lone
/// byte that can never be a continuation). Used to retreat to a safe
/// boundary when a byte offset lands mid-rune.
#[inline]
pub fn start_of_rune(b: u8) -> bool {
    b < 0x80 || b > 0xBF
}

/// Whitespace check over UTF-8 encoded bytes. Detects the same set as a
/// full decode would for '\t', '\n', '\v', '\f', '\r', ' ', U+0085 (NEL)
/// and U+00A0 (NBSP); only two bytes are needed for those.
#[inline]
pub fn is_space(first_byte: u8, next_byte: u8) -> bool {
    const NEL: u8 = 0x85;
    const NBSP: u8 = 0xA0;
    (0x09..=0x0D).contains(&first_byte)
        || first_byte == b' '
        || first_byte == 0xC2 && (next_byte == NEL || next_byte == NBSP)
}
