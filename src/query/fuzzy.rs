//! Fuzzy term generation, somewhat based on Norvig's spelling corrector:
//! rather than computing edit distance against every candidate in the
//! content, expand the search term into every spelling variant within the
//! requested distance and run each as an ordinary literal search.

use ahash::AHashSet;

const LETTER_DIGIT_BYTES: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";

/// All distinct variants of `term` within one edit over `[a-z0-9]`: the
/// term itself, single deletions, single substitutions and single
/// insertions. Terms of two bytes or fewer produce only themselves since
/// almost everything is within one edit of them.
///
/// Edits are byte-indexed; an edit that would break UTF-8 is dropped,
/// since such a variant could never match decoded content anyway.
pub fn fuzzy_distance_one(term: &str) -> Vec<String> {
    let mut variants = vec![term.to_string()];
    if term.len() <= 2 {
        return variants;
    }

    let bytes = term.as_bytes();

    // Delete bytes so "test" gives "est" "tst" "tet" "tes"
    for i in 0..bytes.len() {
        push_edit(&mut variants, [&bytes[..i], &bytes[i + 1..]].concat());
    }

    // Replace a letter or digit, which effectively covers transposition
    for i in 0..bytes.len() {
        for &b in LETTER_DIGIT_BYTES {
            push_edit(&mut variants, [&bytes[..i], &[b], &bytes[i + 1..]].concat());
        }
    }

    // Insert a letter or digit before each byte
    for i in 0..bytes.len() {
        for &b in LETTER_DIGIT_BYTES {
            push_edit(&mut variants, [&bytes[..i], &[b], &bytes[i..]].concat());
        }
    }

    dedup(variants)
}

/// Distance-one variants plus a second round of insertions covering all
/// `len + 1` positions, widening the net for a forgotten letter.
pub fn fuzzy_distance_two(term: &str) -> Vec<String> {
    let mut variants = fuzzy_distance_one(term);

    let bytes = term.as_bytes();
    for i in 0..=bytes.len() {
        for &b in LETTER_DIGIT_BYTES {
            push_edit(&mut variants, [&bytes[..i], &[b], &bytes[i..]].concat());
        }
    }

    dedup(variants)
}

fn push_edit(variants: &mut Vec<String>, edit: Vec<u8>) {
    if let Ok(s) = String::from_utf8(edit) {
        variants.push(s);
    }
}

fn dedup(variants: Vec<String>) -> Vec<String> {
    let mut seen = AHashSet::with_capacity(variants.len());
    variants
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
