//! Literal multi-match extraction over byte haystacks.
//!
//! `index_all` is a drop-in replacement for collecting every match of a
//! literal regex: it yields the same non-overlapping, left-to-right byte
//! intervals while staying on the memmem fast path. `index_all_ignore_case`
//! extends that to Unicode-aware case-insensitive matching by expanding the
//! needle into its case permutations and searching each literal form,
//! avoiding the regex engine entirely.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use memchr::memmem;

use crate::text::case::{all_simple_fold, permute_case_folding};

/// Default capacity of [`PermuteCache`].
pub const DEFAULT_CACHE_SIZE: usize = 10;

/// Cut-off where the ignore-case search switches from expanding the whole
/// needle to expanding just the first three runes and verifying candidates.
/// Three was the sweet spot when benchmarked against large mixed corpora.
const CHAR_LIMIT: usize = 3;

/// Lazy iterator over every non-overlapping occurrence of a needle,
/// yielding half-open `[start, end)` byte intervals left to right.
pub struct IndexAll<'a> {
    haystack: &'a [u8],
    finder: memmem::Finder<'a>,
    needle_len: usize,
    offset: usize,
}

impl Iterator for IndexAll<'_> {
    type Item = [usize; 2];

    fn next(&mut self) -> Option<[usize; 2]> {
        if self.needle_len == 0 || self.offset >= self.haystack.len() {
            return None;
        }

        let found = self.finder.find(&self.haystack[self.offset..])?;
        let start = self.offset + found;
        let end = start + self.needle_len;
        // Advance past the match so occurrences never overlap, which is
        // what a regex find-all over the same literal reports.
        self.offset = end;
        Some([start, end])
    }
}

/// Extract all locations of `needle` inside `haystack` without regular
/// expressions, which makes it faster than a compiled literal regex in
/// most situations while never being slower. It performs worst against
/// random data.
///
/// The match is explicitly case sensitive. An empty needle or haystack
/// yields nothing. Callers wanting a capped number of matches apply
/// `take`; see [`index_all_limit`].
pub fn index_all<'a>(haystack: &'a [u8], needle: &'a [u8]) -> IndexAll<'a> {
    IndexAll {
        haystack,
        finder: memmem::Finder::new(needle),
        needle_len: needle.len(),
        offset: 0,
    }
}

/// [`index_all`] collected into a vector with the limit convention used
/// across the searcher: a negative limit means unbounded, otherwise at
/// most `limit` matches are returned.
pub fn index_all_limit(haystack: &[u8], needle: &[u8], limit: isize) -> Vec<[usize; 2]> {
    let it = index_all(haystack, needle);
    if limit < 0 {
        it.collect()
    } else {
        it.take(limit as usize).collect()
    }
}

/// Bounded memoisation of case-fold permutation lists.
///
/// Interactive sessions search with the same needle over and over, and
/// the permutation expansion is the most expensive part of the
/// ignore-case path, so a very small LRU in front of it pays for itself.
/// The cache is shared state passed explicitly to whoever needs it.
pub struct PermuteCache {
    inner: Mutex<LruCache<String, Arc<Vec<String>>>>,
}

impl PermuteCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The case-fold permutations of `needle`, computed once and shared.
    pub fn permutations(&self, needle: &str) -> Arc<Vec<String>> {
        let mut cache = self.inner.lock().unwrap();
        if let Some(terms) = cache.get(needle) {
            return Arc::clone(terms);
        }
        let terms = Arc::new(permute_case_folding(needle));
        cache.put(needle.to_string(), Arc::clone(&terms));
        terms
    }
}

impl Default for PermuteCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Extract all locations of `needle` inside `haystack` ignoring case, in
/// a Unicode-aware way: a search for `S` also finds `s` and `ſ`, which a
/// simple lowercase of both sides misses. Since different casings can
/// differ in byte length, the reported end of each interval reflects the
/// haystack bytes actually matched rather than the needle length.
///
/// Needles of up to three runes are expanded into every case-fold
/// permutation and searched as plain literals. Longer needles only have
/// their first three runes expanded; each candidate position is then
/// verified against the rest of the needle rune by rune under simple-fold
/// equivalence. Results are sorted by start then end and capped to
/// `limit` (negative = unbounded).
pub fn index_all_ignore_case(
    haystack: &[u8],
    needle: &str,
    limit: isize,
    cache: &PermuteCache,
) -> Vec<[usize; 2]> {
    if haystack.is_empty() || needle.is_empty() {
        return Vec::new();
    }

    let rune_count = needle.chars().count();
    let mut matches: Vec<[usize; 2]> = Vec::new();

    if rune_count <= CHAR_LIMIT {
        // Below the cut-off, so the full permutation set is small enough
        // to search directly. Running index_all per term beat every
        // Aho-Corasick and Boyer-Moore variant tried here because the
        // single-literal scan lowers to vector instructions.
        for term in cache.permutations(needle).iter() {
            matches.extend(index_all(haystack, term.as_bytes()));
        }
    } else {
        // Over the cut-off: expanding the whole needle would explode, so
        // probe with permutations of the three-rune prefix and confirm
        // each candidate before reporting it.
        let prefix: String = needle.chars().take(CHAR_LIMIT).collect();
        for term in cache.permutations(&prefix).iter() {
            for candidate in index_all(haystack, term.as_bytes()) {
                if let Some(m) = verify_fold_match(haystack, candidate[0], needle, rune_count) {
                    matches.push(m);
                }
            }
        }
    }

    matches.sort_unstable_by(|a, b| a[0].cmp(&b[0]).then(a[1].cmp(&b[1])));
    if limit >= 0 {
        matches.truncate(limit as usize);
    }
    matches
}

/// Confirm that the haystack at `start` is a simple-fold equivalent of
/// the whole needle, returning the matched interval. The casing found in
/// the haystack can be longer or shorter in bytes than the needle, so up
/// to `2 * needle.len() - 1` trailing bytes are considered and the
/// interval end is however many bytes the matched runes occupy.
fn verify_fold_match(
    haystack: &[u8],
    start: usize,
    needle: &str,
    rune_count: usize,
) -> Option<[usize; 2]> {
    if haystack.len() < start + rune_count {
        return None;
    }

    let window_len = (needle.len() * 2 - 1).min(haystack.len() - start);
    let window = &haystack[start..start + window_len];

    // Decode up to one haystack rune per needle rune. Invalid bytes
    // decode to the replacement character and will fail the comparison.
    let take = window_len.min(rune_count);
    let mut runes: Vec<char> = Vec::with_capacity(take);
    let mut consumed = 0usize;
    while runes.len() < take && consumed < window.len() {
        let (ch, size) = bstr::decode_utf8(&window[consumed..]);
        runes.push(ch.unwrap_or(char::REPLACEMENT_CHARACTER));
        consumed += size;
    }

    let mut i = 0;
    for c in needle.chars() {
        if i >= runes.len() {
            break;
        }
        let d = runes[i];
        // Check the exact rune first to skip the fold expansion on the
        // common path, then fall back to the full equivalence class.
        if d != c && !all_simple_fold(d).contains(&c) {
            return None;
        }
        i += 1;
    }

    Some([start, start + consumed])
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::bytes::Regex;

    fn collect_all(haystack: &str, needle: &str) -> Vec<[usize; 2]> {
        index_all(haystack.as_bytes(), needle.as_bytes()).collect()
    }

    fn ignore_case(haystack: &str, needle: &str, limit: isize) -> Vec<[usize; 2]> {
        index_all_ignore_case(haystack.as_bytes(), needle, limit, &PermuteCache::default())
    }

    #[test]
    fn test_extract_locations() {
        let locations = collect_all("test that this returns a match", "test");
        assert_eq!(locations[0][0], 0);
    }

    #[test]
    fn test_extract_locations_larger_offset() {
        let haystack = format!("{} test that this returns a match", "1".repeat(100));
        let locations = collect_all(&haystack, "test");
        assert_eq!(locations[0][0], 101);
    }

    #[test]
    fn test_extract_locations_limits() {
        assert_eq!(index_all_limit(b"test test", b"test", 1).len(), 1);
        assert_eq!(index_all_limit(b"test test test", b"test", 2).len(), 2);
        assert_eq!(index_all_limit(b"test test test", b"test", 3).len(), 3);
        assert_eq!(index_all_limit(b"test test test", b"test", -1).len(), 3);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(collect_all("", "test").is_empty());
        assert!(collect_all("test", "").is_empty());
        assert!(ignore_case("", "2", -1).is_empty());
        assert!(ignore_case("test", "", -1).is_empty());
    }

    #[test]
    fn test_drop_in_replacement_for_regex() {
        let haystack = "this is a test of how it works with tests and testing near the end test";
        let r = Regex::new("test").unwrap();
        let expected: Vec<[usize; 2]> = r
            .find_iter(haystack.as_bytes())
            .map(|m| [m.start(), m.end()])
            .collect();
        assert_eq!(collect_all(haystack, "test"), expected);
    }

    #[test]
    fn test_drop_in_replacement_no_match() {
        let r = Regex::new("test").unwrap();
        let haystack = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        assert_eq!(r.find_iter(haystack).count(), 0);
        assert!(index_all(haystack, b"test").next().is_none());
    }

    #[test]
    fn test_drop_in_replacement_adjacent() {
        let r = Regex::new("1").unwrap();
        let expected: Vec<[usize; 2]> = r
            .find_iter(b"111")
            .map(|m| [m.start(), m.end()])
            .collect();
        assert_eq!(collect_all("111", "1"), expected);
    }

    #[test]
    fn test_ignore_case_long_needle_no_match() {
        assert!(ignore_case("aaaaabbbbb", "aaaaaa", -1).is_empty());
    }

    #[test]
    fn test_ignore_case_long_needle_single_match() {
        assert_eq!(ignore_case("aaaaaabbbbb", "aaaaaa", -1).len(), 1);
    }

    #[test]
    fn test_ignore_case_limits() {
        assert_eq!(ignore_case("aaaa", "a", 1).len(), 1);
        assert_eq!(ignore_case("aaaa", "a", 2).len(), 2);
        assert_eq!(ignore_case("aaaa", "a", -1).len(), 4);
    }

    #[test]
    fn test_ignore_case_needle_longer_than_remainder() {
        assert!(ignore_case("veryuni", "unique", -1).is_empty());
        assert!(ignore_case("veryuni", "uniq", -1).is_empty());
        assert!(ignore_case("ve", "ee", -1).is_empty());
    }

    #[test]
    fn test_ignore_case_long_s_needle() {
        // ſ in the needle must match the plain ascii s in the haystack,
        // with the interval reflecting the one-byte haystack form
        let matches = ignore_case("a secret a", "ſecret", -1);
        assert_eq!(matches, vec![[2, 8]]);
        assert_eq!(&"a secret a"[2..8], "secret");
    }

    #[test]
    fn test_ignore_case_long_s_haystack() {
        // and the other way around: the two-byte ſ in the haystack makes
        // the matched interval longer than the needle
        let matches = ignore_case("a ſecret a", "secret", -1);
        assert_eq!(matches, vec![[2, 9]]);
        assert_eq!(&"a ſecret a"[2..9], "ſecret");
    }

    #[test]
    fn test_ignore_case_drop_in_replacement() {
        let r = Regex::new("1").unwrap();
        let expected: Vec<[usize; 2]> = r
            .find_iter(b"111")
            .map(|m| [m.start(), m.end()])
            .collect();
        assert_eq!(ignore_case("111", "1", -1), expected);
    }

    #[test]
    fn test_ignore_case_phrase_matches_regex() {
        let haystack = "Ten thousand a year! And TEN THOUSAND A YEAR besides. \
                        What fine things ten thousand a year could buy.";
        let matches = ignore_case(haystack, "ten thousand a year", -1);
        let r = regex::Regex::new("(?i)ten thousand a year").unwrap();
        assert_eq!(matches.len(), r.find_iter(haystack).count());
    }

    #[test]
    fn test_ignore_case_at_end() {
        let matches = ignore_case("testjava", "java", -1);
        assert_eq!(matches, vec![[4, 8]]);
    }

    #[test]
    fn test_ignore_case_symbols() {
        let haystack = "func AllSimpleFold(input rune) []rune {\n        res := []rune{}\n";
        let matches = ignore_case(haystack, "rune{}", -1);
        assert_eq!(matches, vec![[57, 63]]);
    }

    #[test]
    fn test_ignore_case_sharp_s() {
        let matches = ignore_case("this is my cs ß haystack", "ß", -1);
        assert_eq!(matches, vec![[14, 16]]);
    }

    #[test]
    fn test_ignore_case_limit_order_small_needle() {
        // With a limit the matches must come back in left-to-right order
        // to mirror what a capped regex find-all would report
        let matches = ignore_case("Test TEST test tEST", "te", 2);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0][0], 0);
        assert_eq!(matches[1][0], 5);
    }

    #[test]
    fn test_ignore_case_limit_order_large_needle() {
        let matches = ignore_case("Test TEST test tEST", "test", 2);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0][0], 0);
        assert_eq!(matches[1][0], 5);
    }

    #[test]
    fn test_ignore_case_wide_rune_haystack() {
        // 2048 copies of a two-byte rune with one needle embedded: the
        // prefix probe must find exactly one match without pathological
        // candidate explosion
        let mut haystack = "Ⱥ".repeat(1024);
        haystack.push_str("Ⱥtest");
        haystack.push_str(&"Ⱥ".repeat(1021));
        let matches = ignore_case(&haystack, "Ⱥtest", -1);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0][0], 1024 * 2);
    }

    #[test]
    fn test_permute_cache_reuse() {
        let cache = PermuteCache::new(2);
        let first = cache.permutations("te");
        let second = cache.permutations("te");
        assert!(Arc::ptr_eq(&first, &second));

        // Evict "te" by touching two fresher keys, then confirm the
        // recompute still returns the same permutation list
        cache.permutations("ab");
        cache.permutations("cd");
        let third = cache.permutations("te");
        assert_eq!(*first, *third);
    }
}
