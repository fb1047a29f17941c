#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use spelunk::text::PermuteCache;

#[derive(Arbitrary, Debug)]
struct Input {
    haystack: Vec<u8>,
    needle: String,
}

fuzz_target!(|input: Input| {
    if input.needle.chars().count() > 6 {
        return;
    }
    let cache = PermuteCache::default();
    let matches =
        spelunk::text::index_all_ignore_case(&input.haystack, &input.needle, -1, &cache);
    // Intervals stay in bounds and sorted
    for window in matches.windows(2) {
        assert!(window[0][0] <= window[1][0]);
    }
    for m in &matches {
        assert!(m[0] <= m[1]);
        assert!(m[1] <= input.haystack.len());
    }
});
