#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Tokenize like the CLI does and parse; must never panic
    let tokens: Vec<String> = data.split_whitespace().map(str::to_string).collect();
    let (remaining, _fuzzy) = spelunk::query::pre_parse(&tokens);
    let _ = spelunk::query::parse_query(&remaining);
});
