#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    content: Vec<u8>,
    locations: Vec<[usize; 2]>,
}

fuzz_target!(|input: Input| {
    // Arbitrary bytes and arbitrary (possibly nonsense) locations must
    // never panic or slice out of bounds
    let _ = spelunk::text::highlight(&input.content, &input.locations, "<<", ">>");
});
