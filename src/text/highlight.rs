//! Marker insertion around matched intervals.

use ahash::AHashMap;
use bstr::ByteSlice;

/// Splice `marker_in`/`marker_out` strings into `content` around the
/// supplied match locations, for example wrapping matches in
/// `<strong>`/`</strong>`. Locations accept the output of the literal
/// indexers or a regex find-all and may overlap or nest: intervals
/// sharing a start open one group whose end is the furthest of them, and
/// an interval starting inside an open group extends it rather than
/// opening another.
///
/// The walk is rune aware but byte-position honest, so it stays safe on
/// content that is not valid UTF-8; invalid bytes are carried through as
/// replacement characters and locations that point inside them simply
/// never line up.
pub fn highlight(
    content: &[u8],
    locations: &[[usize; 2]],
    marker_in: &str,
    marker_out: &str,
) -> String {
    // Most time here is spent checking positions against the locations,
    // so collapse them into a start -> furthest-end lookup first.
    let mut starts: AHashMap<usize, usize> = AHashMap::with_capacity(locations.len());
    for loc in locations {
        starts
            .entry(loc[0])
            .and_modify(|e| *e = (*e).max(loc[1]))
            .or_insert(loc[1]);
    }

    let mut result = String::with_capacity(content.len() + marker_in.len() + marker_out.len());
    let mut end: isize = -1;

    for (i, _, ch) in content.char_indices() {
        if let Some(&furthest) = starts.get(&i) {
            // Only open a group when not already inside one; a start in
            // the middle of an open group just pushes the end out, which
            // is how overlaps like t / tes against test resolve to the
            // longest match.
            if end <= 0 {
                result.push_str(marker_in);
            }
            end = end.max(furthest as isize - 1);
        }

        // Multi-byte runes skip over intermediate byte positions, so the
        // close for a group ending inside one has to happen before the
        // next rune is written.
        if end > 0 && (i as isize) > end {
            result.push_str(marker_out);
            end = 0;
        }

        result.push(ch);

        if i as isize == end && end != -1 {
            result.push_str(marker_out);
            end = 0;
        }
    }

    result
}
