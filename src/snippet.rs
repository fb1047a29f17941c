//! Snippet extraction: choosing which windows of a matched file to show.
//!
//! A sliding-window pass brute forces candidate windows around every
//! match location, scores each on how many matches it contains, how close
//! together and how rare they are, and then greedily keeps the best
//! non-overlapping windows. What counts as the "most relevant" snippet is
//! subjective and the scoring here is tuned by eye against real corpora,
//! so callers should not rely on the exact windows staying identical over
//! time.

use ahash::AHashMap;

use crate::search::FileJob;
use crate::text::{is_space, start_of_rune};

/// Maximum bytes either side of a window edge searched for whitespace to
/// avoid cutting words in half.
const SNIP_SIDE_MAX: usize = 10;
/// Boost for matches directly adjacent to the anchor, allowing for up to
/// two bytes of punctuation between them.
const PHRASE_HEAVY_BOOST: f64 = 20.0;
/// Boost when the anchor is bounded by whitespace.
const SPACE_BOUND_BOOST: f64 = 5.0;
/// Boost when the anchor's bytes equal the term exactly, case included.
const EXACT_MATCH_BOOST: f64 = 5.0;
/// Cap on how many match locations are considered, to bound CPU burn on
/// pathological files.
const RELEVANCE_CUTOFF: usize = 10_000;
/// At most this many snippets are returned per file.
const MAX_SNIPPETS: usize = 20;

/// A window of file content chosen for display.
#[derive(Debug, Clone, Default)]
pub struct Snippet {
    /// The bytes of the window, a copy of `content[pos[0]..pos[1]]`.
    pub content: Vec<u8>,
    /// Half-open byte interval of the window in the source file.
    pub pos: [usize; 2],
    /// Window score, unrelated to the owning document's score.
    pub score: f64,
    /// First and last 1-based line covered by the window.
    pub line_pos: [usize; 2],
}

/// One match location tagged with its term, flattened out of the map so
/// the window pass can slide over a sorted sequence.
#[derive(Debug, Clone, Copy)]
struct Relevant<'a> {
    word: &'a str,
    location: [usize; 2],
}

#[derive(Debug)]
struct CandidateWindow<'a> {
    pos: [usize; 2],
    score: f64,
    relevant: Vec<Relevant<'a>>,
}

/// Extract up to twenty non-overlapping windows of roughly `rel_length`
/// bytes centred on clusters of matches, best first.
///
/// `document_frequencies` is the corpus-wide occurrence count per term
/// (see [`crate::rank::document_term_frequency`]); it weights the scoring
/// so clusters of rare terms beat clusters of common ones.
pub fn extract_relevant(
    job: &FileJob,
    document_frequencies: &AHashMap<String, usize>,
    rel_length: usize,
) -> Vec<Snippet> {
    let wrap_length = rel_length / 2;
    let content = &job.content;

    let mut relevant = flatten_locations(job);
    relevant.truncate(RELEVANCE_CUTOFF);

    let mut candidates: Vec<CandidateWindow> = Vec::with_capacity(relevant.len());

    for i in 0..relevant.len() {
        let anchor = relevant[i];
        let mut window = CandidateWindow {
            pos: anchor.location,
            score: 0.0,
            relevant: vec![anchor],
        };

        // Slide left collecting matches that fit in the window; the
        // sequence is sorted so the first miss ends the walk
        for j in (0..i).rev() {
            if anchor.location[1] - relevant[j].location[0] > wrap_length {
                break;
            }
            window.pos[0] = relevant[j].location[0];
            window.relevant.push(relevant[j]);
        }

        // And the same to the right
        for j in i + 1..relevant.len() {
            if relevant[j].location[1] - anchor.location[0] > wrap_length {
                break;
            }
            window.pos[1] = relevant[j].location[1];
            window.relevant.push(relevant[j]);
        }

        // Pad a too-small window out to the target length
        let length = window.pos[1] - window.pos[0];
        if length < rel_length {
            let add = (rel_length - length) / 2;
            window.pos[0] = window.pos[0].saturating_sub(add);
            window.pos[1] = (window.pos[1] + add).min(content.len());
        }

        // Snap the edges to nearby whitespace so words are not cut in
        // half, and failing that retreat to a rune boundary
        let (start, start_found) = find_space_left(content, window.pos[0], SNIP_SIDE_MAX);
        let (end, end_found) = find_space_right(content, window.pos[1], SNIP_SIDE_MAX);
        window.pos = [start, end];

        if !start_found {
            while window.pos[0] != 0
                && window.pos[0] != content.len()
                && !start_of_rune(content[window.pos[0]])
            {
                window.pos[0] -= 1;
            }
        }
        if !end_found {
            while window.pos[1] != 0
                && window.pos[1] != content.len()
                && !start_of_rune(content[window.pos[1]])
            {
                window.pos[1] -= 1;
            }
        }

        // Close enough to either end of the file to just include it
        if window.pos[0] <= SNIP_SIDE_MAX {
            window.pos[0] = 0;
        }
        if content.len() - window.pos[1] <= SNIP_SIDE_MAX {
            window.pos[1] = content.len();
        }

        score_window(&mut window, content, &anchor, document_frequencies, rel_length);
        candidates.push(window);
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    // Keep the best windows that do not overlap anything already kept
    let mut picked: Vec<CandidateWindow> = Vec::new();
    let mut ranges: Vec<[usize; 2]> = Vec::new();
    for candidate in candidates {
        let overlaps = ranges.iter().any(|r| {
            (r[0] <= candidate.pos[0] && candidate.pos[0] <= r[1])
                || (r[0] <= candidate.pos[1] && candidate.pos[1] <= r[1])
        });
        if !overlaps {
            ranges.push(candidate.pos);
            picked.push(candidate);
        }
    }
    picked.truncate(MAX_SNIPPETS);

    picked
        .into_iter()
        .map(|window| {
            let slice = &content[window.pos[0]..window.pos[1]];
            let start_line = 1 + memchr::memchr_iter(b'\n', &content[..window.pos[0]]).count();
            let line_span = memchr::memchr_iter(b'\n', slice).count();

            Snippet {
                content: slice.to_vec(),
                pos: window.pos,
                score: window.score,
                line_pos: [start_line, start_line + line_span],
            }
        })
        .collect()
}

fn score_window(
    window: &mut CandidateWindow,
    content: &[u8],
    anchor: &Relevant,
    document_frequencies: &AHashMap<String, usize>,
    rel_length: usize,
) {
    // Every match the window holds counts for something
    window.score += window.relevant.len() as f64;

    // Matches close to the anchor add more, weighted down by how common
    // their term is so 'a' moves the needle less than 'cromulent'
    let mid = anchor.location[0];
    for v in &window.relevant {
        let p = (v.location[0] + v.location[1]) / 2;
        if mid.abs_diff(p) < rel_length / 3 {
            window.score += 100.0 / frequency(document_frequencies, v.word);
        }
    }

    // Phrase-heavy windows, where matches sit next to each other, get a
    // much higher weight; two bytes of slack lets 'cat. dog' count for a
    // search of cat dog
    for v in &window.relevant {
        if anchor.location[0].abs_diff(v.location[1]) <= 2
            || anchor.location[1].abs_diff(v.location[0]) <= 2
        {
            window.score += PHRASE_HEAVY_BOOST;
        }
    }

    // Whitespace on either side of the anchor suggests a whole word
    if anchor.location[0] >= 1 && space_at(content, anchor.location[0] - 1) {
        window.score += SPACE_BOUND_BOOST;
    }
    if anchor.location[1] < content.len() && space_at(content, anchor.location[1]) {
        window.score += SPACE_BOUND_BOOST;
    }

    // The search may ignore case but an exact-case hit still ranks a
    // little higher
    if &content[anchor.location[0]..anchor.location[1]] == anchor.word.as_bytes() {
        window.score += EXACT_MATCH_BOOST;
    }

    // Rarer anchors produce better windows, so the whole score is scaled
    // by how unique the anchor's term is
    window.score /= frequency(document_frequencies, anchor.word);
}

fn frequency(document_frequencies: &AHashMap<String, usize>, word: &str) -> f64 {
    document_frequencies.get(word).copied().unwrap_or(1).max(1) as f64
}

fn space_at(content: &[u8], i: usize) -> bool {
    let next = content.get(i + 1).copied().unwrap_or(0);
    start_of_rune(content[i]) && is_space(content[i], next)
}

/// Flatten the match map into a sequence sorted by start position.
fn flatten_locations(job: &FileJob) -> Vec<Relevant<'_>> {
    let mut relevant: Vec<Relevant> = Vec::new();
    for (word, locations) in &job.match_locations {
        for location in locations {
            relevant.push(Relevant {
                word,
                location: *location,
            });
        }
    }
    relevant.sort_by_key(|r| r.location[0]);
    relevant
}

/// Look right of `pos` up to `distance` bytes for whitespace, returning
/// the index found or the original position.
fn find_space_right(content: &[u8], pos: usize, distance: usize) -> (usize, bool) {
    if content.is_empty() {
        return (pos, false);
    }

    let end = (pos + distance).min(content.len() - 1);
    for i in pos..=end {
        if space_at(content, i) {
            return (i, true);
        }
    }
    (pos, false)
}

/// As [`find_space_right`] but looking left.
fn find_space_left(content: &[u8], pos: usize, distance: usize) -> (usize, bool) {
    if content.is_empty() || pos >= content.len() {
        return (pos, false);
    }

    for i in (pos.saturating_sub(distance)..=pos).rev() {
        if space_at(content, i) {
            return (i, true);
        }
    }
    (pos, false)
}
