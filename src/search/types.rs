//! Types flowing through the search pipeline.

use ahash::AHashMap;

/// A candidate file as it moves reader -> searcher -> summarizer. Each
/// stage owns the job exclusively while processing it; handing it to the
/// next queue is a move.
#[derive(Debug, Clone, Default)]
pub struct FileJob {
    pub filename: String,
    pub extension: String,
    /// Full path as presented to the user and searched by the location
    /// boost.
    pub location: String,
    /// Raw file bytes, capped at the configured read size. Not
    /// necessarily valid UTF-8.
    pub content: Vec<u8>,
    /// Length of content, kept as a cheap proxy for document length.
    pub bytes: usize,
    /// Relevance score. The searcher seeds it with the match count and
    /// the ranker overwrites it.
    pub score: f64,
    /// Term text -> half-open `[start, end)` byte intervals, sorted by
    /// start. A key is present exactly when a search ran for that term,
    /// even if it found nothing.
    pub match_locations: AHashMap<String, Vec<[usize; 2]>>,
}
