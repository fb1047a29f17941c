//! Result ranking.
//!
//! Applies the selected scoring algorithm over the collected result set,
//! boosts matches that also appear in the file path, and sorts into the
//! deterministic order results are displayed in. The algorithms are not
//! textbook-exact: document frequencies are computed over the matched
//! result set rather than the whole corpus, and word counts are
//! approximated from byte counts, both deliberate trade-offs to avoid a
//! second pass over file contents.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::config::RankerKind;
use crate::search::FileJob;
use crate::text::{index_all_ignore_case, PermuteCache};

/// Base multiplier for path matches.
const LOCATION_BOOST_VALUE: f64 = 0.05;
/// Floor given to zero or NaN scores before location boosting.
const DEFAULT_SCORE_VALUE: f64 = 0.01;
/// Approximate words in a document as bytes divided by this.
const BYTES_WORD_DIVISOR: usize = 2;

/// Ranking algorithm plus the constants it runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ranker {
    /// Keep the searcher's match-count score untouched.
    Simple,
    /// Classic TF-IDF.
    TfIdf,
    /// Lucene-flavoured TF-IDF with sqrt damping.
    TfIdfLucene,
    Bm25 {
        k1: f64,
        b: f64,
    },
}

impl From<RankerKind> for Ranker {
    fn from(kind: RankerKind) -> Self {
        match kind {
            RankerKind::Simple => Ranker::Simple,
            RankerKind::Tfidf => Ranker::TfIdf,
            RankerKind::Tfidf2 => Ranker::TfIdfLucene,
            RankerKind::Bm25 => Ranker::Bm25 { k1: 1.2, b: 0.75 },
        }
    }
}

/// Score and sort the results in place. `corpus_count` is the number of
/// files read in total, which the IDF terms are computed against.
pub fn rank_results(
    ranker: Ranker,
    corpus_count: usize,
    results: &mut [FileJob],
    cache: &PermuteCache,
) {
    match ranker {
        Ranker::Simple => {
            // Already ranked by number of matches
        }
        Ranker::TfIdf => {
            let frequencies = document_frequency(results);
            rank_tfidf(corpus_count, results, &frequencies, true);
            rank_location(results, cache);
        }
        Ranker::TfIdfLucene => {
            let frequencies = document_frequency(results);
            rank_tfidf(corpus_count, results, &frequencies, false);
            rank_location(results, cache);
        }
        Ranker::Bm25 { k1, b } => {
            let frequencies = document_frequency(results);
            rank_bm25(corpus_count, results, &frequencies, k1, b);
            rank_location(results, cache);
        }
    }

    sort_results(results);
}

fn document_words(job: &FileJob) -> f64 {
    // At least 1 to dodge divide by zero on tiny files
    (job.bytes / BYTES_WORD_DIVISOR).max(1) as f64
}

/// TF-IDF over the matched set. With `classic` false the Lucene
/// modification is applied: sqrt(tf) * idf / sqrt(words).
fn rank_tfidf(
    corpus_count: usize,
    results: &mut [FileJob],
    frequencies: &AHashMap<String, usize>,
    classic: bool,
) {
    results.par_iter_mut().for_each(|job| {
        let words = document_words(job);

        let mut weight = 0.0;
        for (word, locations) in &job.match_locations {
            // Keys searched but never matched (negated targets) carry no
            // weight and would divide by a zero document frequency
            if locations.is_empty() {
                continue;
            }

            let tf = locations.len() as f64 / words;
            let idf = (corpus_count as f64 / frequencies[word] as f64).log10();

            if classic {
                weight += tf * idf;
            } else {
                weight += tf.sqrt() * idf * (1.0 / words.sqrt());
            }
        }

        job.score = weight;
    });
}

/// Okapi BM25 over the matched set:
///
/// ```text
///              IDF * TF * (k1 + 1)
/// BM25 = sum -----------------------------
///            TF + k1 * (1 - b + b * D / L)
/// ```
fn rank_bm25(
    corpus_count: usize,
    results: &mut [FileJob],
    frequencies: &AHashMap<String, usize>,
    k1: f64,
    b: f64,
) {
    // BM25 needs the average document length across the result set
    let average_document_words = results
        .iter()
        .map(document_words)
        .sum::<f64>()
        / results.len().max(1) as f64;

    results.par_iter_mut().for_each(|job| {
        let words = document_words(job);

        let mut weight = 0.0;
        for (word, locations) in &job.match_locations {
            if locations.is_empty() {
                continue;
            }

            let tf = locations.len() as f64 / words;
            let idf = (corpus_count as f64 / frequencies[word] as f64).log10();

            let step1 = idf * tf * (k1 + 1.0);
            let step2 = tf + k1 * (1.0 - b + (b * words / average_document_words));

            weight += step1 / step2;
        }

        job.score = weight;
    });
}

/// Boost results whose search terms also appear in the file location.
/// Not TF-IDF or anything fancy, just checks and multipliers: a search
/// for test should rank /test/test.go above /test/other.go.
fn rank_location(results: &mut [FileJob], cache: &PermuteCache) {
    results.par_iter_mut().for_each(|job| {
        let location = job.location.as_bytes();

        let mut found_terms = 0;
        for key in job.match_locations.keys() {
            let hits = index_all_ignore_case(location, key, -1, cache);
            if hits.is_empty() {
                continue;
            }
            found_terms += 1;

            // A score of zero would shrug off multiplication, so give it
            // a floor that lets the boosts order path-only matches
            if job.score == 0.0 || job.score.is_nan() {
                job.score = DEFAULT_SCORE_VALUE;
            }

            // Reward more and longer matches
            job.score *= 1.0 + LOCATION_BOOST_VALUE * hits.len() as f64 * key.len() as f64;

            // Prefer matches near the front of the path
            let earliest = hits.iter().map(|h| h[0]).min().unwrap_or(0);
            job.score -= 0.02 * earliest as f64;
        }

        if found_terms > 1 {
            job.score *= 1.0 + LOCATION_BOOST_VALUE * found_terms as f64;
        }
    });
}

/// Number of results in which each term matched at least once. Used for
/// the IDF side of ranking.
pub fn document_frequency(results: &[FileJob]) -> AHashMap<String, usize> {
    let mut frequencies = AHashMap::new();
    for job in results {
        for (term, locations) in &job.match_locations {
            if !locations.is_empty() {
                *frequencies.entry(term.clone()).or_insert(0) += 1;
            }
        }
    }
    frequencies
}

/// Total occurrences of each term across all results, as opposed to the
/// per-document counting above. Used by snippet extraction.
pub fn document_term_frequency(results: &[FileJob]) -> AHashMap<String, usize> {
    let mut frequencies = AHashMap::new();
    for job in results {
        for (term, locations) in &job.match_locations {
            *frequencies.entry(term.clone()).or_insert(0) += locations.len();
        }
    }
    frequencies
}

/// Sort for display: score descending, then location ascending so equal
/// scores come out in a stable, deterministic order. Locations are
/// unique paths so no further tie-break is needed.
fn sort_results(results: &mut [FileJob]) {
    results.sort_unstable_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.location.cmp(&b.location))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(location: &str, bytes: usize, term: &str, count: usize) -> FileJob {
        let mut job = FileJob {
            location: location.to_string(),
            filename: location.rsplit('/').next().unwrap_or(location).to_string(),
            bytes,
            score: count as f64,
            ..Default::default()
        };
        let locations: Vec<[usize; 2]> = (0..count).map(|i| [i * 10, i * 10 + term.len()]).collect();
        job.match_locations.insert(term.to_string(), locations);
        job
    }

    fn rank(ranker: Ranker, results: &mut [FileJob]) {
        // A corpus larger than the result set keeps the IDF terms
        // positive, as in real runs where most files match nothing
        rank_results(ranker, 10, results, &PermuteCache::default());
    }

    #[test]
    fn test_simple_keeps_search_scores() {
        let mut results = vec![job("a.txt", 100, "term", 2), job("b.txt", 100, "term", 5)];
        rank(Ranker::Simple, &mut results);
        assert_eq!(results[0].score, 5.0);
        assert_eq!(results[1].score, 2.0);
    }

    #[test]
    fn test_bm25_prefers_denser_documents() {
        let mut results = vec![
            job("sparse.txt", 10_000, "term", 2),
            job("dense.txt", 200, "term", 2),
        ];
        rank(Ranker::Bm25 { k1: 1.2, b: 0.75 }, &mut results);
        assert_eq!(results[0].location, "dense.txt");
    }

    #[test]
    fn test_tfidf_overrides_search_score() {
        let mut results = vec![job("a.txt", 100, "term", 3)];
        let before = results[0].score;
        rank(Ranker::TfIdf, &mut results);
        assert_ne!(results[0].score, before);
    }

    #[test]
    fn test_tfidf_variants_differ() {
        let mut classic = vec![job("a.txt", 5000, "term", 3)];
        let mut lucene = vec![job("a.txt", 5000, "term", 3)];
        rank(Ranker::TfIdf, &mut classic);
        rank(Ranker::TfIdfLucene, &mut lucene);
        assert_ne!(classic[0].score, lucene[0].score);
    }

    #[test]
    fn test_location_boost_prefers_path_match() {
        // Same content signal, but one file carries the term in its path
        let mut results = vec![
            job("src/other.go", 400, "config", 2),
            job("src/config.go", 400, "config", 2),
        ];
        rank(Ranker::Bm25 { k1: 1.2, b: 0.75 }, &mut results);
        assert_eq!(results[0].location, "src/config.go");
    }

    #[test]
    fn test_sort_ties_break_by_location() {
        let mut results = vec![
            job("b.txt", 100, "term", 1),
            job("a.txt", 100, "term", 1),
            job("c.txt", 100, "term", 1),
        ];
        rank(Ranker::Simple, &mut results);
        let order: Vec<&str> = results.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(order, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_document_frequency_ignores_empty_keys() {
        let mut with_empty = job("a.txt", 100, "term", 1);
        with_empty
            .match_locations
            .insert("missing".to_string(), Vec::new());

        let frequencies = document_frequency(&[with_empty]);
        assert_eq!(frequencies.get("term"), Some(&1));
        assert_eq!(frequencies.get("missing"), None);
    }

    #[test]
    fn test_document_term_frequency_sums_occurrences() {
        let results = vec![job("a.txt", 100, "term", 3), job("b.txt", 100, "term", 2)];
        let frequencies = document_term_frequency(&results);
        assert_eq!(frequencies["term"], 5);
    }

    #[test]
    fn test_zero_hit_terms_do_not_poison_scores() {
        // A negated target leaves an empty location list behind; scoring
        // must not produce NaN from it
        let mut clean = job("a.txt", 100, "pride", 2);
        clean
            .match_locations
            .insert("prejudice".to_string(), Vec::new());
        let mut results = vec![clean];
        rank(Ranker::Bm25 { k1: 1.2, b: 0.75 }, &mut results);
        assert!(results[0].score.is_finite());
    }

    #[test]
    fn test_empty_results() {
        let mut results: Vec<FileJob> = Vec::new();
        rank(Ranker::Bm25 { k1: 1.2, b: 0.75 }, &mut results);
        assert!(results.is_empty());
    }
}
