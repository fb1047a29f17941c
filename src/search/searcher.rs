//! Searcher worker pool: the hot path.
//!
//! Each worker drains file jobs and walks the parsed query left to right
//! against the content, recording match locations per term. Query
//! semantics are a flat AND: every term that actually searched must have
//! matched, unless the preceding term was a `NOT`, in which case a match
//! fails the whole file. Only files ending with a positive score go
//! downstream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use ahash::AHashMap;
use crossbeam_channel::{Receiver, Sender};
use regex::bytes::Regex;

use crate::config::SearchOptions;
use crate::query::{fuzzy_distance_one, fuzzy_distance_two, SearchTerm, TermKind};
use crate::search::types::FileJob;
use crate::text::{index_all_ignore_case, index_all_limit, PermuteCache};

/// Searches one [`FileJob`] at a time against a parsed query.
pub struct Searcher {
    terms: Arc<Vec<SearchTerm>>,
    options: Arc<SearchOptions>,
    cache: Arc<PermuteCache>,
    /// Compiled regex terms, keyed by pattern. A `None` records a pattern
    /// that failed to compile so it is only attempted once.
    regexes: AHashMap<String, Option<Regex>>,
}

impl Searcher {
    pub fn new(
        terms: Arc<Vec<SearchTerm>>,
        options: Arc<SearchOptions>,
        cache: Arc<PermuteCache>,
    ) -> Self {
        Self {
            terms,
            options,
            cache,
            regexes: AHashMap::new(),
        }
    }

    /// Apply every term to the job, populating match locations and the
    /// provisional score. Returns true when the job should be forwarded.
    pub fn search(&mut self, job: &mut FileJob) -> bool {
        let terms = Arc::clone(&self.terms);
        for (i, needle) in terms.iter().enumerate() {
            let mut did_search = false;

            match needle.kind {
                TermKind::Default | TermKind::Quoted => {
                    did_search = true;
                    let locations = self.find_literal(&job.content, &needle.term);
                    job.match_locations.insert(needle.term.clone(), locations);
                }
                TermKind::Regex => {
                    // A pattern that does not compile is silently skipped,
                    // as if the term were never part of the query
                    if let Some(re) = self.regex_for(&needle.term) {
                        did_search = true;
                        let locations = regex_locations(&re, &job.content, self.options.match_limit);
                        job.match_locations.insert(needle.term.clone(), locations);
                    }
                }
                TermKind::Fuzzy1 | TermKind::Fuzzy2 => {
                    did_search = true;
                    let variants = if needle.kind == TermKind::Fuzzy1 {
                        fuzzy_distance_one(&needle.term)
                    } else {
                        fuzzy_distance_two(&needle.term)
                    };

                    let mut locations = Vec::new();
                    for variant in &variants {
                        locations.extend(self.find_literal(&job.content, variant));
                    }
                    locations.sort_unstable();
                    locations.dedup();
                    job.match_locations.insert(needle.term.clone(), locations);
                }
                // NOT itself searches nothing; it flips the meaning of
                // whatever comes next
                TermKind::Negated => {}
            }

            if did_search {
                let found = job
                    .match_locations
                    .get(&needle.term)
                    .map(Vec::len)
                    .unwrap_or(0);

                if i != 0 && terms[i - 1].kind == TermKind::Negated {
                    // A negated term fails the file by matching
                    if found != 0 {
                        job.score = 0.0;
                        break;
                    }
                } else if found == 0 {
                    // AND semantics: every searched term must hit
                    job.score = 0.0;
                    break;
                }

                // Count-based score as a fallback ranking; the real
                // ranker almost always overwrites this
                job.score += found as f64;
            }
        }

        job.score != 0.0
    }

    fn find_literal(&self, content: &[u8], term: &str) -> Vec<[usize; 2]> {
        if self.options.case_sensitive {
            index_all_limit(content, term.as_bytes(), self.options.match_limit)
        } else {
            index_all_ignore_case(content, term, self.options.match_limit, &self.cache)
        }
    }

    fn regex_for(&mut self, pattern: &str) -> Option<Regex> {
        self.regexes
            .entry(pattern.to_string())
            .or_insert_with(|| Regex::new(pattern).ok())
            .clone()
    }
}

fn regex_locations(re: &Regex, content: &[u8], limit: isize) -> Vec<[usize; 2]> {
    let matches = re.find_iter(content).map(|m| [m.start(), m.end()]);
    if limit < 0 {
        matches.collect()
    } else {
        matches.take(limit as usize).collect()
    }
}

/// Spawn the searcher pool over the reader's output channel.
pub fn spawn_searchers(
    input: Receiver<FileJob>,
    output: Sender<FileJob>,
    terms: Arc<Vec<SearchTerm>>,
    options: Arc<SearchOptions>,
    cache: Arc<PermuteCache>,
    cancel: Arc<AtomicBool>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|_| {
            let input = input.clone();
            let output = output.clone();
            let mut searcher = Searcher::new(
                Arc::clone(&terms),
                Arc::clone(&options),
                Arc::clone(&cache),
            );
            let cancel = Arc::clone(&cancel);

            std::thread::spawn(move || {
                for mut job in input.iter() {
                    if cancel.load(Ordering::Relaxed) {
                        continue;
                    }
                    if searcher.search(&mut job) && output.send(job).is_err() {
                        break;
                    }
                }
            })
        })
        .collect()
}
