//! The search pipeline.
//!
//! Data flows strictly left to right through bounded queues:
//!
//! ```text
//! [walker] -> paths -> [reader pool] -> jobs -> [searcher pool] -> matches -> collect
//! ```
//!
//! Each stage owns a pool of OS threads draining its input channel; a
//! stage's output closes once all of its workers finish (their senders
//! drop), so shutdown ripples down the pipeline in order. Arrival order
//! at the collector is nondeterministic; the ranker's sort restores a
//! total order before anything is shown.

pub mod reader;
pub mod searcher;
pub mod types;
pub mod walker;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use crossbeam_channel::bounded;

use crate::config::SearchOptions;
use crate::query::{parse_query, pre_parse};
use crate::rank;
use crate::text::PermuteCache;
pub use types::FileJob;

/// Capacity of the walker's path queue. Paths are tiny so this can run
/// well ahead of the readers.
const PATH_QUEUE_SIZE: usize = 1000;

/// Ranked results of one search run.
pub struct SearchResults {
    /// Matching files, best first.
    pub results: Vec<FileJob>,
    /// How many files were read and considered, matching or not.
    pub corpus_count: usize,
}

fn num_cpus() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Run the full pipeline for a raw token list and return ranked results.
///
/// `cancel` is polled cooperatively between directory entries and files;
/// setting it abandons remaining work and returns whatever survived. The
/// permutation cache is shared so interactive callers keep their warm
/// needles across runs.
pub fn run_search(
    options: &Arc<SearchOptions>,
    raw_query: &[String],
    cache: &Arc<PermuteCache>,
    cancel: &Arc<AtomicBool>,
) -> Result<SearchResults> {
    let (query, filename_fuzzy) = pre_parse(raw_query);
    let terms = Arc::new(parse_query(&query));

    let cpus = num_cpus();
    let workers = cpus.max(2);
    let (path_tx, path_rx) = bounded(PATH_QUEUE_SIZE);
    let (job_tx, job_rx) = bounded(cpus);
    let (match_tx, match_rx) = bounded(cpus);

    let file_count = Arc::new(AtomicUsize::new(0));

    let walker_handle = walker::spawn_walker(Arc::clone(options), path_tx, Arc::clone(cancel));

    let reader_handles = reader::spawn_readers(
        path_rx,
        job_tx,
        Arc::clone(options),
        filename_fuzzy,
        Arc::clone(&file_count),
        Arc::clone(cancel),
        workers,
    );

    let searcher_handles = searcher::spawn_searchers(
        job_rx,
        match_tx,
        terms,
        Arc::clone(options),
        Arc::clone(cache),
        Arc::clone(cancel),
        workers,
    );

    // The spawn functions moved their channel ends into the workers, so
    // this receive loop ends once the last searcher finishes
    let mut results: Vec<FileJob> = match_rx.iter().collect();

    walker_handle.join().expect("walker thread panicked");
    for handle in reader_handles {
        handle.join().expect("reader thread panicked");
    }
    for handle in searcher_handles {
        handle.join().expect("searcher thread panicked");
    }

    let corpus_count = file_count.load(Ordering::Relaxed);
    rank::rank_results(
        options.ranker.into(),
        corpus_count,
        &mut results,
        cache,
    );

    Ok(SearchResults {
        results,
        corpus_count,
    })
}
