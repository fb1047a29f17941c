//! TUI application state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::config::SearchOptions;
use crate::rank::document_term_frequency;
use crate::search::run_search;
use crate::snippet::extract_relevant;
use crate::text::PermuteCache;

/// One displayable search hit: location header plus a flattened snippet
/// with highlight intervals relative to it.
pub struct ResultRow {
    pub location: String,
    pub score: f64,
    pub line: usize,
    pub snippet: String,
    pub highlights: Vec<[usize; 2]>,
}

/// Result of a background search run.
pub struct SearchOutcome {
    pub rows: Result<Vec<ResultRow>, String>,
    pub query: String,
}

/// Search execution state for non-blocking search.
pub enum SearchState {
    Idle,
    Searching {
        query: String,
        receiver: Receiver<SearchOutcome>,
        start_time: Instant,
    },
}

/// Application state.
pub struct App {
    pub query: String,
    pub results: Vec<ResultRow>,
    pub selected: usize,
    pub status_message: String,
    options: Arc<SearchOptions>,
    /// Shared so repeated queries keep their case permutations warm.
    cache: Arc<PermuteCache>,
    search_state: SearchState,
    /// Cancel flag of the in-flight search, replaced on every keystroke
    /// so superseded searches abandon their walk.
    cancel: Option<Arc<AtomicBool>>,
}

impl App {
    pub fn new(options: Arc<SearchOptions>) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            status_message: "type to search".to_string(),
            options,
            cache: Arc::new(PermuteCache::default()),
            search_state: SearchState::Idle,
            cancel: None,
        }
    }

    /// Kick off a background search for the current query, cancelling
    /// any search still in flight.
    pub fn execute_search(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }

        if self.query.trim().is_empty() {
            self.results.clear();
            self.selected = 0;
            self.search_state = SearchState::Idle;
            self.status_message = "type to search".to_string();
            return;
        }

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));

        let (tx, rx) = mpsc::channel();
        let query = self.query.clone();
        let query_for_thread = query.clone();
        let options = Arc::clone(&self.options);
        let cache = Arc::clone(&self.cache);

        self.status_message = "searching...".to_string();
        self.search_state = SearchState::Searching {
            query,
            receiver: rx,
            start_time: Instant::now(),
        };

        thread::spawn(move || {
            let tokens: Vec<String> = query_for_thread
                .split_whitespace()
                .map(str::to_string)
                .collect();

            let rows = run_search(&options, &tokens, &cache, &cancel)
                .map(|found| build_rows(&found.results, options.snippet_length))
                .map_err(|e| e.to_string());

            let _ = tx.send(SearchOutcome {
                rows,
                query: query_for_thread,
            });
        });
    }

    /// Check whether a background search finished and fold its results
    /// in. Results for queries the user has already typed past are
    /// dropped.
    pub fn poll_search(&mut self) {
        let current_state = std::mem::replace(&mut self.search_state, SearchState::Idle);

        match current_state {
            SearchState::Searching {
                query,
                receiver,
                start_time,
            } => match receiver.try_recv() {
                Ok(outcome) => {
                    if outcome.query == self.query {
                        match outcome.rows {
                            Ok(rows) => {
                                let elapsed = start_time.elapsed();
                                self.status_message = format!(
                                    "{} results ({:.1}ms)",
                                    rows.len(),
                                    elapsed.as_secs_f64() * 1000.0
                                );
                                self.results = rows;
                                self.selected = 0;
                            }
                            Err(e) => {
                                self.status_message = format!("error: {e}");
                                self.results.clear();
                            }
                        }
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.search_state = SearchState::Searching {
                        query,
                        receiver,
                        start_time,
                    };
                }
                Err(TryRecvError::Disconnected) => {
                    self.status_message = "search thread terminated unexpectedly".to_string();
                }
            },
            SearchState::Idle => {}
        }
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.results.clear();
        self.selected = 0;
        self.status_message = "type to search".to_string();
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_page_down(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 10).min(self.results.len() - 1);
        }
    }

    pub fn select_page_up(&mut self) {
        self.selected = self.selected.saturating_sub(10);
    }

    /// Location and first line of the selected result, for handing to an
    /// editor.
    pub fn selected_target(&self) -> Option<(String, usize)> {
        self.results
            .get(self.selected)
            .map(|row| (row.location.clone(), row.line))
    }
}

/// Convert ranked jobs into display rows: one row per file carrying its
/// best snippet collapsed onto a single line.
fn build_rows(results: &[crate::search::FileJob], snippet_length: usize) -> Vec<ResultRow> {
    let document_frequency = document_term_frequency(results);

    results
        .iter()
        .map(|job| {
            let snippet = extract_relevant(job, &document_frequency, snippet_length)
                .into_iter()
                .next()
                .unwrap_or_default();

            let highlights = merge_intervals(
                job.match_locations
                    .values()
                    .flatten()
                    .filter(|m| m[0] >= snippet.pos[0] && m[1] <= snippet.pos[1])
                    .map(|m| [m[0] - snippet.pos[0], m[1] - snippet.pos[0]])
                    .collect(),
            );

            // Whitespace runs collapse to single spaces byte-for-byte so
            // the highlight offsets stay valid
            let snippet_text: String = String::from_utf8_lossy(&snippet.content)
                .chars()
                .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
                .collect();

            ResultRow {
                location: job.location.clone(),
                score: job.score,
                line: snippet.line_pos[0],
                snippet: snippet_text,
                highlights,
            }
        })
        .collect()
}

/// Merge overlapping or touching intervals into a sorted disjoint set.
fn merge_intervals(mut intervals: Vec<[usize; 2]>) -> Vec<[usize; 2]> {
    intervals.sort_unstable();

    let mut merged: Vec<[usize; 2]> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval[0] <= last[1] => last[1] = last[1].max(interval[1]),
            _ => merged.push(interval),
        }
    }
    merged
}
