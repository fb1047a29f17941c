//! # spelunk - recursive code search
//!
//! spelunk searches a source tree with a small query language layered
//! over fast literal matching: bare terms AND together, `"quoted
//! phrases"` match exactly, `/regex/` terms hit the regex engine, `NOT`
//! negates the following term, `term~1`/`term~2` match within an edit
//! distance, and `file:pat` narrows which files are searched at all.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`query`] - Query parsing and fuzzy term expansion
//! - [`text`] - Literal indexing, case folding and highlighting
//! - [`search`] - The walker/reader/searcher pipeline
//! - [`rank`] - Result scoring and ordering
//! - [`snippet`] - Relevant-window extraction
//! - [`output`] - Result formatting (text, json, vimgrep)
//! - [`tui`] - Interactive terminal UI
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! use spelunk::config::SearchOptions;
//! use spelunk::search::run_search;
//! use spelunk::text::PermuteCache;
//!
//! let options = Arc::new(SearchOptions::default());
//! let cache = Arc::new(PermuteCache::default());
//! let cancel = Arc::new(AtomicBool::new(false));
//!
//! let query = vec!["pride".to_string(), "NOT".to_string(), "prejudice".to_string()];
//! let found = run_search(&options, &query, &cache, &cancel).unwrap();
//! for result in &found.results {
//!     println!("{} ({:.3})", result.location, result.score);
//! }
//! ```
//!
//! ## Performance
//!
//! Content matching never touches the regex engine unless the query asks
//! for it: case-sensitive terms run straight substring scans, and
//! case-insensitive terms expand into their Unicode case-fold
//! permutations and scan each literal form, with a long-needle prefix
//! probe keeping the expansion bounded. Files stream through bounded
//! queues between a reader pool and a searcher pool sized to the
//! machine, so memory stays flat regardless of tree size.

pub mod config;
pub mod output;
pub mod query;
pub mod rank;
pub mod search;
pub mod snippet;
pub mod text;
pub mod tui;
