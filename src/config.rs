//! Search configuration.
//!
//! All options are resolved once at startup (from the CLI) and shared
//! read-only across the pipeline via `Arc`. Nothing in here mutates after
//! construction.

use std::path::PathBuf;

use clap::ValueEnum;

/// Output format for console searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Vimgrep,
}

/// Which ranking algorithm scores the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RankerKind {
    Simple,
    Tfidf,
    Tfidf2,
    /// Seems to be the best default.
    #[default]
    Bm25,
}

/// Immutable options controlling discovery, filtering and presentation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Directory to search from.
    pub dir: PathBuf,
    /// Ascend to the nearest .git or .hg before recursing.
    pub find_root: bool,
    /// Make literal matching case sensitive.
    pub case_sensitive: bool,
    /// Search binary files instead of rejecting on NUL bytes.
    pub include_binary: bool,
    /// Search minified files instead of rejecting on line length.
    pub include_minified: bool,
    /// Include hidden files and directories.
    pub include_hidden: bool,
    /// Disable .gitignore processing.
    pub ignore_gitignore: bool,
    /// Disable .ignore processing.
    pub ignore_ignorefile: bool,
    /// Only process files with these extensions (case sensitive).
    pub allow_list_extensions: Vec<String>,
    /// Directory names never descended into.
    pub path_denylist: Vec<String>,
    /// Case sensitive substrings of locations to skip.
    pub location_exclude_patterns: Vec<String>,
    /// Average bytes per line above which a file counts as minified.
    pub minified_line_byte_length: usize,
    /// Cap on how much of any file is read.
    pub max_read_size_bytes: u64,
    /// Bytes of context shown per snippet.
    pub snippet_length: usize,
    /// Snippets shown per file.
    pub snippet_count: usize,
    /// Cap on matches recorded per term per file, negative for unbounded.
    pub match_limit: isize,
    pub ranker: RankerKind,
    pub format: OutputFormat,
    /// File to write output to instead of stdout (json only).
    pub output: Option<PathBuf>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            find_root: false,
            case_sensitive: false,
            include_binary: false,
            include_minified: false,
            include_hidden: false,
            ignore_gitignore: false,
            ignore_ignorefile: false,
            allow_list_extensions: Vec::new(),
            path_denylist: vec![
                ".git".to_string(),
                ".hg".to_string(),
                ".svn".to_string(),
                ".jj".to_string(),
            ],
            location_exclude_patterns: Vec::new(),
            minified_line_byte_length: 255,
            max_read_size_bytes: 1_000_000,
            snippet_length: 300,
            snippet_count: 1,
            match_limit: -1,
            ranker: RankerKind::default(),
            format: OutputFormat::default(),
            output: None,
        }
    }
}
