use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use spelunk::config::{OutputFormat, RankerKind, SearchOptions};
use spelunk::text::PermuteCache;
use spelunk::{output, search, tui};

#[derive(Parser)]
#[command(name = "spelunk")]
#[command(version)]
#[command(about = "Recursive code search with boolean, regex and fuzzy queries")]
#[command(long_about = "spelunk recursively searches the current directory using some \
boolean logic optionally combined with regular expressions.

Works via command line where passed in arguments are the search terms,
or in an interactive TUI mode when run with no arguments.

Searches by default use AND logic for all terms
 - exact match using quotes \"find this\"
 - fuzzy match within 1 or 2 edits fuzzy~1 fuzzy~2
 - negate using NOT such as pride NOT prejudice
 - regex with toothpick syntax /pr[e-i]de/

Files searched can be filtered by adding file:test or filename:.go
which fuzzy match candidate filenames.

Example search using most of the syntax
 - darcy NOT collins wickham~1 \"ten thousand a year\" /pr[e-i]de/ file:test")]
struct Cli {
    /// Search terms; omit to start the interactive TUI
    terms: Vec<String>,

    /// Directory to search, defaults to the current working directory
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Attempt to find the root of the repository by traversing in
    /// reverse looking for .git or .hg
    #[arg(short = 'r', long)]
    find_root: bool,

    /// Make the search case sensitive
    #[arg(short = 'c', long)]
    case_sensitive: bool,

    /// Disable binary file detection and search binary files
    #[arg(long)]
    binary: bool,

    /// Include minified files
    #[arg(long)]
    min: bool,

    /// Include hidden files
    #[arg(long)]
    hidden: bool,

    /// Disable .gitignore file logic
    #[arg(long)]
    no_gitignore: bool,

    /// Disable .ignore file logic
    #[arg(long)]
    no_ignore: bool,

    /// Limit to file extensions (N.B. case sensitive) [comma separated
    /// list: e.g. go,java,js]
    #[arg(short = 'i', long, value_delimiter = ',')]
    include_ext: Vec<String>,

    /// Directories to exclude
    #[arg(long, value_delimiter = ',', default_values_t = [".git".to_string(), ".hg".to_string(), ".svn".to_string(), ".jj".to_string()])]
    exclude_dir: Vec<String>,

    /// Locations matching these case sensitive patterns are ignored
    /// [comma separated list: e.g. vendor,_test.go]
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude_pattern: Vec<String>,

    /// Number of bytes per average line for a file to be considered
    /// minified
    #[arg(long, default_value_t = 255)]
    min_line_length: usize,

    /// Number of bytes to read into a file with the remaining content
    /// ignored
    #[arg(long, default_value_t = 1_000_000)]
    max_read_size_bytes: u64,

    /// Size of the snippet to display
    #[arg(short = 'n', long, default_value_t = 300)]
    snippet_length: usize,

    /// Number of snippets to display
    #[arg(short = 's', long, default_value_t = 1)]
    snippet_count: usize,

    /// Maximum matches recorded per term per file, -1 for unbounded
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    match_limit: isize,

    /// Set output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Set ranking algorithm
    #[arg(long, value_enum, default_value_t = RankerKind::Bm25)]
    ranker: RankerKind,

    /// Output filename (default stdout, json format only)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> (SearchOptions, Vec<String>, bool) {
        let verbose = self.verbose;
        let options = SearchOptions {
            dir: self.dir,
            find_root: self.find_root,
            case_sensitive: self.case_sensitive,
            include_binary: self.binary,
            include_minified: self.min,
            include_hidden: self.hidden,
            ignore_gitignore: self.no_gitignore,
            ignore_ignorefile: self.no_ignore,
            allow_list_extensions: self.include_ext,
            path_denylist: self.exclude_dir,
            location_exclude_patterns: self.exclude_pattern,
            minified_line_byte_length: self.min_line_length,
            max_read_size_bytes: self.max_read_size_bytes,
            snippet_length: self.snippet_length,
            snippet_count: self.snippet_count,
            match_limit: self.match_limit,
            ranker: self.ranker,
            format: self.format,
            output: self.output,
        };
        (options, self.terms, verbose)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (options, terms, verbose) = cli.into_options();

    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Arc::new(options);

    if terms.is_empty() {
        return tui::run(options);
    }

    run_console_search(&options, &terms)
}

fn run_console_search(options: &Arc<SearchOptions>, terms: &[String]) -> Result<()> {
    let cache = Arc::new(PermuteCache::default());
    let cancel = Arc::new(AtomicBool::new(false));

    let found = search::run_search(options, terms, &cache, &cancel)?;

    match options.format {
        OutputFormat::Json => output::print_json(
            &found.results,
            options.snippet_length,
            options.output.as_deref(),
        ),
        OutputFormat::Vimgrep => output::print_vimgrep(&found.results, options.snippet_count),
        OutputFormat::Text => output::print_text(
            &found.results,
            options.snippet_length,
            options.snippet_count,
        ),
    }
}
