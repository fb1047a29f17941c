//! Result formatting for console searches: human-readable text with
//! highlighted snippets, a JSON document per run, or vimgrep quickfix
//! lines.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::rank::document_term_frequency;
use crate::search::FileJob;
use crate::snippet::{extract_relevant, Snippet};
use crate::text::highlight;

/// Snippet length forced in vimgrep format, since the quickfix window
/// puts each hit on its own line.
const VIMGREP_SNIPPET_LENGTH: usize = 50;

const ANSI_MATCH_START: &str = "\x1b[1;31m";
const ANSI_RESET: &str = "\x1b[0m";

fn no_color() -> bool {
    std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) || !io::stdout().is_terminal()
}

/// Match locations falling entirely inside the snippet, shifted to be
/// relative to its start.
fn locations_in_snippet(job: &FileJob, snippet: &Snippet) -> Vec<[usize; 2]> {
    let mut locations = Vec::new();
    for matches in job.match_locations.values() {
        for m in matches {
            if m[0] >= snippet.pos[0] && m[1] <= snippet.pos[1] {
                locations.push([m[0] - snippet.pos[0], m[1] - snippet.pos[0]]);
            }
        }
    }
    locations
}

/// Per file: a magenta `location Lines a-b (score)` header, then each
/// snippet with matches highlighted, separated by a snip divider.
pub fn print_text(results: &[FileJob], snippet_length: usize, snippet_count: usize) -> Result<()> {
    let plain = no_color();
    let (fmt_begin, fmt_end) = if plain {
        ("", "")
    } else {
        (ANSI_MATCH_START, ANSI_RESET)
    };

    let choice = if plain {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let mut stdout = StandardStream::stdout(choice);

    let document_frequency = document_term_frequency(results);

    for job in results {
        let mut snippets = extract_relevant(job, &document_frequency, snippet_length);
        snippets.truncate(snippet_count);

        let mut lines = String::new();
        for snippet in &snippets {
            lines.push_str(&format!("{}-{} ", snippet.line_pos[0], snippet.line_pos[1]));
        }

        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        writeln!(stdout, "{} Lines {}({:.3})", job.location, lines, job.score)?;
        stdout.reset()?;

        for (i, snippet) in snippets.iter().enumerate() {
            let locations = locations_in_snippet(job, snippet);

            // A zero window means a filename-only match with nothing to
            // highlight
            let display = if snippet.pos != [0, 0] {
                highlight(&snippet.content, &locations, fmt_begin, fmt_end)
            } else {
                String::from_utf8_lossy(&snippet.content).into_owned()
            };

            writeln!(stdout, "{display}")?;
            writeln!(stdout)?;
            if i != snippets.len() - 1 {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::White)).set_bold(true))?;
                writeln!(stdout, "……………snip……………")?;
                stdout.reset()?;
                writeln!(stdout)?;
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonResult {
    filename: String,
    location: String,
    content: String,
    score: f64,
    matchlocations: Vec<[usize; 2]>,
}

/// One JSON array for the whole run, first snippet per file only.
pub fn print_json(
    results: &[FileJob],
    snippet_length: usize,
    output: Option<&Path>,
) -> Result<()> {
    let document_frequency = document_term_frequency(results);

    let json_results: Vec<JsonResult> = results
        .iter()
        .map(|job| {
            let snippet = extract_relevant(job, &document_frequency, snippet_length)
                .into_iter()
                .next()
                .unwrap_or_default();

            JsonResult {
                filename: job.filename.clone(),
                location: job.location.clone(),
                content: String::from_utf8_lossy(&snippet.content).into_owned(),
                score: job.score,
                matchlocations: locations_in_snippet(job, &snippet),
            }
        })
        .collect();

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            serde_json::to_writer(file, &json_results)?;
            println!("results written to {}", path.display());
        }
        None => {
            serde_json::to_writer(io::stdout().lock(), &json_results)?;
            println!();
        }
    }

    Ok(())
}

/// One `location:line:offset:content` line per snippet, newlines in the
/// content escaped so every hit stays on a single line.
pub fn print_vimgrep(results: &[FileJob], snippet_count: usize) -> Result<()> {
    let document_frequency = document_term_frequency(results);

    let mut lines: Vec<String> = Vec::new();
    for job in results {
        let mut snippets = extract_relevant(job, &document_frequency, VIMGREP_SNIPPET_LENGTH);
        snippets.truncate(snippet_count);

        for snippet in snippets {
            let hint = String::from_utf8_lossy(&snippet.content).replace('\n', "\\n");
            lines.push(format!(
                "{}:{}:{}:{}",
                job.location, snippet.line_pos[0], snippet.pos[0], hint
            ));
        }
    }

    println!("{}", lines.join("\n"));
    Ok(())
}
