//! Query parsing.
//!
//! The query language is a flat, left-to-right AND over whitespace-split
//! tokens with a handful of modifiers: quoted phrases, `/regex/` terms, a
//! `NOT` prefix for the following term, `~1`/`~2` fuzzy suffixes, and a
//! `file:`/`filename:` fuzzy filename filter that is pulled out before the
//! main parse. No operator precedence, no grouping.

/// How a single parsed term should be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    /// Plain literal AND-term.
    Default,
    /// Quoted phrase, interior whitespace preserved.
    Quoted,
    /// Regular expression between `/` delimiters.
    Regex,
    /// `NOT` marker negating the term that follows it.
    Negated,
    /// Fuzzy match at edit distance one.
    Fuzzy1,
    /// Fuzzy match at edit distance two.
    Fuzzy2,
}

/// One typed sub-query produced by [`parse_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub term: String,
    pub kind: TermKind,
}

impl SearchTerm {
    fn new(term: impl Into<String>, kind: TermKind) -> Self {
        Self {
            term: term.into(),
            kind,
        }
    }
}

/// Pull out the `file:`/`filename:` syntax used for fuzzy filename
/// filtering, returning the remaining tokens and the filter (lower-cased
/// and trimmed, empty if absent). The last filter token wins.
pub fn pre_parse(args: &[String]) -> (Vec<String>, String) {
    let mut modified = Vec::with_capacity(args.len());
    let mut fuzzy = String::new();

    for arg in args {
        let lowered = arg.trim().to_lowercase();
        if let Some(rest) = lowered
            .strip_prefix("file:")
            .or_else(|| lowered.strip_prefix("filename:"))
        {
            fuzzy = rest.trim().to_string();
        } else {
            modified.push(arg.clone());
        }
    }

    (modified, fuzzy)
}

/// Cheap and nasty parser over the cleaned token list. Needs to be
/// reworked to provide real boolean logic with AND OR NOT but does
/// enough for now.
pub fn parse_query(args: &[String]) -> Vec<SearchTerm> {
    let clean: Vec<&str> = args.iter().map(|arg| arg.trim()).collect();

    let mut params: Vec<SearchTerm> = Vec::with_capacity(clean.len());
    let mut start_index = 0;
    let mut mode = TermKind::Default;

    for (i, arg) in clean.iter().enumerate() {
        if let Some(stripped) = arg.strip_prefix('"') {
            // A lone quote is degenerate and ignored entirely
            if arg.len() != 1 {
                if let Some(term) = stripped.strip_suffix('"') {
                    params.push(SearchTerm::new(term, TermKind::Quoted));
                } else {
                    mode = TermKind::Quoted;
                    start_index = i;
                }
            }
        } else if mode == TermKind::Quoted && arg.ends_with('"') {
            let joined = clean[start_index..=i].join(" ");
            params.push(SearchTerm::new(
                &joined[1..joined.len() - 1],
                TermKind::Quoted,
            ));
            mode = TermKind::Default;
        } else if let Some(stripped) = arg.strip_prefix('/') {
            if arg.len() != 1 {
                if let Some(term) = stripped.strip_suffix('/') {
                    // The term // is not an empty regex, it is a search
                    // for the literal //
                    if *arg == "//" {
                        params.push(SearchTerm::new("//", TermKind::Default));
                    } else {
                        params.push(SearchTerm::new(term, TermKind::Regex));
                    }
                } else {
                    mode = TermKind::Regex;
                    start_index = i;
                }
            }
        } else if mode == TermKind::Regex && arg.ends_with('/') {
            let joined = clean[start_index..=i].join(" ");
            params.push(SearchTerm::new(
                &joined[1..joined.len() - 1],
                TermKind::Regex,
            ));
            mode = TermKind::Default;
        } else if *arg == "NOT" {
            // A NOT at the start has nothing to negate so it is dropped
            if i != 0 {
                params.push(SearchTerm::new("NOT", TermKind::Negated));
            }
        } else if arg.ends_with("~1") {
            params.push(SearchTerm::new(
                arg.trim_end_matches(['~', '1']),
                TermKind::Fuzzy1,
            ));
        } else if arg.ends_with("~2") {
            params.push(SearchTerm::new(
                arg.trim_end_matches(['~', '2']),
                TermKind::Fuzzy2,
            ));
        } else {
            params.push(SearchTerm::new(*arg, TermKind::Default));
        }
    }

    // An unterminated quote or regex is closed off for the user
    if mode == TermKind::Quoted || mode == TermKind::Regex {
        let joined = clean[start_index..].join(" ");
        params.push(SearchTerm::new(&joined[1..], mode));
    }

    params
}
