//! Byte-level text algorithms: literal multi-match extraction, Unicode
//! case folding helpers and match highlighting.

pub mod case;
pub mod highlight;
pub mod index;

pub use case::{all_simple_fold, is_space, permute_case, permute_case_folding, start_of_rune};
pub use highlight::highlight;
pub use index::{index_all, index_all_ignore_case, index_all_limit, IndexAll, PermuteCache};
