//! Literal, case-insensitive search patterns.
//!
//! The find bar matches text the way users type it: no regex syntax and
//! no case sensitivity. `regex` does the heavy lifting once the needle is
//! escaped, which also gives correct Unicode case folding.

use regex::{Regex, RegexBuilder};

use crate::BufferResult;

/// Builds a case-insensitive matcher for a literal needle.
pub(crate) fn pattern(needle: &str) -> BufferResult<Regex> {
    Ok(RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()?)
}
