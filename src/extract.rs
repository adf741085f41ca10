//! Locate a named top-level definition block in a CUE source document.

use regex::Regex;

use crate::error::SchemaError;

/// Return the text between `<identifier>: {` and the closing `}` that starts
/// its own line.
///
/// The *last* occurrence of the opening wins, so earlier mentions of the
/// identifier (in comments or embedded examples) are ignored. The closing
/// rule is structural, not brace-balanced: the known schema documents end
/// their top-level block with a `}` at column zero, and nested closers are
/// always indented.
pub fn extract_block<'a>(source: &'a str, identifier: &str) -> Result<&'a str, SchemaError> {
    let open_re = Regex::new(&format!(r"{}:\s*\{{", regex::escape(identifier)))
        .expect("escaped identifier forms a valid pattern");

    let opening = open_re
        .find_iter(source)
        .last()
        .ok_or_else(|| SchemaError::BlockNotFound(identifier.to_string()))?;

    let body = &source[opening.end()..];
    let close = body
        .find("\n}")
        .ok_or_else(|| SchemaError::BlockNotFound(identifier.to_string()))?;

    Ok(&body[..close])
}
