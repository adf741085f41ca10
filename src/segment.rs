//! Field segmentation over an explicit cursor.
//!
//! One scanner serves both the top-level block and nested objects: it walks
//! the source through a byte position, groups lines into field units
//! (multi-line type expressions via brace balancing) and accumulates
//! trailing-comment descriptions. The nested object parser in `translate`
//! runs the same scanner over inner brace content, so the segmentation rules
//! cannot drift between nesting levels.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::Property;

static FIELD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)(\?)?\s*:\s*(.+)$").unwrap());
static MAP_PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[string\]\s*:\s*(.+)$").unwrap());

/// One named, possibly-optional, possibly multi-line type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUnit {
    pub name: String,
    pub optional: bool,
    pub type_text: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Field(FieldUnit),
    /// A `[string]: <value>` line: any string key maps to the value type.
    /// Only meaningful inside nested objects; the top level ignores it.
    MapPattern {
        value_text: String,
        description: Option<String>,
    },
}

/// Cursor-based line walker over a block of field definitions.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        if self.pos >= self.src.len() {
            return None;
        }
        let rest = &self.src[self.pos..];
        match rest.find('\n') {
            Some(idx) => {
                self.pos += idx + 1;
                Some(&rest[..idx])
            }
            None => {
                self.pos = self.src.len();
                Some(rest)
            }
        }
    }

    pub fn next_segment(&mut self) -> Option<Segment> {
        let mut pending: Option<String> = None;
        while let Some(raw) = self.next_line() {
            let line = raw.trim();

            // comments do not carry across blank lines
            if line.is_empty() {
                pending = None;
                continue;
            }
            // internal fields stay internal
            if line.starts_with('_') {
                continue;
            }
            if let Some(comment) = line.strip_prefix("//") {
                let comment = comment.trim();
                match pending.as_mut() {
                    Some(acc) => {
                        acc.push(' ');
                        acc.push_str(comment);
                    }
                    None => pending = Some(comment.to_string()),
                }
                continue;
            }
            if let Some(caps) = MAP_PATTERN_RE.captures(line) {
                let value_text = caps[1].trim_end_matches(',').trim_end().to_string();
                return Some(Segment::MapPattern { value_text, description: pending.take() });
            }
            if let Some(caps) = FIELD_RE.captures(line) {
                let name = caps[1].to_string();
                let optional = caps.get(2).is_some();
                let mut type_text = caps[3].to_string();

                // A surplus of `{` means the expression continues on the
                // following lines; pull them in until the braces balance.
                // Braces inside quoted regexes must come in matched pairs,
                // which holds for repetition counts like `{1,3}`.
                let mut depth = brace_delta(&type_text);
                while depth > 0 {
                    let Some(next) = self.next_line() else { break };
                    type_text.push('\n');
                    type_text.push_str(next);
                    depth += brace_delta(next);
                }

                let trimmed = type_text.trim_end().trim_end_matches(',').trim_end();
                let type_text = trimmed.to_string();
                return Some(Segment::Field(FieldUnit {
                    name,
                    optional,
                    type_text,
                    description: pending.take(),
                }));
            }
            // Not a field, comment, or map pattern: skipped without error,
            // so one stray line cannot sink the whole document.
        }
        None
    }
}

fn brace_delta(line: &str) -> i32 {
    let opens = line.bytes().filter(|&b| b == b'{').count() as i32;
    let closes = line.bytes().filter(|&b| b == b'}').count() as i32;
    opens - closes
}

/// Segment a block and translate every field into its property schema.
///
/// Returns properties in source order plus the names of required
/// (non-optional) fields, also in source order and without duplicates.
pub fn parse_block_fields(block: &str) -> (IndexMap<String, Property>, Vec<String>) {
    let mut properties: IndexMap<String, Property> = IndexMap::new();
    let mut required: Vec<String> = Vec::new();

    let mut scanner = Scanner::new(block);
    while let Some(segment) = scanner.next_segment() {
        let Segment::Field(field) = segment else { continue };
        let mut prop = crate::translate::translate_type(&field.type_text);
        if field.description.is_some() {
            prop.description = field.description;
        }
        if !field.optional && !required.iter().any(|n| n == &field.name) {
            required.push(field.name.clone());
        }
        properties.insert(field.name, prop);
    }

    (properties, required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(src: &str) -> Vec<Segment> {
        let mut scanner = Scanner::new(src);
        let mut out = Vec::new();
        while let Some(s) = scanner.next_segment() {
            out.push(s);
        }
        out
    }

    fn fields(src: &str) -> Vec<FieldUnit> {
        segments(src)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Field(f) => Some(f),
                Segment::MapPattern { .. } => None,
            })
            .collect()
    }

    #[test]
    fn simple_field_with_trailing_comma() {
        let fs = fields("\tname: string,\n");
        assert_eq!(fs.len(), 1);
        assert_eq!(fs[0].name, "name");
        assert!(!fs[0].optional);
        assert_eq!(fs[0].type_text, "string");
    }

    #[test]
    fn optional_marker_sets_the_flag() {
        let fs = fields("mtu?: >=1450 & <=9000,\n");
        assert!(fs[0].optional);
        assert_eq!(fs[0].type_text, ">=1450 & <=9000");
    }

    #[test]
    fn comments_join_with_single_spaces() {
        let src = "// first line\n// second line\nname: string\n";
        let fs = fields(src);
        assert_eq!(fs[0].description.as_deref(), Some("first line second line"));
    }

    #[test]
    fn blank_line_resets_pending_comment() {
        let src = "// orphaned comment\n\nname: string\n";
        let fs = fields(src);
        assert_eq!(fs[0].description, None);
    }

    #[test]
    fn internal_fields_are_skipped() {
        let src = "_hidden: string\nvisible: string\n";
        let fs = fields(src);
        assert_eq!(fs.len(), 1);
        assert_eq!(fs[0].name, "visible");
    }

    #[test]
    fn malformed_lines_are_silently_ignored() {
        let src = "!!! not a field\nname: string\n}}}\n";
        let fs = fields(src);
        assert_eq!(fs.len(), 1);
        assert_eq!(fs[0].name, "name");
    }

    #[test]
    fn multi_line_type_extends_until_braces_balance() {
        let src = "vm?: {\n\tvmid: int\n\tname: string\n},\nnext: bool\n";
        let fs = fields(src);
        assert_eq!(fs.len(), 2);
        assert_eq!(fs[0].name, "vm");
        assert!(fs[0].type_text.starts_with('{'));
        assert!(fs[0].type_text.ends_with('}'));
        assert!(fs[0].type_text.contains("vmid: int"));
        assert_eq!(fs[1].name, "next");
    }

    #[test]
    fn map_pattern_is_surfaced_as_its_own_segment() {
        let src = "// role per user\n[string]: \"OWNER\" | \"ADMIN\",\n";
        let segs = segments(src);
        assert_eq!(segs.len(), 1);
        match &segs[0] {
            Segment::MapPattern { value_text, description } => {
                assert_eq!(value_text, "\"OWNER\" | \"ADMIN\"");
                assert_eq!(description.as_deref(), Some("role per user"));
            }
            other => panic!("expected map pattern, got {other:?}"),
        }
    }

    #[test]
    fn block_fields_split_required_and_optional() {
        let src = "role: \"controller\" | \"worker\"\nmtu?: >=1450 & <=9000\nname: string\n";
        let (properties, required) = parse_block_fields(src);
        let names: Vec<&String> = properties.keys().collect();
        assert_eq!(names, ["role", "mtu", "name"]);
        assert_eq!(required, ["role", "name"]);
    }
}
