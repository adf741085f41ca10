//! Type-expression translation: one field's CUE text → one property schema.
//!
//! Dispatch is deliberately an explicit tagged union (`TypeExpr`) consumed by
//! a single ordered match, so the priority between object / array / default /
//! enum / scalar handling is visible in one place and cannot be reordered by
//! accident. Translation never fails: anything we do not recognize degrades
//! to the most permissive applicable schema.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{DefaultValue, Property, Shape, StringFormat};
use crate::segment::{Scanner, Segment};

// `(?s)` so nested objects inside the brackets may span lines; the end anchor
// keeps a `]` inside a regex character class from terminating the match early.
static ARRAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^\[\.\.\.(.*)\]$").unwrap());
static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\*"?([^"|]+)"?\s*\|\s*(.+)"#).unwrap());
static LITERAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).unwrap());
static RANGE_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>=(\d+)\s*&\s*<=(\d+)$").unwrap());
static MIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r">=(\d+)").unwrap());
static MAX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<=(\d+)").unwrap());
static PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"=~"([^"]+)""#).unwrap());

/// Classified type expression. First matching constructor wins.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr<'a> {
    /// `{ ... }` — nested object definition.
    Nested(&'a str),
    /// `[...T]` — list of T, inner text captured.
    Array(&'a str),
    /// `*value | rest` — literal default plus remaining constraints.
    DefaultAlternation { default: &'a str, rest: &'a str },
    /// `"a" | "b" | ...` — closed set of string literals.
    EnumLiterals(Vec<String>),
    /// Everything else: scalar type tokens and constraint conjunctions.
    Scalar(&'a str),
}

pub fn classify(text: &str) -> TypeExpr<'_> {
    let text = text.trim();

    if text.starts_with('{') {
        return TypeExpr::Nested(text);
    }
    if let Some(caps) = ARRAY_RE.captures(text) {
        let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        return TypeExpr::Array(inner);
    }
    if let Some(caps) = DEFAULT_RE.captures(text) {
        let default = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        return TypeExpr::DefaultAlternation { default, rest };
    }
    if text.contains('|') && !text.contains("=~") {
        let literals: Vec<String> =
            LITERAL_RE.captures_iter(text).map(|c| c[1].to_string()).collect();
        if !literals.is_empty() {
            return TypeExpr::EnumLiterals(literals);
        }
    }
    TypeExpr::Scalar(text)
}

/// Translate one assembled type expression into a property schema.
pub fn translate_type(text: &str) -> Property {
    match classify(text) {
        TypeExpr::Nested(body) => parse_nested_object(body),
        TypeExpr::Array(inner) => {
            Property::new(Shape::Array { items: Box::new(resolve_array_item(inner)) })
        }
        TypeExpr::DefaultAlternation { default, rest } => {
            let mut prop = Property::new(scalar_shape(rest));
            prop.default = Some(parse_default(default));
            prop
        }
        TypeExpr::EnumLiterals(literals) => Property::new(Shape::string_enum(literals)),
        TypeExpr::Scalar(body) => Property::new(scalar_shape(body)),
    }
}

fn parse_default(raw: &str) -> DefaultValue {
    if raw.eq_ignore_ascii_case("true") {
        return DefaultValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return DefaultValue::Bool(false);
    }
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return DefaultValue::Int(n);
        }
    }
    DefaultValue::Str(raw.to_string())
}

/// Ordered scalar/constraint rules. The order matters: `bool` before the
/// `int` substring check, the regex marker before the `string` token, the
/// net aliases between the two.
fn scalar_shape(text: &str) -> Shape {
    let text = text.trim();

    if text.contains("bool") {
        return Shape::Boolean;
    }

    // Bare range with no type token, e.g. `>=1450 & <=9000`.
    if let Some(caps) = RANGE_ONLY_RE.captures(text) {
        return Shape::Integer {
            minimum: caps[1].parse::<i64>().ok(),
            maximum: caps[2].parse::<i64>().ok(),
        };
    }

    if text.contains("int") {
        let minimum = MIN_RE.captures(text).and_then(|c| c[1].parse::<i64>().ok());
        let maximum = MAX_RE.captures(text).and_then(|c| c[1].parse::<i64>().ok());
        return Shape::Integer { minimum, maximum };
    }

    if let Some(caps) = PATTERN_RE.captures(text) {
        // CUE escapes backslashes inside quoted strings; JSON Schema wants
        // the single-backslash form.
        let pattern = caps[1].replace("\\\\", "\\");
        return Shape::string_pattern(pattern);
    }

    if text.contains("net.IPCIDR") {
        return Shape::string_format(StringFormat::Ipv4Cidr, Some(r"^(\d{1,3}\.){3}\d{1,3}/\d{1,2}$"));
    }
    if text.contains("net.IPv4") {
        return Shape::string_format(StringFormat::Ipv4, Some(r"^(\d{1,3}\.){3}\d{1,3}$"));
    }
    if text.contains("net.FQDN") {
        return Shape::string_format(StringFormat::Hostname, None);
    }

    if text.contains("string") {
        let min_length = if text.contains(r#"!="""#) { Some(1) } else { None };
        return Shape::String { enum_: Vec::new(), pattern: None, format: None, min_length };
    }

    // Unrecognized token: a permissive string still gives editors something.
    Shape::plain_string()
}

/// Resolve an array's element type. Only exact scalar aliases and nested
/// object text are recognized; a `#Name` reference to another definition
/// degrades to a bare unconstrained object because we keep no symbol table.
fn resolve_array_item(inner: &str) -> Property {
    let inner = inner.trim();
    match inner {
        "net.IPv4" => Property::new(Shape::string_format(StringFormat::Ipv4, None)),
        "net.FQDN" => Property::new(Shape::string_format(StringFormat::Hostname, None)),
        "net.IPCIDR" => Property::new(Shape::string_format(StringFormat::Ipv4Cidr, None)),
        "string" => Property::new(Shape::plain_string()),
        "int" => Property::new(Shape::Integer { minimum: None, maximum: None }),
        "bool" => Property::new(Shape::Boolean),
        _ if inner.starts_with('{') => parse_nested_object(inner),
        _ if inner.starts_with('#') => Property::new(Shape::UnresolvedRef),
        _ => Property::new(Shape::plain_string()),
    }
}

/// Parse a `{ ... }` object definition, possibly spanning many lines.
pub fn parse_nested_object(text: &str) -> Property {
    let Some(body) = inner_braces(text) else {
        return Property::new(Shape::empty_object());
    };

    let mut properties: IndexMap<String, Property> = IndexMap::new();
    let mut scanner = Scanner::new(body);
    while let Some(segment) = scanner.next_segment() {
        match segment {
            Segment::MapPattern { value_text, description } => {
                // An open-keyed object: the map pattern replaces any explicit
                // fields, matching "any key" vs "these exact keys" semantics.
                let mut prop = Property::new(Shape::Object {
                    properties: IndexMap::new(),
                    additional: Some(Box::new(map_value_schema(&value_text))),
                });
                prop.description = description;
                return prop;
            }
            Segment::Field(field) => {
                let mut prop = translate_type(&field.type_text);
                if field.description.is_some() {
                    prop.description = field.description;
                }
                properties.insert(field.name, prop);
            }
        }
    }

    Property::new(Shape::Object { properties, additional: None })
}

fn map_value_schema(value_text: &str) -> Property {
    let literals: Vec<String> =
        LITERAL_RE.captures_iter(value_text).map(|c| c[1].to_string()).collect();
    if !literals.is_empty() && value_text.contains('|') {
        Property::new(Shape::string_enum(literals))
    } else {
        Property::new(Shape::plain_string())
    }
}

/// Slice out the content between the first `{` and its matching `}`,
/// counting depth character-wise so braces in nested subtypes pair up.
fn inner_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (idx, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start + 1..start + idx]);
                }
            }
            _ => {}
        }
    }
    None
}
