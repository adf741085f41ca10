//! Typed property model for the generated JSON Schema.
//!
//! One constructor per schema kind; no `serde_json::Value` until emission.
//! The tree is owned top-down (document → properties → children), so emission
//! is a straight recursive walk with no sharing to worry about.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// The `format` values we know how to derive from CUE network-type aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Ipv4,
    Ipv4Cidr,
    Hostname,
}

impl StringFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv4Cidr => "ipv4-cidr",
            StringFormat::Hostname => "hostname",
        }
    }
}

/// Literal default extracted from a `*value | type` alternation.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl DefaultValue {
    fn to_value(&self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::from(*b),
            DefaultValue::Int(n) => Value::from(*n),
            DefaultValue::Str(s) => Value::from(s.clone()),
        }
    }
}

/// Structural kind of one property. Exactly one arm per JSON Schema shape we
/// emit; the dispatch order that picks an arm lives in `translate`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Boolean,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    String {
        enum_: Vec<String>,
        pattern: Option<String>,
        format: Option<StringFormat>,
        min_length: Option<u32>,
    },
    Array {
        items: Box<Property>,
    },
    /// `additional` set means "any string key maps to this value type" and is
    /// mutually exclusive with `properties` in the output.
    Object {
        properties: IndexMap<String, Property>,
        additional: Option<Box<Property>>,
    },
    /// A `#Name` reference to a definition we keep no symbol table for.
    /// Renders as a bare unconstrained `{"type":"object"}`.
    UnresolvedRef,
}

impl Shape {
    pub fn plain_string() -> Self {
        Shape::String { enum_: Vec::new(), pattern: None, format: None, min_length: None }
    }

    pub fn string_enum(enum_: Vec<String>) -> Self {
        Shape::String { enum_, pattern: None, format: None, min_length: None }
    }

    pub fn string_pattern(pattern: String) -> Self {
        Shape::String { enum_: Vec::new(), pattern: Some(pattern), format: None, min_length: None }
    }

    pub fn string_format(format: StringFormat, pattern: Option<&str>) -> Self {
        Shape::String {
            enum_: Vec::new(),
            pattern: pattern.map(str::to_string),
            format: Some(format),
            min_length: None,
        }
    }

    pub fn empty_object() -> Self {
        Shape::Object { properties: IndexMap::new(), additional: None }
    }
}

/// One field's schema: its shape plus the optional annotations every shape
/// may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub shape: Shape,
    pub description: Option<String>,
    pub default: Option<DefaultValue>,
}

impl Property {
    pub fn new(shape: Shape) -> Self {
        Property { shape, description: None, default: None }
    }

    /// Render to an ordered JSON object. Key order is fixed so repeated runs
    /// serialize byte-identically.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        match &self.shape {
            Shape::Boolean => {
                out.insert("type".into(), Value::from("boolean"));
            }
            Shape::Integer { minimum, maximum } => {
                out.insert("type".into(), Value::from("integer"));
                if let Some(min) = minimum {
                    out.insert("minimum".into(), Value::from(*min));
                }
                if let Some(max) = maximum {
                    out.insert("maximum".into(), Value::from(*max));
                }
            }
            Shape::String { enum_, pattern, format, min_length } => {
                out.insert("type".into(), Value::from("string"));
                if let Some(f) = format {
                    out.insert("format".into(), Value::from(f.as_str()));
                }
                if let Some(rx) = pattern {
                    out.insert("pattern".into(), Value::from(rx.clone()));
                }
                if let Some(n) = min_length {
                    out.insert("minLength".into(), Value::from(*n));
                }
                if !enum_.is_empty() {
                    out.insert(
                        "enum".into(),
                        Value::Array(enum_.iter().cloned().map(Value::from).collect()),
                    );
                }
            }
            Shape::Array { items } => {
                out.insert("type".into(), Value::from("array"));
                out.insert("items".into(), items.to_value());
            }
            Shape::Object { properties, additional } => {
                out.insert("type".into(), Value::from("object"));
                match additional {
                    Some(value_schema) => {
                        out.insert("additionalProperties".into(), value_schema.to_value());
                    }
                    None => {
                        out.insert("additionalProperties".into(), Value::Bool(false));
                        let mut props = Map::new();
                        for (name, prop) in properties {
                            props.insert(name.clone(), prop.to_value());
                        }
                        out.insert("properties".into(), Value::Object(props));
                    }
                }
            }
            Shape::UnresolvedRef => {
                out.insert("type".into(), Value::from("object"));
            }
        }
        if let Some(default) = &self.default {
            out.insert("default".into(), default.to_value());
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::from(description.clone()));
        }
        Value::Object(out)
    }
}
