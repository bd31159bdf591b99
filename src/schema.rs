//! Declarative schemas for structured model output.
//!
//! A [`Schema`] lists the fields an object must carry. [`Schema::validate`]
//! walks a parsed JSON value and reports every violation. Unknown keys are
//! rejected. The same description also renders the example shape shown to
//! the model.

use serde_json::{Map, Value};
use std::fmt;

/// Constraint on the number of items in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Any,
    Exactly(usize),
    AtLeast(usize),
}

impl Length {
    fn check(&self, len: usize) -> Option<String> {
        match *self {
            Length::Any => None,
            Length::Exactly(n) if len != n => {
                Some(format!("expected exactly {} item(s), got {}", n, len))
            }
            Length::AtLeast(n) if len < n => {
                Some(format!("expected at least {} item(s), got {}", n, len))
            }
            _ => None,
        }
    }

    /// Number of items rendered in an example shape.
    fn example_len(&self) -> usize {
        match *self {
            Length::Any => 1,
            Length::Exactly(n) => n,
            Length::AtLeast(n) => n.max(1),
        }
    }
}

/// Type of a single field or list item.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Text { non_empty: bool },
    List { item: Box<FieldType>, length: Length },
    Object(Schema),
}

impl FieldType {
    pub fn text() -> Self {
        FieldType::Text { non_empty: false }
    }

    pub fn non_empty_text() -> Self {
        FieldType::Text { non_empty: true }
    }

    pub fn list(item: FieldType, length: Length) -> Self {
        FieldType::List {
            item: Box::new(item),
            length,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            FieldType::Text { .. } => "string",
            FieldType::List { .. } => "array",
            FieldType::Object(_) => "object",
        }
    }

    fn validate(&self, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        match (self, value) {
            (FieldType::Text { non_empty }, Value::String(s)) => {
                if *non_empty && s.is_empty() {
                    issues.push(Issue::new(path, "must not be empty"));
                }
            }
            (FieldType::List { item, length }, Value::Array(items)) => {
                if let Some(message) = length.check(items.len()) {
                    issues.push(Issue::new(path, message));
                }
                for (idx, element) in items.iter().enumerate() {
                    item.validate(element, &format!("{}[{}]", path, idx), issues);
                }
            }
            (FieldType::Object(schema), Value::Object(map)) => schema.validate_map(map, path, issues),
            (expected, actual) => issues.push(Issue::new(
                path,
                format!("expected {}, received {}", expected.expected(), type_name(actual)),
            )),
        }
    }

    fn example(&self) -> Value {
        match self {
            FieldType::Text { .. } => Value::String("string".to_string()),
            FieldType::List { item, length } => {
                Value::Array((0..length.example_len()).map(|_| item.example()).collect())
            }
            FieldType::Object(schema) => schema.example(),
        }
    }
}

/// A named, required field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// Required fields of a JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn object() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
        });
        self
    }

    /// Validate a parsed value against this schema.
    pub fn validate(&self, value: &Value) -> Validation {
        let mut issues = Vec::new();
        match value {
            Value::Object(map) => self.validate_map(map, "", &mut issues),
            other => issues.push(Issue::new(
                "",
                format!("expected object, received {}", type_name(other)),
            )),
        }

        if issues.is_empty() {
            Validation::Valid
        } else {
            Validation::Invalid(issues)
        }
    }

    fn validate_map(&self, map: &Map<String, Value>, path: &str, issues: &mut Vec<Issue>) {
        for field in &self.fields {
            let field_path = join_path(path, &field.name);
            match map.get(&field.name) {
                Some(value) => field.ty.validate(value, &field_path, issues),
                None => issues.push(Issue::new(&field_path, "required")),
            }
        }

        for key in map.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                issues.push(Issue::new(path, format!("unrecognized key '{}'", key)));
            }
        }
    }

    /// Placeholder value with the exact shape this schema accepts.
    pub fn example(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            map.insert(field.name.clone(), field.ty.example());
        }
        Value::Object(map)
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Dotted path to the offending value; empty for the root.
    pub path: String,
    pub message: String,
}

impl Issue {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Outcome of validating a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(Vec<Issue>),
}

impl Validation {
    /// One issue per line, or `None` when valid.
    pub fn describe(&self) -> Option<String> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(issues) => Some(
                issues
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
