//! Structural validation
//!
//! Reports problems as a list of [`Violation`]s instead of raising: an empty
//! list means valid.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON primitive type a schema field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl FieldType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required fields and their types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: FieldType, actual: FieldType },
    NotAnObject { actual: FieldType },
    Invalid { reason: String },
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
}

impl Violation {
    fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "Missing required field: {}", self.field),
            ViolationKind::WrongType { expected, actual } => write!(
                f,
                "Field {} should be of type {}, got {}",
                self.field, expected, actual
            ),
            ViolationKind::NotAnObject { actual } => {
                write!(f, "Expected an object, got {}", actual)
            }
            ViolationKind::Invalid { reason } => write!(f, "Field {} {}", self.field, reason),
        }
    }
}

/// Check each schema field is present with the declared type
pub fn validate(value: &Value, schema: &Schema) -> Vec<Violation> {
    let Some(object) = value.as_object() else {
        return vec![Violation::new(
            "",
            ViolationKind::NotAnObject {
                actual: FieldType::of(value),
            },
        )];
    };

    schema
        .fields()
        .filter_map(|(name, expected)| match object.get(name) {
            None => Some(Violation::new(name, ViolationKind::Missing)),
            Some(v) if FieldType::of(v) != expected => Some(Violation::new(
                name,
                ViolationKind::WrongType {
                    expected,
                    actual: FieldType::of(v),
                },
            )),
            Some(_) => None,
        })
        .collect()
}

/// Minimum password length accepted by the login form
pub const MIN_PASSWORD_LEN: usize = 8;

/// Sanity-check login credentials before typing them into the form
pub fn validate_credentials(username: &str, password: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    if username.trim().is_empty() {
        violations.push(Violation::new("username", ViolationKind::Missing));
    } else if username.chars().any(char::is_whitespace) {
        violations.push(Violation::new(
            "username",
            ViolationKind::Invalid {
                reason: "must not contain whitespace".to_string(),
            },
        ));
    }

    if password.is_empty() {
        violations.push(Violation::new("password", ViolationKind::Missing));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(Violation::new(
            "password",
            ViolationKind::Invalid {
                reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
            },
        ));
    }

    violations
}
