use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Double(f64),
    Boolean(bool)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    String,
    Double,
    Boolean
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueKind::String => f.write_str("String"),
            ValueKind::Double => f.write_str("Double"),
            ValueKind::Boolean => f.write_str("Boolean")
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Double(_) => ValueKind::Double,
            Value::Boolean(_) => ValueKind::Boolean
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            Value::String(value) => Ok(value),
            other => Err(other.mismatch(ValueKind::String))
        }
    }

    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Double(value) => Ok(*value),
            other => Err(other.mismatch(ValueKind::Double))
        }
    }

    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(value) => Ok(*value),
            other => Err(other.mismatch(ValueKind::Boolean))
        }
    }

    /// Parses a raw text field: `true`/`false` become booleans, numerals become doubles.
    pub fn parse(text: &str) -> Value {
        match text {
            "true" => return Value::Boolean(true),
            "false" => return Value::Boolean(false),
            _ => {}
        }
        let is_numeral = text.chars().any(|char| char.is_ascii_digit())
            && text.chars().all(|char| char.is_ascii_digit() || matches!(char, '+' | '-' | '.' | 'e' | 'E'));
        match text.parse::<f64>() {
            Ok(number) if is_numeral => Value::Double(number),
            _ => Value::String(text.to_string())
        }
    }

    fn mismatch(&self, expected: ValueKind) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind()
        }
    }
}

// -0.0 and 0.0 compare equal, and every NaN is the same value.
fn canonical(number: f64) -> f64 {
    if number.is_nan() {
        f64::NAN
    } else if number == 0.0 {
        0.0
    } else {
        number
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(value) =>
                write!(f, "{}", value),
            Value::Boolean(value) =>
                write!(f, "{}", value),
            Value::Double(value) if value.is_nan() =>
                f.write_str("NaN"),
            Value::Double(value) if value.is_infinite() =>
                f.write_str(if *value > 0.0 { "Infinity" } else { "-Infinity" }),
            Value::Double(value) if value.fract() == 0.0 && value.abs() < 1e18 =>
                write!(f, "{}", *value as i64),
            Value::Double(value) =>
                write!(f, "{}", value)
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Double(x), Value::Double(y)) => canonical(*x).total_cmp(&canonical(*y)),
            (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
            (x, y) => x.kind().cmp(&y.kind())
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::String(value) => value.hash(state),
            Value::Double(value) => canonical(*value).to_bits().hash(state),
            Value::Boolean(value) => value.hash(state)
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Double(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Double(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}
