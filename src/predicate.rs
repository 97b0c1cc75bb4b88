use std::fmt;
use crate::error::Result;
use crate::value::Value;

/// A test applied to a single column value of a row.
pub trait Predicate {
    fn test(&self, value: &Value) -> Result<bool>;
}

impl<F> Predicate for F
where
    F: Fn(&Value) -> Result<bool>
{
    fn test(&self, value: &Value) -> Result<bool> {
        self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equals(pub Value);

impl Predicate for Equals {
    fn test(&self, value: &Value) -> Result<bool> {
        Ok(*value == self.0)
    }
}

/// Fails with a type mismatch on non-numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreaterThan(pub f64);

impl Predicate for GreaterThan {
    fn test(&self, value: &Value) -> Result<bool> {
        Ok(value.as_number()? > self.0)
    }
}

/// Fails with a type mismatch on non-numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessThan(pub f64);

impl Predicate for LessThan {
    fn test(&self, value: &Value) -> Result<bool> {
        Ok(value.as_number()? < self.0)
    }
}

/// A WHERE term: a predicate bound to the column it inspects.
pub struct WhereParameter {
    col_id: String,
    predicate: Box<dyn Predicate>
}

impl WhereParameter {
    pub fn new<P: Predicate + 'static>(col_id: &str, predicate: P) -> WhereParameter {
        WhereParameter {
            col_id: col_id.to_string(),
            predicate: Box::new(predicate)
        }
    }

    pub fn equals<V: Into<Value>>(col_id: &str, value: V) -> WhereParameter {
        WhereParameter::new(col_id, Equals(value.into()))
    }

    pub fn greater_than(col_id: &str, bound: f64) -> WhereParameter {
        WhereParameter::new(col_id, GreaterThan(bound))
    }

    pub fn less_than(col_id: &str, bound: f64) -> WhereParameter {
        WhereParameter::new(col_id, LessThan(bound))
    }

    pub fn col_id(&self) -> &str {
        &self.col_id
    }

    pub fn test(&self, value: &Value) -> Result<bool> {
        self.predicate.test(value)
    }
}

impl fmt::Debug for WhereParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WhereParameter")
            .field("col_id", &self.col_id)
            .finish_non_exhaustive()
    }
}

/// OR over all terms; false when there are none.
///
/// `value_of` resolves a term's column to the value in the row under test.
pub fn any<'a, F>(terms: &[WhereParameter], value_of: F) -> Result<bool>
where
    F: Fn(&str) -> &'a Value
{
    for term in terms {
        if term.test(value_of(term.col_id()))? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// AND over all terms; true when there are none.
pub fn all<'a, F>(terms: &[WhereParameter], value_of: F) -> Result<bool>
where
    F: Fn(&str) -> &'a Value
{
    for term in terms {
        if !term.test(value_of(term.col_id()))? {
            return Ok(false);
        }
    }
    Ok(true)
}
