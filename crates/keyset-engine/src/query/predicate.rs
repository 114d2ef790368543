//! Store-independent filter predicates.

use std::cmp::Ordering;
use std::fmt;

use keyset_core::value::Value;
use strum::{AsRefStr, IntoStaticStr};

/// Comparison operator of a field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
pub enum Operator {
    /// Equal: `=`
    #[strum(serialize = "=")]
    Eq,
    /// Not equal: `!=`
    #[strum(serialize = "!=")]
    Ne,
    /// Less than: `<`
    #[strum(serialize = "<")]
    Lt,
    /// Less than or equal: `<=`
    #[strum(serialize = "<=")]
    Lte,
    /// Greater than: `>`
    #[strum(serialize = ">")]
    Gt,
    /// Greater than or equal: `>=`
    #[strum(serialize = ">=")]
    Gte,
}

impl Operator {
    /// Returns `true` if a field value compared to the operand with this
    /// operator matches.
    ///
    /// Ordering operators never match values that are not comparable,
    /// including null.
    pub fn test(self, field: &Value, operand: &Value) -> bool {
        let ordering = compare(field, operand);
        match self {
            Self::Eq => ordering == Some(Ordering::Equal),
            Self::Ne => ordering != Some(Ordering::Equal),
            Self::Lt => ordering == Some(Ordering::Less),
            Self::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Self::Gt => ordering == Some(Ordering::Greater),
            Self::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Equality that also treats two nulls as equal.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => a.partial_cmp(b),
    }
}

/// A boolean condition over entity fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        /// Field name.
        field: String,
        /// Comparison operator.
        op: Operator,
        /// Right-hand operand.
        value: Value,
    },
    /// `field IN (values)`
    In {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// All predicates must match. An empty conjunction always matches.
    And(Vec<Predicate>),
    /// At least one predicate must match. An empty disjunction never matches.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Creates a field comparison.
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Ne, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Lte, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Gte, value)
    }

    /// `field IN (values)`
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of the given predicates.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::And(predicates.into_iter().collect())
    }

    /// Disjunction of the given predicates.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(predicates.into_iter().collect())
    }

    /// Conjoins two optional predicates.
    pub fn conjoin(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
        match (left, right) {
            (Some(left), Some(right)) => Some(Self::And(vec![left, right])),
            (left, right) => left.or(right),
        }
    }

    /// Evaluates the predicate against an entity.
    ///
    /// `lookup` returns the value of a named field, or [`Value::Null`] if
    /// the entity has no such field.
    pub fn evaluate<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Value,
    {
        match self {
            Self::Compare { field, op, value } => op.test(&lookup(field), value),
            Self::In { field, values } => {
                let actual = lookup(field);
                values.iter().any(|value| Operator::Eq.test(&actual, value))
            }
            Self::And(predicates) => predicates.iter().all(|p| p.evaluate(lookup)),
            Self::Or(predicates) => predicates.iter().any(|p| p.evaluate(lookup)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { field, op, value } => write!(f, "{field} {op} {value}"),
            Self::In { field, values } => {
                write!(f, "{field} IN (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
            Self::And(predicates) if predicates.is_empty() => f.write_str("TRUE"),
            Self::Or(predicates) if predicates.is_empty() => f.write_str("FALSE"),
            Self::And(predicates) => write_joined(f, predicates, " AND "),
            Self::Or(predicates) => write_joined(f, predicates, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, predicates: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{predicate}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(field: &str) -> Value {
        match field {
            "age" => Value::Int(20),
            "name" => Value::from("alice"),
            _ => Value::Null,
        }
    }

    #[test]
    fn comparisons() {
        assert!(Predicate::eq("age", 20).evaluate(&lookup));
        assert!(Predicate::ne("age", 21).evaluate(&lookup));
        assert!(Predicate::lt("age", 21).evaluate(&lookup));
        assert!(Predicate::lte("age", 20).evaluate(&lookup));
        assert!(Predicate::gt("age", 19).evaluate(&lookup));
        assert!(Predicate::gte("age", 20.0).evaluate(&lookup));
        assert!(!Predicate::gt("age", 20).evaluate(&lookup));
    }

    #[test]
    fn null_is_only_equal_to_null() {
        assert!(Predicate::eq("missing", Value::Null).evaluate(&lookup));
        assert!(!Predicate::lt("missing", 1).evaluate(&lookup));
        assert!(!Predicate::gt("missing", 1).evaluate(&lookup));
        assert!(!Predicate::eq("age", Value::Null).evaluate(&lookup));
    }

    #[test]
    fn compound() {
        let predicate = Predicate::or([
            Predicate::and([Predicate::eq("age", 20), Predicate::lt("name", "alice")]),
            Predicate::lt("age", 20),
        ]);
        assert!(!predicate.evaluate(&lookup));

        let predicate = Predicate::or([
            Predicate::and([Predicate::eq("age", 20), Predicate::lt("name", "bob")]),
            Predicate::lt("age", 20),
        ]);
        assert!(predicate.evaluate(&lookup));

        assert!(Predicate::and([]).evaluate(&lookup));
        assert!(!Predicate::or([]).evaluate(&lookup));
        assert!(Predicate::is_in("name", ["bob", "alice"]).evaluate(&lookup));
    }

    #[test]
    fn display() {
        let predicate = Predicate::or([
            Predicate::and([Predicate::eq("age", 20), Predicate::lt("id", 3)]),
            Predicate::lt("age", 20),
        ]);
        assert_eq!(predicate.to_string(), "((age = 20 AND id < 3) OR age < 20)");
        assert_eq!(
            Predicate::is_in("name", ["a", "b"]).to_string(),
            r#"name IN ("a", "b")"#
        );
    }

    #[test]
    fn conjoin() {
        let a = Predicate::eq("a", 1);
        let b = Predicate::eq("b", 2);

        assert_eq!(Predicate::conjoin(None, None), None);
        assert_eq!(Predicate::conjoin(Some(a.clone()), None), Some(a.clone()));
        assert_eq!(Predicate::conjoin(None, Some(b.clone())), Some(b.clone()));
        assert_eq!(
            Predicate::conjoin(Some(a.clone()), Some(b.clone())),
            Some(Predicate::And(vec![a, b]))
        );
    }
}
