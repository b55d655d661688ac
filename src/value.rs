//! Leaf values as runtime-typed readers produce them.
//!
//! A node stream always carries leaf values as strings (see
//! [`Node::Value`](crate::Node::Value)). Readers of the binary form, however,
//! often hold a richer runtime value: a boolean, a number, a date, an arbitrary
//! precision integer. [`LeafValue`] captures those and renders each one to the
//! textual form that a markup reader would have produced for the same value,
//! which is what lets leaves from both sources compare equal.
//!
//! ```rust
//! use node_stream_diff::{LeafValue, Node};
//!
//! assert_eq!(LeafValue::from(12.50).to_string(), "12.5");
//! assert_eq!(LeafValue::from(true).to_string(), "True");
//! assert_eq!(Node::value(42), Node::Value("42".to_string()));
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A runtime-typed leaf value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LeafValue {
    Text(String),
    Bool(bool),
    Number(Number),
    BigInt(BigInt),
    Date(DateTime<Utc>),
}

/// A numeric leaf, including the special floating point values.
///
/// # Examples
///
/// ```rust
/// use node_stream_diff::Number;
///
/// assert_eq!(Number::Float(1.0).to_string(), "1");
/// assert_eq!(Number::NegativeInfinity.to_string(), "-Infinity");
/// assert!(Number::NaN.is_special());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

impl Number {
    /// Returns `true` if this is Infinity, -Infinity or NaN.
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            // `-0.0` renders as `0`, the same way markup spells it
            Number::Float(fl) if *fl == 0.0 => write!(f, "0"),
            Number::Float(fl) => write!(f, "{}", fl),
            Number::Infinity => write!(f, "Infinity"),
            Number::NegativeInfinity => write!(f, "-Infinity"),
            Number::NaN => write!(f, "NaN"),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Number::NaN
        } else if value == f64::INFINITY {
            Number::Infinity
        } else if value == f64::NEG_INFINITY {
            Number::NegativeInfinity
        } else {
            Number::Float(value)
        }
    }
}

impl LeafValue {
    /// Consumes the value and returns its normalized string form.
    #[must_use]
    pub fn into_raw(self) -> String {
        match self {
            LeafValue::Text(s) => s,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Text(s) => f.write_str(s),
            LeafValue::Bool(true) => f.write_str("True"),
            LeafValue::Bool(false) => f.write_str("False"),
            LeafValue::Number(n) => write!(f, "{}", n),
            LeafValue::BigInt(bi) => write!(f, "{}", bi),
            LeafValue::Date(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::Text(value.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        LeafValue::Text(value)
    }
}

impl From<bool> for LeafValue {
    fn from(value: bool) -> Self {
        LeafValue::Bool(value)
    }
}

impl From<i32> for LeafValue {
    fn from(value: i32) -> Self {
        LeafValue::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i64> for LeafValue {
    fn from(value: i64) -> Self {
        LeafValue::Number(Number::Integer(value))
    }
}

impl From<u32> for LeafValue {
    fn from(value: u32) -> Self {
        LeafValue::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u64> for LeafValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => LeafValue::Number(Number::Integer(i)),
            Err(_) => LeafValue::BigInt(BigInt::from(value)),
        }
    }
}

impl From<f32> for LeafValue {
    fn from(value: f32) -> Self {
        // Go through the shortest decimal form so 0.1f32 stays "0.1"
        let widened = value.to_string().parse::<f64>().unwrap_or(f64::from(value));
        LeafValue::Number(Number::from(widened))
    }
}

impl From<f64> for LeafValue {
    fn from(value: f64) -> Self {
        LeafValue::Number(Number::from(value))
    }
}

impl From<Number> for LeafValue {
    fn from(value: Number) -> Self {
        LeafValue::Number(value)
    }
}

impl From<BigInt> for LeafValue {
    fn from(value: BigInt) -> Self {
        LeafValue::BigInt(value)
    }
}

impl From<DateTime<Utc>> for LeafValue {
    fn from(value: DateTime<Utc>) -> Self {
        LeafValue::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_number_rendering() {
        assert_eq!(LeafValue::from(42).to_string(), "42");
        assert_eq!(LeafValue::from(-0.0f64).to_string(), "0");
        assert_eq!(LeafValue::from(1.25f64).to_string(), "1.25");
        assert_eq!(LeafValue::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(LeafValue::from(f64::NAN).to_string(), "NaN");
        assert_eq!(LeafValue::from(0.1f32).to_string(), "0.1");
    }

    #[test]
    fn test_big_integers() {
        let big = LeafValue::from(u64::MAX);
        assert!(matches!(big, LeafValue::BigInt(_)));
        assert_eq!(big.to_string(), "18446744073709551615");
    }

    #[test]
    fn test_dates_and_bools() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(LeafValue::from(dt).into_raw(), "2024-01-15T10:30:00Z");
        assert_eq!(LeafValue::from(false).into_raw(), "False");
        assert_eq!(LeafValue::from("as is").into_raw(), "as is");
    }
}
