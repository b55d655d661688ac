//! Canonical point and point-list formatting.
//!
//! Points are written as `x,y`, sometimes with spaces, sometimes with extra
//! decimal places. [`PointList`] parses an even count of numbers separated
//! by commas and/or whitespace and formats them as `x,y` pairs joined by a
//! single space using the shortest float form.
//!
//! ```rust
//! use node_stream_diff::PointList;
//!
//! let a: PointList = "1,2".parse().unwrap();
//! let b: PointList = "1, 2.000".parse().unwrap();
//! assert_eq!(a.to_string(), b.to_string());
//! assert_eq!("0,0 10.50,3".parse::<PointList>().unwrap().to_string(), "0,0 10.5,3");
//! ```

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointList(pub Vec<Point>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsePointError(String);

impl fmt::Display for ParsePointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a point list: `{}`", self.0)
    }
}

impl std::error::Error for ParsePointError {}

impl FromStr for PointList {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePointError(s.to_string());
        let numbers = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<f64>().ok().filter(|n| n.is_finite()))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(err)?;

        if numbers.is_empty() || numbers.len() % 2 != 0 {
            return Err(err());
        }
        // A lone comma-free pair like "1 2" is ambiguous with plain text.
        if !s.contains(',') {
            return Err(err());
        }

        Ok(PointList(
            numbers
                .chunks_exact(2)
                .map(|pair| Point {
                    x: pair[0],
                    y: pair[1],
                })
                .collect(),
        ))
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n == 0.0 {
        f.write_str("0")
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_number(f, self.x)?;
        f.write_str(",")?;
        write_number(f, self.y)
    }
}

impl fmt::Display for PointList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", point)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_points() {
        for text in ["", "10", "1,2,3", "a,b", "1 2", "NaN,1"] {
            assert!(text.parse::<PointList>().is_err(), "{text}");
        }
    }

    #[test]
    fn test_negative_zero_and_spacing() {
        let list: PointList = " -0.0 ,  -1.250 ".parse().unwrap();
        assert_eq!(list.to_string(), "0,-1.25");
    }
}
