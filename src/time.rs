// Elapsed time values that keep the precision they were written with

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid elapsed time '{0}': expected a non-negative decimal number of seconds")]
pub struct TimeParseError(pub String);

/// Elapsed seconds, rendered exactly as supplied.
///
/// The decimal value is kept as an integer `units` scaled by `10^scale`, so
/// adding two values stays exact.
#[derive(Debug, Clone)]
pub struct Elapsed {
    literal: String,
    units: u128,
    scale: u32,
}

impl Elapsed {
    pub fn zero() -> Self {
        Self {
            literal: "0".to_string(),
            units: 0,
            scale: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }

    fn as_f64(&self) -> f64 {
        self.literal.parse().unwrap_or(0.0)
    }

    fn from_units(units: u128, scale: u32) -> Self {
        let digits = units.to_string();
        let literal = if scale == 0 {
            digits
        } else {
            let scale = scale as usize;
            let padded = format!("{:0>width$}", digits, width = scale + 1);
            let (int_part, frac_part) = padded.split_at(padded.len() - scale);
            format!("{}.{}", int_part, frac_part)
        };
        Self {
            literal,
            units,
            scale,
        }
    }
}

impl Default for Elapsed {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Elapsed {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeParseError(s.to_string());

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let scale = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
        let units = format!("{}{}", int_part, frac_part)
            .trim_start_matches('0')
            .parse::<u128>()
            .or_else(|e| match e.kind() {
                std::num::IntErrorKind::Empty => Ok(0),
                _ => Err(invalid()),
            })?;

        Ok(Self {
            literal: s.to_string(),
            units,
            scale,
        })
    }
}

impl TryFrom<f64> for Elapsed {
    type Error = TimeParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        // `Display` for f64 is the shortest round-trip form and never uses an exponent.
        if !value.is_finite() {
            return Err(TimeParseError(value.to_string()));
        }
        value.to_string().parse()
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl PartialEq for Elapsed {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

impl Eq for Elapsed {}

impl Add<&Elapsed> for Elapsed {
    type Output = Elapsed;

    fn add(self, rhs: &Elapsed) -> Elapsed {
        let scale = self.scale.max(rhs.scale);
        let rescale = |t: &Elapsed| {
            10u128
                .checked_pow(scale - t.scale)
                .and_then(|m| t.units.checked_mul(m))
        };

        match rescale(&self)
            .zip(rescale(rhs))
            .and_then(|(a, b)| a.checked_add(b))
        {
            Some(units) => Elapsed::from_units(units, scale),
            // Beyond u128 at this scale; exactness is lost either way.
            None => Elapsed::try_from(self.as_f64() + rhs.as_f64()).unwrap_or(self),
        }
    }
}

impl<'a> Sum<&'a Elapsed> for Elapsed {
    fn sum<I: Iterator<Item = &'a Elapsed>>(iter: I) -> Self {
        iter.fold(Elapsed::zero(), |acc, t| acc + t)
    }
}

impl<'de> Deserialize<'de> for Elapsed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Elapsed::try_from(n).map_err(serde::de::Error::custom),
        }
    }
}
