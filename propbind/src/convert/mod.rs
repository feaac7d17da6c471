//! Scalar conversions.
//!
//! Every scalar type implements [`Bind`] with [`Shape::Scalar`] and converts
//! a single [`ConfigurationProperty`]. Text is trimmed before parsing except
//! for `String` and `char`, which keep their value verbatim.

mod duration;

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde_json::Value;
use thiserror::Error;

use crate::bind::{Bind, Shape};
use crate::source::ConfigurationProperty;

pub use duration::parse_duration;

/// Why a value could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ConversionFailure {
    reason: String,
}

impl ConversionFailure {
    /// A failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Parse a trimmed value through [`FromStr`].
///
/// # Errors
///
/// Returns the parser's error message.
pub fn parse_from_str<T>(property: &ConfigurationProperty) -> Result<T, ConversionFailure>
where
    T: FromStr,
    T::Err: Display,
{
    property
        .text()
        .trim()
        .parse()
        .map_err(|err: T::Err| ConversionFailure::new(err.to_string()))
}

/// Implement [`Bind`] as a scalar for types implementing [`FromStr`].
///
/// ```
/// use std::str::FromStr;
///
/// #[derive(Debug, PartialEq)]
/// struct Level(u8);
///
/// impl FromStr for Level {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.trim_start_matches('L').parse().map(Level)
///     }
/// }
///
/// propbind::impl_scalar_from_str!(Level);
/// ```
#[macro_export]
macro_rules! impl_scalar_from_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Bind for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Scalar
            }

            fn from_property(
                property: &$crate::ConfigurationProperty,
            ) -> ::core::result::Result<Self, $crate::ConversionFailure> {
                $crate::parse_from_str(property)
            }
        }
    )+};
}

impl_scalar_from_str!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl Bind for String {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        Ok(property.text().into_owned())
    }
}

impl Bind for bool {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        if let Value::Bool(flag) = property.value() {
            return Ok(*flag);
        }
        match property.text().trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => Err(ConversionFailure::new(format!("'{other}' is not a boolean"))),
        }
    }
}

impl Bind for char {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        let text = property.text();
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(only), None) => Ok(only),
            _ => Err(ConversionFailure::new("expected exactly one character")),
        }
    }
}

impl Bind for PathBuf {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        non_empty(property).map(Self::from)
    }
}

impl Bind for Utf8PathBuf {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        non_empty(property).map(Self::from)
    }
}

impl Bind for Duration {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        match property.value() {
            Value::Number(number) => number
                .as_u64()
                .map(Self::from_millis)
                .ok_or_else(|| ConversionFailure::new("durations must be whole, non-negative milliseconds")),
            _ => parse_duration(&property.text()),
        }
    }
}

fn non_empty(property: &ConfigurationProperty) -> Result<String, ConversionFailure> {
    let text = property.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ConversionFailure::new("empty path"))
    } else {
        Ok(trimmed.to_owned())
    }
}

macro_rules! integer {
    ($($ty:ty),+) => {$(
        impl Bind for $ty {
            fn shape() -> Shape {
                Shape::Scalar
            }

            fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
                match parse_integer(property.value())? {
                    Integer::Negative(wide) => Self::try_from(wide).map_err(|_| {
                        out_of_range(&wide, stringify!($ty))
                    }),
                    Integer::NonNegative(wide) => Self::try_from(wide).map_err(|_| {
                        out_of_range(&wide, stringify!($ty))
                    }),
                }
            }
        }
    )+};
}

integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float {
    ($($ty:ty),+) => {$(
        impl Bind for $ty {
            fn shape() -> Shape {
                Shape::Scalar
            }

            fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
                parse_from_str(property)
            }
        }
    )+};
}

float!(f32, f64);

/// A parsed integer, kept wide enough for both `i128` and `u128` targets.
enum Integer {
    Negative(i128),
    NonNegative(u128),
}

fn out_of_range(value: &dyn Display, target: &str) -> ConversionFailure {
    ConversionFailure::new(format!("{value} is out of range for {target}"))
}

/// Decimal or hexadecimal (`0x`, `#`) integers with an optional sign.
fn parse_integer(value: &Value) -> Result<Integer, ConversionFailure> {
    let text = match value {
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                return Ok(Integer::NonNegative(u128::from(unsigned)));
            }
            if let Some(signed) = number.as_i64() {
                return Ok(Integer::Negative(i128::from(signed)));
            }
            return Err(ConversionFailure::new(format!("{number} is not an integer")));
        }
        Value::String(text) => text.trim(),
        other => return Err(ConversionFailure::new(format!("{other} is not an integer"))),
    };
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = ["0x", "0X", "#"]
        .iter()
        .find_map(|prefix| unsigned.strip_prefix(prefix))
        .map_or((10, unsigned), |hex| (16, hex));
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(ConversionFailure::new(format!("'{text}' is not an integer")));
    }
    let magnitude = u128::from_str_radix(digits, radix)
        .map_err(|err| ConversionFailure::new(format!("'{text}' is not an integer: {err}")))?;
    if !negative {
        return Ok(Integer::NonNegative(magnitude));
    }
    0_i128
        .checked_sub_unsigned(magnitude)
        .map(Integer::Negative)
        .ok_or_else(|| out_of_range(&text, "i128"))
}

#[cfg(test)]
mod tests;
