//! Exact numbers with units.
//!
//! Magnitudes are arbitrary-precision rationals kept in lowest terms, so
//! derived equality and hashing agree with numeric equality. Units never
//! convert: `1m` and `100cm` are different numbers, and adding or comparing
//! numbers of different units is an error.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rill_ir::Unit;
use std::cmp::Ordering;
use std::fmt;

/// Digits printed after the decimal point for non-terminating fractions.
const DISPLAY_PRECISION: usize = 12;

/// Largest decimal scale a literal may have, in either direction.
pub const MAX_SCALE: u32 = 4096;

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Number {
    numerator: BigInt,
    /// Always positive.
    denominator: BigInt,
    unit: Unit,
}

/// Why an arithmetic operation has no result.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ArithmeticError {
    IncompatibleUnits,
    DivisionByZero,
}

impl Number {
    fn from_parts(numerator: BigInt, denominator: BigInt, unit: Unit) -> Self {
        let (mut numerator, mut denominator) = (numerator, denominator);
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        let divisor = numerator.gcd(&denominator);
        if !divisor.is_zero() && !divisor.is_one() {
            numerator /= &divisor;
            denominator /= &divisor;
        }
        Number {
            numerator,
            denominator,
            unit,
        }
    }

    pub fn integer(value: i64, unit: Unit) -> Self {
        Number {
            numerator: BigInt::from(value),
            denominator: BigInt::one(),
            unit,
        }
    }

    pub fn count(value: usize) -> Self {
        Number {
            numerator: BigInt::from(value),
            denominator: BigInt::one(),
            unit: Unit::unitless(),
        }
    }

    /// Parse decimal literal text such as `12`, `-0.25` or `6.02e23`.
    ///
    /// Literals whose decimal scale exceeds [`MAX_SCALE`] do not parse.
    pub fn parse(text: &str, unit: Unit) -> Option<Self> {
        let text = text.trim();
        let (negative, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(at) => (&text[..at], text[at + 1..].parse::<i32>().ok()?),
            None => (text, 0),
        };
        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let digits = format!("{whole}{fraction}");
        let mut numerator: BigInt = digits.parse().ok()?;
        if negative {
            numerator = -numerator;
        }
        let scale = exponent.checked_sub(i32::try_from(fraction.len()).ok()?)?;
        if scale.unsigned_abs() > MAX_SCALE {
            return None;
        }
        let power = BigInt::from(10).pow(scale.unsigned_abs());
        let number = if scale >= 0 {
            Number::from_parts(numerator * power, BigInt::one(), unit)
        } else {
            Number::from_parts(numerator, power, unit)
        };
        Some(number)
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }

    fn same_unit(&self, other: &Number) -> Result<(), ArithmeticError> {
        if self.unit == other.unit {
            Ok(())
        } else {
            Err(ArithmeticError::IncompatibleUnits)
        }
    }

    pub fn add(&self, other: &Number) -> Result<Number, ArithmeticError> {
        self.same_unit(other)?;
        Ok(Number::from_parts(
            &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
            self.unit.clone(),
        ))
    }

    pub fn subtract(&self, other: &Number) -> Result<Number, ArithmeticError> {
        self.add(&other.negate())
    }

    pub fn multiply(&self, other: &Number) -> Number {
        Number::from_parts(
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
            self.unit.product(&other.unit),
        )
    }

    pub fn divide(&self, other: &Number) -> Result<Number, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        Ok(Number::from_parts(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
            self.unit.quotient(&other.unit),
        ))
    }

    /// Remainder with the sign of the dividend.
    pub fn remainder(&self, other: &Number) -> Result<Number, ArithmeticError> {
        self.same_unit(other)?;
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let left = &self.numerator * &other.denominator;
        let right = &other.numerator * &self.denominator;
        Ok(Number::from_parts(
            left % right,
            &self.denominator * &other.denominator,
            self.unit.clone(),
        ))
    }

    #[must_use]
    pub fn negate(&self) -> Number {
        Number {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
            unit: self.unit.clone(),
        }
    }

    pub fn compare(&self, other: &Number) -> Result<Ordering, ArithmeticError> {
        self.same_unit(other)?;
        let left = &self.numerator * &other.denominator;
        let right = &other.numerator * &self.denominator;
        Ok(left.cmp(&right))
    }

    /// The value as a non-negative index, if it is one.
    pub fn as_index(&self) -> Option<usize> {
        if !self.is_integer() || self.numerator.is_negative() {
            return None;
        }
        usize::try_from(&self.numerator).ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numerator.is_negative() {
            f.write_str("-")?;
        }
        let numerator = self.numerator.abs();
        let (whole, mut rest) = numerator.div_rem(&self.denominator);
        write!(f, "{whole}")?;

        if !rest.is_zero() {
            let ten = BigInt::from(10);
            let mut digits = String::new();
            while !rest.is_zero() && digits.len() < DISPLAY_PRECISION {
                rest *= &ten;
                let (digit, remainder) = rest.div_rem(&self.denominator);
                digits.push_str(&digit.to_string());
                rest = remainder;
            }
            let digits = digits.trim_end_matches('0');
            if !digits.is_empty() {
                write!(f, ".{digits}")?;
            }
        }

        if !self.unit.is_unitless() {
            write!(f, "{}", self.unit)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({self})")
    }
}

#[cfg(test)]
mod tests;
