//! Units of measure.
//!
//! A unit is a product of named dimensions raised to integer exponents, so
//! `m/s^2` is `{m: 1, s: -2}`. Dimensions are compared by name only: there
//! is no conversion between `m` and `cm`.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Unit {
    exponents: BTreeMap<String, i32>,
}

impl Unit {
    /// The unit of a plain number.
    pub fn unitless() -> Self {
        Unit::default()
    }

    /// A single dimension with exponent one.
    pub fn dimension(name: &str) -> Self {
        let mut exponents = BTreeMap::new();
        if !name.is_empty() {
            exponents.insert(name.to_owned(), 1);
        }
        Unit { exponents }
    }

    /// Parse `m`, `m/s`, `kg·m/s^2`, or `m^-1`. Returns `None` on malformed
    /// input such as an empty dimension or a non-integer exponent.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Unit::unitless());
        }

        let mut parts = text.splitn(2, '/');
        let numerator = parts.next().unwrap_or("");
        let denominator = parts.next();

        let mut unit = Unit::unitless();
        unit.accumulate(numerator, 1)?;
        if let Some(denominator) = denominator {
            unit.accumulate(denominator, -1)?;
        }
        Some(unit)
    }

    fn accumulate(&mut self, factors: &str, sign: i32) -> Option<()> {
        for factor in factors.split(['·', '*']) {
            let factor = factor.trim();
            let (name, exponent) = match factor.split_once('^') {
                Some((name, exponent)) => (name.trim(), exponent.trim().parse::<i32>().ok()?),
                None => (factor, 1),
            };
            if name.is_empty() || !name.chars().all(char::is_alphabetic) {
                return None;
            }
            self.add(name, exponent * sign);
        }
        Some(())
    }

    fn add(&mut self, name: &str, exponent: i32) {
        let entry = self.exponents.entry(name.to_owned()).or_insert(0);
        *entry += exponent;
        if *entry == 0 {
            self.exponents.remove(name);
        }
    }

    pub fn is_unitless(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn exponent(&self, name: &str) -> i32 {
        self.exponents.get(name).copied().unwrap_or(0)
    }

    /// Unit of `a · b`.
    #[must_use]
    pub fn product(&self, other: &Unit) -> Unit {
        let mut unit = self.clone();
        for (name, &exponent) in &other.exponents {
            unit.add(name, exponent);
        }
        unit
    }

    /// Unit of `a / b`.
    #[must_use]
    pub fn quotient(&self, other: &Unit) -> Unit {
        let mut unit = self.clone();
        for (name, &exponent) in &other.exponents {
            unit.add(name, -exponent);
        }
        unit
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_factors<'a>(
            f: &mut fmt::Formatter<'_>,
            factors: impl Iterator<Item = (&'a String, i32)>,
        ) -> fmt::Result {
            for (i, (name, exponent)) in factors.enumerate() {
                if i > 0 {
                    f.write_str("·")?;
                }
                f.write_str(name)?;
                if exponent != 1 {
                    write!(f, "^{exponent}")?;
                }
            }
            Ok(())
        }

        let positive = self.exponents.iter().filter(|(_, &e)| e > 0).map(|(n, &e)| (n, e));
        let negative = self.exponents.iter().filter(|(_, &e)| e < 0).map(|(n, &e)| (n, -e));
        let has_positive = self.exponents.values().any(|&e| e > 0);
        let has_negative = self.exponents.values().any(|&e| e < 0);

        if has_positive {
            write_factors(f, positive)?;
        } else if has_negative {
            f.write_str("1")?;
        }
        if has_negative {
            f.write_str("/")?;
            write_factors(f, negative)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unitless() {
            f.write_str("Unit(#)")
        } else {
            write!(f, "Unit({self})")
        }
    }
}
