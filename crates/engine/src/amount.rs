use std::{fmt, ops::Neg, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Where a commodity is written relative to the quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommodityPosition {
    Left,
    Right,
}

/// The unit of an amount (`$`, `USD`, `"M&M"`).
///
/// Left commodities keep track of whether they were separated from the
/// quantity by a space, so `USD 3.50` and `$3.50` render back the way they
/// were typed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commodity {
    pub name: String,
    pub position: CommodityPosition,
    #[serde(default)]
    pub spaced: bool,
}

impl Commodity {
    /// Commodity written after the quantity, `3.50 USD`.
    #[must_use]
    pub fn suffix(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: CommodityPosition::Right,
            spaced: true,
        }
    }

    /// Commodity written before the quantity, `$3.50`.
    #[must_use]
    pub fn prefix(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: CommodityPosition::Left,
            spaced: false,
        }
    }

    /// Converts the parser's commodity, returning `None` for bare numbers.
    #[must_use]
    pub fn from_ledger(commodity: &ledger_parser::Commodity) -> Option<Self> {
        let name = commodity.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(match commodity.position {
            ledger_parser::CommodityPosition::Left => Self {
                name: name.to_string(),
                position: CommodityPosition::Left,
                spaced: name.chars().any(char::is_alphabetic),
            },
            ledger_parser::CommodityPosition::Right => Self::suffix(name),
        })
    }

    fn needs_quotes(&self) -> bool {
        self.name
            .chars()
            .any(|c| c.is_ascii_digit() || c.is_whitespace() || RESERVED.contains(c))
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_quotes() {
            write!(f, "\"{}\"", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

const RESERVED: &str = "-+.,;:@*/^&|=<>{}[]()!?\"";

/// A ledger amount: a decimal quantity and an optional commodity.
///
/// The quantity keeps the scale it was typed with, so `3.50 USD` stays
/// `3.50 USD` (and its negation `-3.50 USD`).
///
/// ```rust
/// use engine::{Amount, Commodity};
///
/// let amount = Amount::parse_input("3.50 USD", None).unwrap().unwrap();
/// assert_eq!(amount.to_string(), "3.50 USD");
/// assert_eq!((-amount).to_string(), "-3.50 USD");
///
/// let dollars = Amount::parse_input("4", Some(&Commodity::prefix("$"))).unwrap().unwrap();
/// assert_eq!(dollars.to_string(), "$4");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Amount {
    pub quantity: Decimal,
    pub commodity: Option<Commodity>,
}

impl Amount {
    #[must_use]
    pub fn new(quantity: Decimal, commodity: Option<Commodity>) -> Self {
        Self {
            quantity,
            commodity,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Parses what the user typed in an amount field.
    ///
    /// Blank input is `Ok(None)`: no amount was entered, which is not the same
    /// thing as zero. When the text carries no commodity, `default` is used.
    pub fn parse_input(
        input: &str,
        default: Option<&Commodity>,
    ) -> Result<Option<Amount>, EngineError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        let mut amount: Amount = input.parse()?;
        if amount.commodity.is_none() {
            amount.commodity = default.cloned();
        }
        Ok(Some(amount))
    }
}

impl From<&ledger_parser::Amount> for Amount {
    fn from(amount: &ledger_parser::Amount) -> Self {
        Self {
            quantity: amount.quantity,
            commodity: Commodity::from_ledger(&amount.commodity),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.commodity {
            None => write!(f, "{}", self.quantity),
            Some(c) if c.position == CommodityPosition::Left => {
                let sep = if c.spaced { " " } else { "" };
                write!(f, "{c}{sep}{}", self.quantity)
            }
            Some(c) => write!(f, "{} {c}", self.quantity),
        }
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        // Decimal keeps a sign bit on zero; never print "-0.00".
        let quantity = if self.quantity.is_zero() {
            self.quantity
        } else {
            -self.quantity
        };
        Amount {
            quantity,
            commodity: self.commodity,
        }
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses `3.50`, `3.50 USD`, `USD 3.50`, `$3.50`, `-$3.50`, `$-3.50` and
    /// quoted commodities such as `2 "M&M"`.
    ///
    /// Validation rules:
    /// - `.` is the decimal point, `,` is accepted as a thousands separator
    /// - at most one sign and one commodity
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| EngineError::InvalidAmount(format!("{why}: {}", s.trim()));

        let mut rest = s.trim();
        if rest.is_empty() {
            return Err(invalid("empty amount"));
        }

        let mut negative = false;
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = true;
            rest = stripped.trim_start();
        } else if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped.trim_start();
        }

        let mut commodity = None;
        if !starts_number(rest) {
            let (name, tail) = take_commodity(rest).ok_or_else(|| invalid("invalid commodity"))?;
            let spaced = tail.starts_with(char::is_whitespace);
            commodity = Some(Commodity {
                name,
                position: CommodityPosition::Left,
                spaced,
            });
            rest = tail.trim_start();
            if let Some(stripped) = rest.strip_prefix('-') {
                if negative {
                    return Err(invalid("duplicate sign"));
                }
                negative = true;
                rest = stripped.trim_start();
            }
        }

        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(end);
        let number = number.replace(',', "");
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return Err(invalid("invalid quantity"));
        }
        let mut quantity = Decimal::from_str(&number).map_err(|_| invalid("invalid quantity"))?;
        if negative && !quantity.is_zero() {
            quantity = -quantity;
        }

        let tail = tail.trim();
        if !tail.is_empty() {
            if commodity.is_some() {
                return Err(invalid("more than one commodity"));
            }
            let (name, after) = take_commodity(tail).ok_or_else(|| invalid("invalid commodity"))?;
            if !after.trim().is_empty() {
                return Err(invalid("unexpected text"));
            }
            commodity = Some(Commodity::suffix(name));
        }

        Ok(Amount {
            quantity,
            commodity,
        })
    }
}

fn starts_number(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// Splits a leading commodity name off `s`, handling quoted names.
fn take_commodity(s: &str) -> Option<(String, &str)> {
    if let Some(quoted) = s.strip_prefix('"') {
        let close = quoted.find('"')?;
        let name = &quoted[..close];
        if name.trim().is_empty() {
            return None;
        }
        return Some((name.to_string(), &quoted[close + 1..]));
    }
    let end = s
        .find(|c: char| c.is_ascii_digit() || c.is_whitespace() || RESERVED.contains(c))
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((s[..end].to_string(), &s[end..]))
}
