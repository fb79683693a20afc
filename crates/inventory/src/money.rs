//! Currency amounts in the smallest unit (cents).

use serde::{Deserialize, Serialize};

use inventrack_core::{DomainError, DomainResult, ValueObject};

/// Non-negative currency amount, stored in cents.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest price accepted: store rows hold cents as a signed 64-bit value.
    pub const MAX_PRICE: Money = Money(i64::MAX as u64);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    /// `self × quantity`, or `None` on overflow or a negative quantity.
    pub fn checked_mul_quantity(self, quantity: i64) -> Option<Money> {
        let quantity = u64::try_from(quantity).ok()?;
        self.0.checked_mul(quantity).map(Money)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Reject amounts above [`Money::MAX_PRICE`].
    pub fn ensure_price(self) -> DomainResult<Money> {
        if self > Self::MAX_PRICE {
            return Err(too_large());
        }
        Ok(self)
    }

    /// Parse a decimal amount such as `"12.5"` or `"45.99"`.
    ///
    /// At most two fractional digits; no sign, no exponent, no separators.
    pub fn parse(input: &str) -> DomainResult<Money> {
        let s = input.trim();
        if s.is_empty() {
            return Err(DomainError::validation("price", "must not be empty"));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(DomainError::validation(
                "price",
                format!("`{s}` is not a non-negative decimal number"),
            ));
        }
        if frac.len() > 2 {
            return Err(DomainError::validation(
                "price",
                "at most two fractional digits are allowed",
            ));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| too_large())?
        };
        let frac_cents: u64 = match frac.len() {
            0 => 0,
            1 => u64::from(frac.as_bytes()[0] - b'0') * 10,
            _ => frac.parse().map_err(|_| too_large())?,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .map(Money)
            .ok_or_else(too_large)?
            .ensure_price()
    }

    /// Convert a floating-point amount (e.g. a JSON number) to cents.
    pub fn from_f64(value: f64) -> DomainResult<Money> {
        if !value.is_finite() {
            return Err(DomainError::validation("price", "must be a finite number"));
        }
        if value < 0.0 {
            return Err(DomainError::validation("price", "must not be negative"));
        }

        // 2^63 is exact in f64; every smaller scaled value fits in i64 cents.
        let scaled = value * 100.0;
        if scaled >= MAX_PRICE_BOUND_F64 {
            return Err(too_large());
        }
        let cents = scaled.round();
        if (scaled - cents).abs() > 1e-6 {
            return Err(DomainError::validation(
                "price",
                "at most two fractional digits are allowed",
            ));
        }
        Money(cents as u64).ensure_price()
    }
}

const MAX_PRICE_BOUND_F64: f64 = 9_223_372_036_854_775_808.0;

fn too_large() -> DomainError {
    DomainError::validation("price", "amount is too large")
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Price as it arrives at the boundary: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    pub fn to_money(&self) -> DomainResult<Money> {
        match self {
            PriceInput::Number(v) => Money::from_f64(*v),
            PriceInput::Text(s) => Money::parse(s),
        }
    }
}
