//! Unsigned fixed-point decimal arithmetic.
//!
//! `Dec` stores values as raw units scaled by 10^12 in a `u128`. It backs the
//! fee-distribution ledger, where proportional shares must be computed without
//! truncating below the scale unit. Products widen through `BigUint`, so the
//! ratio operations are exact up to a single floor at 10^-12. No floating
//! point is involved anywhere.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of raw units per whole token: 10^12.
pub const DEC_SCALE: u128 = 1_000_000_000_000;

/// An unsigned fixed-point decimal with 12 fractional digits.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Dec(u128);

impl Dec {
    pub const ZERO: Self = Self(0);

    /// One whole unit.
    pub const ONE: Self = Self(DEC_SCALE);

    /// Construct from raw 10^-12 units.
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// The raw 10^-12 unit count.
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Construct from a whole integer amount.
    ///
    /// # Panics
    /// Panics if `value * 10^12` overflows `u128`; use [`Dec::checked_from_int`]
    /// where the input is unbounded.
    pub fn from_int(value: u128) -> Self {
        Self(value * DEC_SCALE)
    }

    /// Construct from a whole integer amount, `None` on overflow.
    pub fn checked_from_int(value: u128) -> Option<Self> {
        value.checked_mul(DEC_SCALE).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// The whole-integer part (truncated toward zero).
    pub fn floor_int(&self) -> u128 {
        self.0 / DEC_SCALE
    }

    /// The fractional part below one whole unit.
    pub fn fract(&self) -> Self {
        Self(self.0 % DEC_SCALE)
    }

    /// `floor(self * value)` as a whole integer.
    ///
    /// Exact via big-integer widening; `None` if the result exceeds `u128`.
    pub fn mul_int_floor(&self, value: u128) -> Option<u128> {
        let product = BigUint::from(self.0) * BigUint::from(value) / BigUint::from(DEC_SCALE);
        u128::try_from(product).ok()
    }

    /// `self * numer / denom` at full precision, floored at 10^-12.
    ///
    /// `None` if `denom` is zero or the result exceeds `u128`. When
    /// `numer <= denom` the result never exceeds `self`.
    pub fn checked_mul_ratio(&self, numer: u128, denom: u128) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let raw = BigUint::from(self.0) * BigUint::from(numer) / BigUint::from(denom);
        u128::try_from(raw).ok().map(Self)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frac = self.0 % DEC_SCALE;
        if frac == 0 {
            write!(f, "{}", self.floor_int())
        } else {
            let digits = format!("{frac:012}");
            write!(f, "{}.{}", self.floor_int(), digits.trim_end_matches('0'))
        }
    }
}

/// `floor(a * b / denom)` over `u128` inputs, exact via big-integer widening.
///
/// `None` if `denom` is zero or the result exceeds `u128`.
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> Option<u128> {
    if denom == 0 {
        return None;
    }
    let result = BigUint::from(a) * BigUint::from(b) / BigUint::from(denom);
    u128::try_from(result).ok()
}
