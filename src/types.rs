// 1.0: all the primitives live here. nothing in the vault works without these types.
// IDs, amounts, prices, bps, blocks, timestamps. reserve and synthetic amounts are
// separate newtypes and never mix without a price.

use crate::math::{mul_div, MathError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserve asset decimals (USDC style).
pub const RESERVE_DECIMALS: u32 = 6;
/// Synthetic asset decimals.
pub const SYNTH_DECIMALS: u32 = 18;
/// Fixed-point decimals used when a price enters integer amount math.
pub const PRICE_DECIMALS: u32 = 18;

pub const RESERVE_UNIT: u128 = 10u128.pow(RESERVE_DECIMALS);
pub const SYNTH_UNIT: u128 = 10u128.pow(SYNTH_DECIMALS);
pub const PRICE_SCALE: u128 = 10u128.pow(PRICE_DECIMALS);

// synth minor units * fixed price / this = reserve minor units
pub const SYNTH_PRICE_DIVISOR: u128 = PRICE_SCALE * (SYNTH_UNIT / RESERVE_UNIT);

pub const BPS_DENOMINATOR: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// 1.1: reserve asset amount in minor units. held, deployed, fees, payouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reserve(u128);

impl Reserve {
    pub const fn new(minor_units: u128) -> Self {
        Self(minor_units)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Whole reserve tokens, e.g. `Reserve::from_units(1_000)` is 1,000.000000.
    pub const fn from_units(units: u128) -> Self {
        Self(units * RESERVE_UNIT)
    }

    pub const fn value(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Reserve) -> Result<Self, MathError> {
        self.0.checked_add(other.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(&self, other: Reserve) -> Result<Self, MathError> {
        self.0.checked_sub(other.0).map(Self).ok_or(MathError::Underflow)
    }

    pub fn saturating_sub(&self, other: Reserve) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn abs_diff(&self, other: Reserve) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl fmt::Display for Reserve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: synthetic asset amount in minor units. supply, mint output, burn input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Synth(u128);

impl Synth {
    pub const fn new(minor_units: u128) -> Self {
        Self(minor_units)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_units(units: u128) -> Self {
        Self(units * SYNTH_UNIT)
    }

    pub const fn value(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Synth) -> Result<Self, MathError> {
        self.0.checked_add(other.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(&self, other: Synth) -> Result<Self, MathError> {
        self.0.checked_sub(other.0).map(Self).ok_or(MathError::Underflow)
    }
}

impl fmt::Display for Synth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: reserve asset per one synthetic unit (EUR/USD ~ 1.08). must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value > Decimal::ZERO);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 18-decimal fixed point for integer amount math. prices finer than 1e-18 truncate to zero,
    /// which callers treat as an overflow rather than a free asset.
    pub fn to_fixed(&self) -> Result<u128, MathError> {
        let scaled = self
            .0
            .checked_mul(dec!(1_000_000_000_000_000_000))
            .ok_or(MathError::Overflow)?;
        match scaled.trunc().to_u128() {
            Some(0) | None => Err(MathError::Overflow),
            Some(fixed) => Ok(fixed),
        }
    }

    /// Reserve value of a synthetic amount at this price.
    pub fn synth_to_reserve(&self, amount: Synth) -> Result<Reserve, MathError> {
        mul_div(amount.value(), self.to_fixed()?, SYNTH_PRICE_DIVISOR).map(Reserve::new)
    }

    /// Synthetic amount bought by a reserve amount at this price.
    pub fn reserve_to_synth(&self, amount: Reserve) -> Result<Synth, MathError> {
        mul_div(amount.value(), SYNTH_PRICE_DIVISOR, self.to_fixed()?).map(Synth::new)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.4: basis points. 100 bps = 1%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bps(u32);

impl Bps {
    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    // 10000 - bps, floored at zero
    pub const fn complement(&self) -> u32 {
        BPS_DENOMINATOR.saturating_sub(self.0)
    }

    /// `amount * (10000 - bps) / 10000`, rounded down. whatever is cut off is
    /// `amount - net`, so a fee taken this way rounds up.
    pub fn net_of(&self, amount: u128) -> Result<u128, MathError> {
        mul_div(amount, self.complement() as u128, BPS_DENOMINATOR as u128)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

// 1.5: host block height. the price guard rate-limits oracle reads by blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    pub fn since(&self, earlier: BlockNumber) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

// 1.6: millisecond timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}
