//! Collateralization ratio and the thresholds that gate minting and liquidation mode.
//!
//! ratio = (held + deployed + aggregate margin) * 10000 / (supply * price), in bps.
//! Zero supply means no debt, which is reported as the `u128::MAX` sentinel.

use crate::math::{mul_div, MathError};
use crate::types::{Price, Reserve, Synth, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// Ratio reported when there is no outstanding debt.
pub const FULLY_COLLATERALIZED: u128 = u128::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralThresholds {
    /// Minting is refused below this ratio.
    pub min_collateral_ratio_bps: u32,
    /// Liquidation mode is active at or below this ratio.
    pub critical_collateral_ratio_bps: u32,
}

impl Default for CollateralThresholds {
    fn default() -> Self {
        Self {
            min_collateral_ratio_bps: 11_000,
            critical_collateral_ratio_bps: 10_100,
        }
    }
}

impl CollateralThresholds {
    pub fn allows_mint(&self, ratio_bps: u128) -> bool {
        ratio_bps >= self.min_collateral_ratio_bps as u128
    }

    pub fn in_liquidation_mode(&self, ratio_bps: u128) -> bool {
        ratio_bps <= self.critical_collateral_ratio_bps as u128
    }
}

/// Outstanding synthetic debt valued in reserve minor units.
pub fn debt_value(supply: Synth, price: Price) -> Result<Reserve, MathError> {
    price.synth_to_reserve(supply)
}

pub fn collateralization_ratio_bps(
    backing: Reserve,
    supply: Synth,
    price: Price,
) -> Result<u128, MathError> {
    if supply.is_zero() {
        return Ok(FULLY_COLLATERALIZED);
    }
    let debt = debt_value(supply, price)?;
    // dust supply worth less than one reserve minor unit
    if debt.is_zero() {
        return Ok(FULLY_COLLATERALIZED);
    }
    mul_div(backing.value(), BPS_DENOMINATOR as u128, debt.value())
}
