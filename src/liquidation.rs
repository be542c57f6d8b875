//! Liquidation mode payout math.
//!
//! Liquidation here is protocol-wide, not per position. Once the collateralization ratio
//! sits at or below the critical threshold, every synthetic unit redeems its proportional
//! share of the remaining reserve, whatever the nominal peg says:
//!
//!   reserve_out = synthetic_amount * total_collateral / total_supply
//!
//! Evaluated sequentially, the last holder to redeem receives exactly what is left, so a
//! full redemption of the supply exhausts the collateral and nobody holds a claim larger
//! than the backing.

use crate::math::{mul_div, MathError};
use crate::types::{Price, Reserve, Synth, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// Read-only view of the protocol mode at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationSnapshot {
    pub in_liquidation_mode: bool,
    pub ratio_bps: u128,
    pub total_collateral: Reserve,
    pub total_supply: Synth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationPayout {
    pub reserve_out: Reserve,
    /// Value of the redeemed amount at the peg price.
    pub fair_value: Reserve,
    /// Pro-rata share is worth more than the peg value.
    pub is_premium: bool,
    /// Distance between pro-rata and fair value, in bps of fair value.
    pub bps: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayoutError {
    #[error("amount {amount} outside (0, {supply}]")]
    InvalidAmount { amount: Synth, supply: Synth },

    #[error(transparent)]
    Math(#[from] MathError),
}

pub fn pro_rata_share(
    synthetic_amount: Synth,
    total_collateral: Reserve,
    total_supply: Synth,
) -> Result<Reserve, PayoutError> {
    if synthetic_amount.is_zero() || synthetic_amount > total_supply {
        return Err(PayoutError::InvalidAmount {
            amount: synthetic_amount,
            supply: total_supply,
        });
    }
    let share = mul_div(synthetic_amount.value(), total_collateral.value(), total_supply.value())?;
    Ok(Reserve::new(share))
}

pub fn calculate_liquidation_payout(
    synthetic_amount: Synth,
    total_collateral: Reserve,
    total_supply: Synth,
    price: Price,
) -> Result<LiquidationPayout, PayoutError> {
    let reserve_out = pro_rata_share(synthetic_amount, total_collateral, total_supply)?;
    let fair_value = price.synth_to_reserve(synthetic_amount)?;

    let bps = if fair_value.is_zero() {
        0
    } else {
        mul_div(
            reserve_out.abs_diff(fair_value).value(),
            BPS_DENOMINATOR as u128,
            fair_value.value(),
        )?
    };

    Ok(LiquidationPayout {
        reserve_out,
        fair_value,
        is_premium: reserve_out > fair_value,
        bps,
    })
}
