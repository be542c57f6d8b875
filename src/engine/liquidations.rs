// 8.4 engine/liquidations.rs: protocol-wide liquidation mode.
// the mode is derived from the ratio on every call and never stored. while it holds,
// holders redeem their pro-rata share of held + deployed reserve instead of the peg value.
// pause does not reach this path: holders can always exit an undercollateralized vault.

use super::atomic::Compensation;
use super::core::Vault;
use super::results::{LiquidationRedemption, VaultError};
use crate::events::{EventPayload, LiquidationRedeemedEvent};
use crate::liquidation::{self, LiquidationPayout, LiquidationSnapshot};
use crate::types::{AccountId, Reserve, Synth};
use tracing::info;

impl Vault {
    pub fn liquidation_status(&mut self) -> Result<LiquidationSnapshot, VaultError> {
        let price = self.require_price()?;
        let ratio_bps = self.ratio_at(price)?;

        Ok(LiquidationSnapshot {
            in_liquidation_mode: self.ledger.thresholds.in_liquidation_mode(ratio_bps),
            ratio_bps,
            total_collateral: self.ledger.total_reserve()?,
            total_supply: self.ledger.synthetic_supply,
        })
    }

    /// What `synthetic_amount` would receive right now under pro-rata distribution.
    pub fn calculate_liquidation_payout(&mut self, synthetic_amount: Synth) -> Result<LiquidationPayout, VaultError> {
        let price = self.require_price()?;
        let total_collateral = self.ledger.total_reserve()?;

        Ok(liquidation::calculate_liquidation_payout(
            synthetic_amount,
            total_collateral,
            self.ledger.synthetic_supply,
            price,
        )?)
    }

    pub fn redeem_in_liquidation_mode(
        &mut self,
        caller: AccountId,
        synthetic_in: Synth,
        min_reserve_out: Reserve,
    ) -> Result<LiquidationRedemption, VaultError> {
        if synthetic_in.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("redeem_in_liquidation_mode", |vault, journal| {
            let status = vault.liquidation_status()?;
            if !status.in_liquidation_mode {
                return Err(VaultError::NotInLiquidationMode {
                    ratio: status.ratio_bps,
                    critical: vault.ledger.thresholds.critical_collateral_ratio_bps,
                });
            }

            let payout = vault.calculate_liquidation_payout(synthetic_in)?;
            if payout.reserve_out < min_reserve_out {
                return Err(VaultError::ExcessiveSlippage {
                    computed: payout.reserve_out.value(),
                    minimum: min_reserve_out.value(),
                });
            }

            let available = vault
                .ledger
                .reserve_held_direct
                .checked_add(vault.available_from_yield_venue())?;
            if payout.reserve_out > available {
                return Err(VaultError::InsufficientLiquidity {
                    requested: payout.reserve_out,
                    available,
                });
            }

            vault.ledger.decrease_supply(synthetic_in)?;
            vault.collaborators.synthetic.burn_from(caller, synthetic_in)?;
            journal.record(Compensation::RemintSynthetic {
                holder: caller,
                amount: synthetic_in,
            });

            let pulled_from_yield = vault.cover_from_yield(payout.reserve_out, journal)?;
            vault.ledger.debit_held(payout.reserve_out)?;
            vault.ledger.cap_fees_to_reserve()?;
            vault.push_reserve(caller, payout.reserve_out)?;

            info!(
                account = %caller,
                synthetic_in = %synthetic_in,
                reserve_out = %payout.reserve_out,
                fair_value = %payout.fair_value,
                ratio_bps = status.ratio_bps,
                "liquidation-mode redemption"
            );
            vault.emit_event(EventPayload::LiquidationRedeemed(LiquidationRedeemedEvent {
                account_id: caller,
                synthetic_in,
                reserve_out: payout.reserve_out,
                fair_value: payout.fair_value,
                ratio_bps: status.ratio_bps,
                pulled_from_yield,
            }));

            Ok(LiquidationRedemption {
                synthetic_in,
                reserve_out: payout.reserve_out,
                fair_value: payout.fair_value,
                is_premium: payout.is_premium,
                bps: payout.bps,
                pulled_from_yield,
            })
        })
    }
}
