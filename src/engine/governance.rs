// 8.6 engine/governance.rs: privileged parameter changes, pause, and fee withdrawal.
// every entry point checks the Governance capability first. bounds are the same ones the
// config loader enforces, so a running vault can never hold a config it would refuse to
// start with.

use super::core::Vault;
use super::results::VaultError;
use crate::capability::Capability;
use crate::collateral::{collateralization_ratio_bps, CollateralThresholds};
use crate::config::{validate_fees, validate_oracle, validate_thresholds};
use crate::events::EventPayload;
use crate::ledger::FeeSchedule;
use crate::price_feed::OracleParams;
use crate::types::{AccountId, Bps, Reserve};
use tracing::info;

impl Vault {
    pub fn update_parameters(
        &mut self,
        caller: AccountId,
        mint_fee_bps: u32,
        redeem_fee_bps: u32,
    ) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::Governance)?;
        let fees = FeeSchedule {
            mint_fee_bps: Bps::new(mint_fee_bps),
            redeem_fee_bps: Bps::new(redeem_fee_bps),
        };
        validate_fees(&fees)?;

        self.atomically("update_parameters", |vault, _| {
            vault.ledger.fees = fees;
            vault.config.fees = fees;
            info!(%caller, mint_fee = %fees.mint_fee_bps, redeem_fee = %fees.redeem_fee_bps, "fees updated");
            vault.emit_event(EventPayload::ParametersUpdated { fees });
            Ok(())
        })
    }

    pub fn update_collateralization_thresholds(
        &mut self,
        caller: AccountId,
        min_collateral_ratio_bps: u32,
        critical_collateral_ratio_bps: u32,
    ) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::Governance)?;
        let thresholds = CollateralThresholds {
            min_collateral_ratio_bps,
            critical_collateral_ratio_bps,
        };
        validate_thresholds(&thresholds)?;

        self.atomically("update_collateralization_thresholds", |vault, _| {
            vault.ledger.thresholds = thresholds;
            vault.config.thresholds = thresholds;
            info!(
                %caller,
                min = min_collateral_ratio_bps,
                critical = critical_collateral_ratio_bps,
                "collateral thresholds updated"
            );
            vault.emit_event(EventPayload::ThresholdsUpdated { thresholds });
            Ok(())
        })
    }

    pub fn update_oracle_parameters(
        &mut self,
        caller: AccountId,
        max_deviation_bps: u32,
        min_blocks_between_updates: u64,
    ) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::Governance)?;
        let params = OracleParams {
            max_deviation_bps,
            min_blocks_between_updates,
        };
        validate_oracle(&params)?;

        self.atomically("update_oracle_parameters", |vault, _| {
            vault.price_cache.params = params;
            vault.config.oracle = params;
            info!(%caller, max_deviation_bps, min_blocks_between_updates, "oracle parameters updated");
            vault.emit_event(EventPayload::OracleParamsUpdated { params });
            Ok(())
        })
    }

    /// Stops mint and redeem. Liquidation-mode redemption stays open.
    pub fn pause(&mut self, caller: AccountId) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::Governance)?;
        self.atomically("pause", |vault, _| {
            vault.paused = true;
            info!(%caller, "vault paused");
            vault.emit_event(EventPayload::Paused { caller });
            Ok(())
        })
    }

    pub fn unpause(&mut self, caller: AccountId) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::Governance)?;
        self.atomically("unpause", |vault, _| {
            vault.paused = false;
            info!(%caller, "vault unpaused");
            vault.emit_event(EventPayload::Unpaused { caller });
            Ok(())
        })
    }

    /// Sends accrued fee income to `recipient`. Refused in liquidation mode, and refused if
    /// the withdrawal itself would put the vault at or below the critical ratio.
    pub fn withdraw_accumulated_fees(&mut self, caller: AccountId, recipient: AccountId) -> Result<Reserve, VaultError> {
        self.require_capability(caller, Capability::Governance)?;

        self.atomically("withdraw_accumulated_fees", |vault, _| {
            let price = vault.require_price()?;
            let critical = vault.ledger.thresholds.critical_collateral_ratio_bps;

            let ratio = vault.ratio_at(price)?;
            if vault.ledger.thresholds.in_liquidation_mode(ratio) {
                return Err(VaultError::LiquidationModeActive { ratio, critical });
            }

            let amount = vault.ledger.withdrawable_fees();
            if amount.is_zero() {
                return Err(VaultError::InvalidAmount);
            }

            let backing_after = vault.ratio_backing()?.checked_sub(amount)?;
            let ratio_after = collateralization_ratio_bps(backing_after, vault.ledger.synthetic_supply, price)?;
            if vault.ledger.thresholds.in_liquidation_mode(ratio_after) {
                return Err(VaultError::LiquidationModeActive {
                    ratio: ratio_after,
                    critical,
                });
            }

            vault.ledger.release_fees(amount)?;
            vault.push_reserve(recipient, amount)?;

            info!(%caller, %recipient, %amount, ratio_after, "fees withdrawn");
            vault.emit_event(EventPayload::FeesWithdrawn { recipient, amount });
            Ok(amount)
        })
    }
}
