//! Mint and redeem at the peg.
//!
//! Both are all-or-nothing: any failure after the first collaborator call restores the
//! ledger and undoes the transfers already made. Fees stay in the vault as reserve and
//! are tracked in `accrued_fees`.

use super::atomic::{Compensation, Journal};
use super::core::Vault;
use super::results::{MintResult, RedeemResult, VaultError};
use crate::conversion::{quote_mint, quote_redeem, MintQuote, RedeemQuote};
use crate::events::{EventPayload, MintedEvent, RedeemedEvent};
use crate::types::{AccountId, Reserve, Synth};
use tracing::info;

impl Vault {
    /// Quote only. needs a valid price, touches nothing else.
    pub fn calculate_mint_amount(&mut self, reserve_in: Reserve) -> Result<MintQuote, VaultError> {
        let price = self.require_price()?;
        Ok(quote_mint(reserve_in, price, self.ledger.fees.mint_fee_bps)?)
    }

    pub fn calculate_redeem_amount(&mut self, synthetic_in: Synth) -> Result<RedeemQuote, VaultError> {
        let price = self.require_price()?;
        Ok(quote_redeem(synthetic_in, price, self.ledger.fees.redeem_fee_bps)?)
    }

    pub fn mint(
        &mut self,
        caller: AccountId,
        reserve_in: Reserve,
        min_synthetic_out: Synth,
    ) -> Result<MintResult, VaultError> {
        self.ensure_not_paused()?;
        if reserve_in.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("mint", |vault, journal| {
            vault.execute_mint(caller, reserve_in, min_synthetic_out, journal)
        })
    }

    fn execute_mint(
        &mut self,
        caller: AccountId,
        reserve_in: Reserve,
        min_synthetic_out: Synth,
        journal: &mut Journal,
    ) -> Result<MintResult, VaultError> {
        let price = self.require_price()?;
        let ratio = self.ratio_at(price)?;
        let minimum = self.ledger.thresholds.min_collateral_ratio_bps;
        if !self.ledger.thresholds.allows_mint(ratio) {
            return Err(VaultError::UndercollateralizedMint { ratio, minimum });
        }

        let quote = quote_mint(reserve_in, price, self.ledger.fees.mint_fee_bps)?;
        if quote.synthetic_out.is_zero() {
            return Err(VaultError::InvalidAmount);
        }
        if quote.synthetic_out < min_synthetic_out {
            return Err(VaultError::ExcessiveSlippage {
                computed: quote.synthetic_out.value(),
                minimum: min_synthetic_out.value(),
            });
        }

        self.ledger.credit_held(reserve_in)?;
        self.ledger.accrue_fee(quote.fee)?;
        self.ledger.increase_supply(quote.synthetic_out)?;

        self.pull_reserve(caller, reserve_in, journal)?;
        self.collaborators.synthetic.mint_to(caller, quote.synthetic_out)?;
        journal.record(Compensation::BurnSynthetic {
            holder: caller,
            amount: quote.synthetic_out,
        });

        info!(
            account = %caller,
            reserve_in = %reserve_in,
            fee = %quote.fee,
            synthetic_out = %quote.synthetic_out,
            %price,
            "minted"
        );
        self.emit_event(EventPayload::Minted(MintedEvent {
            account_id: caller,
            reserve_in,
            fee: quote.fee,
            synthetic_out: quote.synthetic_out,
            price,
            ratio_before_bps: ratio,
        }));

        Ok(MintResult {
            reserve_in,
            fee: quote.fee,
            synthetic_out: quote.synthetic_out,
            price,
        })
    }

    pub fn redeem(
        &mut self,
        caller: AccountId,
        synthetic_in: Synth,
        min_reserve_out: Reserve,
    ) -> Result<RedeemResult, VaultError> {
        self.ensure_not_paused()?;
        if synthetic_in.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("redeem", |vault, journal| {
            vault.execute_redeem(caller, synthetic_in, min_reserve_out, journal)
        })
    }

    fn execute_redeem(
        &mut self,
        caller: AccountId,
        synthetic_in: Synth,
        min_reserve_out: Reserve,
        journal: &mut Journal,
    ) -> Result<RedeemResult, VaultError> {
        let price = self.require_price()?;
        if synthetic_in > self.ledger.synthetic_supply {
            return Err(VaultError::InvalidAmount);
        }

        let quote = quote_redeem(synthetic_in, price, self.ledger.fees.redeem_fee_bps)?;
        let available = self
            .ledger
            .reserve_held_direct
            .checked_add(self.available_from_yield_venue())?;
        if quote.reserve_out > available {
            return Err(VaultError::InsufficientLiquidity {
                requested: quote.reserve_out,
                available,
            });
        }
        if quote.reserve_out < min_reserve_out {
            return Err(VaultError::ExcessiveSlippage {
                computed: quote.reserve_out.value(),
                minimum: min_reserve_out.value(),
            });
        }

        self.ledger.decrease_supply(synthetic_in)?;
        self.collaborators.synthetic.burn_from(caller, synthetic_in)?;
        journal.record(Compensation::RemintSynthetic {
            holder: caller,
            amount: synthetic_in,
        });

        let pulled_from_yield = self.cover_from_yield(quote.reserve_out, journal)?;
        self.ledger.debit_held(quote.reserve_out)?;
        self.ledger.accrue_fee(quote.fee)?;
        self.push_reserve(caller, quote.reserve_out)?;

        info!(
            account = %caller,
            synthetic_in = %synthetic_in,
            fee = %quote.fee,
            reserve_out = %quote.reserve_out,
            pulled_from_yield = %pulled_from_yield,
            "redeemed"
        );
        self.emit_event(EventPayload::Redeemed(RedeemedEvent {
            account_id: caller,
            synthetic_in,
            fee: quote.fee,
            reserve_out: quote.reserve_out,
            price,
            pulled_from_yield,
        }));

        Ok(RedeemResult {
            synthetic_in,
            fee: quote.fee,
            reserve_out: quote.reserve_out,
            price,
            pulled_from_yield,
        })
    }
}
