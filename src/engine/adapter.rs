// 8.5 engine/adapter.rs: reserve adapter. margin pool credits and debits, yield venue
// deployment, and the verified transfer helpers every other operation uses.
//
// no collaborator's word is taken for a transfer. the vault balance is read before and
// after each call and the observed delta is what gets booked.

use super::atomic::{Compensation, Journal};
use super::core::Vault;
use super::results::VaultError;
use crate::capability::Capability;
use crate::events::EventPayload;
use crate::types::{AccountId, Reserve};
use tracing::{debug, info, warn};

/// What the venue claimed to send and what the vault actually received.
#[derive(Debug, Clone, Copy)]
pub(super) struct YieldDelivery {
    pub reported: Reserve,
    pub observed: Reserve,
}

impl Vault {
    /// Pull `amount` from `from` into the vault and check it all arrived.
    pub(super) fn pull_reserve(
        &mut self,
        from: AccountId,
        amount: Reserve,
        journal: &mut Journal,
    ) -> Result<(), VaultError> {
        let custody = &mut self.collaborators.reserve;
        let before = custody.vault_balance();
        custody.pull_from(from, amount)?;
        let observed = custody.vault_balance().saturating_sub(before);

        if !observed.is_zero() {
            journal.record(Compensation::RefundReserve { to: from, amount: observed });
        }
        if observed != amount {
            warn!(expected = %amount, %observed, %from, "inbound reserve transfer short");
            return Err(VaultError::ReserveTransferMismatch {
                expected: amount,
                observed,
            });
        }
        Ok(())
    }

    /// Pay `amount` out of the vault. always the last collaborator call of an operation.
    pub(super) fn push_reserve(&mut self, to: AccountId, amount: Reserve) -> Result<(), VaultError> {
        let custody = &mut self.collaborators.reserve;
        let before = custody.vault_balance();
        custody.push_to(to, amount)?;
        let observed = before.saturating_sub(custody.vault_balance());

        if observed != amount {
            warn!(expected = %amount, %observed, %to, "outbound reserve transfer mismatch");
            return Err(VaultError::ReserveTransferMismatch {
                expected: amount,
                observed,
            });
        }
        Ok(())
    }

    /// Withdraw from the venue and reconcile its claim against what landed in the vault.
    /// Ledger booking is left to the caller.
    pub(super) fn pull_from_yield(&mut self, amount: Reserve, journal: &mut Journal) -> Result<YieldDelivery, VaultError> {
        let before = self.collaborators.reserve.vault_balance();
        let reported = self.collaborators.yield_venue.withdraw(amount)?;
        let observed = self.collaborators.reserve.vault_balance().saturating_sub(before);

        if !observed.is_zero() {
            journal.record(Compensation::Redeploy { amount: observed });
        }

        let tolerance = self.config.yield_withdraw_tolerance;
        if reported.abs_diff(observed) > tolerance {
            warn!(%reported, %observed, %tolerance, "yield venue delivery mismatch");
            return Err(VaultError::YieldWithdrawalMismatch { reported, observed });
        }
        if observed.checked_add(tolerance)? < amount {
            return Err(VaultError::InsufficientLiquidity {
                requested: amount,
                available: observed,
            });
        }
        Ok(YieldDelivery { reported, observed })
    }

    /// Bring held reserve up to `needed`, drawing the difference from the venue.
    /// Returns what arrived.
    ///
    /// The request carries `yield_withdraw_tolerance` on top of the shortfall (as far as
    /// the venue can pay), so a delivery short by no more than the tolerance still covers it.
    pub(super) fn cover_from_yield(&mut self, needed: Reserve, journal: &mut Journal) -> Result<Reserve, VaultError> {
        let shortfall = needed.saturating_sub(self.ledger.reserve_held_direct);
        if shortfall.is_zero() {
            return Ok(Reserve::zero());
        }

        let padded = shortfall.checked_add(self.config.yield_withdraw_tolerance)?;
        let request = padded.min(self.available_from_yield_venue()).max(shortfall);

        let delivery = self.pull_from_yield(request, journal)?;
        self.ledger.return_from_yield(request, delivery.observed)?;
        debug!(%shortfall, %request, reported = %delivery.reported, observed = %delivery.observed, "covered from yield");

        if self.ledger.reserve_held_direct < needed {
            return Err(VaultError::InsufficientLiquidity {
                requested: needed,
                available: self.ledger.reserve_held_direct,
            });
        }
        Ok(delivery.observed)
    }

    /// Margin pool moved `amount` of reserve into the vault.
    pub fn credit_margin(&mut self, caller: AccountId, amount: Reserve) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::MarginPool)?;
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("credit_margin", |vault, journal| {
            vault.pull_reserve(caller, amount, journal)?;
            vault.ledger.credit_held(amount)?;

            let held_after = vault.ledger.reserve_held_direct;
            info!(%amount, %held_after, "margin credited");
            vault.emit_event(EventPayload::MarginCredited { amount, held_after });
            Ok(())
        })
    }

    pub fn debit_margin(&mut self, caller: AccountId, recipient: AccountId, amount: Reserve) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::MarginPool)?;
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("debit_margin", |vault, _journal| {
            let held = vault.ledger.reserve_held_direct;
            if amount > held {
                return Err(VaultError::InsufficientReserve {
                    requested: amount,
                    available: held,
                });
            }

            vault.ledger.debit_held(amount)?;
            vault.push_reserve(recipient, amount)?;

            let held_after = vault.ledger.reserve_held_direct;
            info!(%amount, %recipient, %held_after, "margin debited");
            vault.emit_event(EventPayload::MarginDebited {
                recipient,
                amount,
                held_after,
            });
            Ok(())
        })
    }

    pub fn deploy_to_yield(&mut self, caller: AccountId, amount: Reserve) -> Result<(), VaultError> {
        self.require_capability(caller, Capability::YieldVenue)?;
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("deploy_to_yield", |vault, journal| {
            let held = vault.ledger.reserve_held_direct;
            if amount > held {
                return Err(VaultError::InsufficientReserve {
                    requested: amount,
                    available: held,
                });
            }
            vault.ledger.move_to_yield(amount)?;

            let before = vault.collaborators.reserve.vault_balance();
            vault.collaborators.yield_venue.deploy(amount)?;
            let observed = before.saturating_sub(vault.collaborators.reserve.vault_balance());
            if !observed.is_zero() {
                journal.record(Compensation::Recall { amount: observed });
            }
            if observed != amount {
                return Err(VaultError::ReserveTransferMismatch {
                    expected: amount,
                    observed,
                });
            }

            let deployed_after = vault.ledger.reserve_deployed_to_yield;
            info!(%amount, %deployed_after, "reserve deployed to yield");
            vault.emit_event(EventPayload::YieldDeployed { amount, deployed_after });
            Ok(())
        })
    }

    /// Explicit pull-back of deployed reserve. Returns what arrived.
    pub fn withdraw_from_yield(&mut self, caller: AccountId, amount: Reserve) -> Result<Reserve, VaultError> {
        self.require_capability(caller, Capability::YieldVenue)?;
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }

        self.atomically("withdraw_from_yield", |vault, journal| {
            let deployed = vault.ledger.reserve_deployed_to_yield;
            if amount > deployed {
                return Err(VaultError::InsufficientReserve {
                    requested: amount,
                    available: deployed,
                });
            }

            let YieldDelivery { reported, observed } = vault.pull_from_yield(amount, journal)?;
            vault.ledger.return_from_yield(amount, observed)?;

            let deployed_after = vault.ledger.reserve_deployed_to_yield;
            info!(%amount, %reported, %observed, %deployed_after, "reserve withdrawn from yield");
            vault.emit_event(EventPayload::YieldWithdrawn {
                reported,
                observed,
                deployed_after,
            });
            Ok(observed)
        })
    }

    /// Interest above the deployed principal comes home and is booked as fee income.
    pub fn harvest_yield(&mut self, caller: AccountId) -> Result<Reserve, VaultError> {
        self.require_capability(caller, Capability::YieldVenue)?;

        self.atomically("harvest_yield", |vault, journal| {
            let available = vault.collaborators.yield_venue.available_balance();
            let surplus = available.saturating_sub(vault.ledger.reserve_deployed_to_yield);
            if surplus.is_zero() {
                return Ok(Reserve::zero());
            }

            let received = vault.pull_from_yield(surplus, journal)?.observed;
            vault.ledger.return_from_yield(Reserve::zero(), received)?;
            vault.ledger.accrue_fee(received)?;

            info!(amount = %received, "yield harvested");
            vault.emit_event(EventPayload::YieldHarvested { amount: received });
            Ok(received)
        })
    }
}
