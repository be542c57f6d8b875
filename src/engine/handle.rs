// 8.7 engine/handle.rs: shared entry point. a collaborator that holds a VaultHandle and
// calls back in while an operation is running gets ReentrantCall instead of a second
// mutable borrow. nothing ever waits on the borrow.

use super::core::Vault;
use super::results::{LiquidationRedemption, MintResult, RedeemResult, VaultError};
use crate::liquidation::LiquidationSnapshot;
use crate::types::{AccountId, Reserve, Synth};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct VaultHandle {
    inner: Rc<RefCell<Vault>>,
}

impl VaultHandle {
    pub fn new(vault: Vault) -> Self {
        Self {
            inner: Rc::new(RefCell::new(vault)),
        }
    }

    /// Run `f` with exclusive access, or fail if an operation is already in flight.
    pub fn with<T>(&self, f: impl FnOnce(&mut Vault) -> Result<T, VaultError>) -> Result<T, VaultError> {
        let mut vault = self.inner.try_borrow_mut().map_err(|_| {
            warn!("reentrant call rejected");
            VaultError::ReentrantCall
        })?;
        f(&mut vault)
    }

    /// Read-only view. fails the same way while an operation holds the vault.
    pub fn inspect(&self) -> Result<Ref<'_, Vault>, VaultError> {
        self.inner.try_borrow().map_err(|_| VaultError::ReentrantCall)
    }

    pub fn mint(&self, caller: AccountId, reserve_in: Reserve, min_synthetic_out: Synth) -> Result<MintResult, VaultError> {
        self.with(|vault| vault.mint(caller, reserve_in, min_synthetic_out))
    }

    pub fn redeem(&self, caller: AccountId, synthetic_in: Synth, min_reserve_out: Reserve) -> Result<RedeemResult, VaultError> {
        self.with(|vault| vault.redeem(caller, synthetic_in, min_reserve_out))
    }

    pub fn redeem_in_liquidation_mode(
        &self,
        caller: AccountId,
        synthetic_in: Synth,
        min_reserve_out: Reserve,
    ) -> Result<LiquidationRedemption, VaultError> {
        self.with(|vault| vault.redeem_in_liquidation_mode(caller, synthetic_in, min_reserve_out))
    }

    pub fn liquidation_status(&self) -> Result<LiquidationSnapshot, VaultError> {
        self.with(|vault| vault.liquidation_status())
    }

    pub fn credit_margin(&self, caller: AccountId, amount: Reserve) -> Result<(), VaultError> {
        self.with(|vault| vault.credit_margin(caller, amount))
    }

    pub fn debit_margin(&self, caller: AccountId, recipient: AccountId, amount: Reserve) -> Result<(), VaultError> {
        self.with(|vault| vault.debit_margin(caller, recipient, amount))
    }

    pub fn deploy_to_yield(&self, caller: AccountId, amount: Reserve) -> Result<(), VaultError> {
        self.with(|vault| vault.deploy_to_yield(caller, amount))
    }

    pub fn withdraw_from_yield(&self, caller: AccountId, amount: Reserve) -> Result<Reserve, VaultError> {
        self.with(|vault| vault.withdraw_from_yield(caller, amount))
    }
}
