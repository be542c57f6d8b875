// 9.4 yield_venue.rs: where idle reserve earns interest. the venue reports what it
// returned; the vault measures what actually arrived. the mock can be told to deliver
// less than asked, or to claim more than it sent, so that check has something to catch.

use crate::custody::{CollaboratorError, MockReserveToken};
use crate::types::{AccountId, Reserve};
use std::cell::Cell;
use std::rc::Rc;

pub trait YieldVenue {
    /// Take `amount` of reserve from the vault.
    fn deploy(&mut self, amount: Reserve) -> Result<(), CollaboratorError>;

    /// Return up to `amount` to the vault. the value is the venue's own claim.
    fn withdraw(&mut self, amount: Reserve) -> Result<Reserve, CollaboratorError>;

    /// Reserve the venue could return right now, interest included.
    fn available_balance(&self) -> Reserve;
}

#[derive(Debug, Clone)]
pub struct MockYieldVenue {
    account: AccountId,
    token: MockReserveToken,
    // delivered = reported - short_delivery
    short_delivery: Rc<Cell<u128>>,
    // reported = requested + over_report
    over_report: Rc<Cell<u128>>,
    liquidity_cap: Rc<Cell<Option<u128>>>,
}

impl MockYieldVenue {
    pub fn new(account: AccountId, token: MockReserveToken) -> Self {
        Self {
            account,
            token,
            short_delivery: Rc::new(Cell::new(0)),
            over_report: Rc::new(Cell::new(0)),
            liquidity_cap: Rc::new(Cell::new(None)),
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn balance(&self) -> Reserve {
        self.token.balance_of(self.account)
    }

    pub fn accrue_interest(&self, amount: Reserve) {
        self.token.mint(self.account, amount);
    }

    pub fn set_short_delivery(&self, shortfall: Reserve) {
        self.short_delivery.set(shortfall.value());
    }

    pub fn set_over_report(&self, extra: Reserve) {
        self.over_report.set(extra.value());
    }

    /// Limit how much the venue will hand back (utilization cap).
    pub fn set_liquidity_cap(&self, cap: Option<Reserve>) {
        self.liquidity_cap.set(cap.map(|c| c.value()));
    }
}

impl YieldVenue for MockYieldVenue {
    fn deploy(&mut self, amount: Reserve) -> Result<(), CollaboratorError> {
        self.token.transfer(self.token.vault_account(), self.account, amount)
    }

    fn withdraw(&mut self, amount: Reserve) -> Result<Reserve, CollaboratorError> {
        let available = self.available_balance();
        if amount > available {
            return Err(CollaboratorError::InsufficientBalance {
                account: self.account,
                requested: amount.value(),
                available: available.value(),
            });
        }
        let delivered = amount.saturating_sub(Reserve::new(self.short_delivery.get()));
        self.token.transfer(self.account, self.token.vault_account(), delivered)?;
        Ok(Reserve::new(amount.value().saturating_add(self.over_report.get())))
    }

    fn available_balance(&self) -> Reserve {
        let balance = self.balance();
        match self.liquidity_cap.get() {
            Some(cap) if cap < balance.value() => Reserve::new(cap),
            _ => balance,
        }
    }
}
