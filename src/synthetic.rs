// 9.3 synthetic.rs: the pegged token. the vault asks it to mint and burn; token semantics
// (allowances, transfers between holders) live on the other side of this trait.

use crate::custody::CollaboratorError;
use crate::types::{AccountId, Synth};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub trait SyntheticToken {
    fn mint_to(&mut self, recipient: AccountId, amount: Synth) -> Result<(), CollaboratorError>;

    fn burn_from(&mut self, holder: AccountId, amount: Synth) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Default)]
struct SynthBook {
    balances: HashMap<AccountId, u128>,
    total_supply: u128,
    reject_mints: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockSyntheticToken {
    book: Rc<RefCell<SynthBook>>,
}

impl MockSyntheticToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: AccountId) -> Synth {
        Synth::new(self.book.borrow().balances.get(&holder).copied().unwrap_or(0))
    }

    pub fn total_supply(&self) -> Synth {
        Synth::new(self.book.borrow().total_supply)
    }

    pub fn set_reject_mints(&self, reject: bool) {
        self.book.borrow_mut().reject_mints = reject;
    }

    /// Holder-to-holder transfer, used by tests to spread supply.
    pub fn transfer(&self, from: AccountId, to: AccountId, amount: Synth) -> Result<(), CollaboratorError> {
        let mut book = self.book.borrow_mut();
        let available = book.balances.get(&from).copied().unwrap_or(0);
        if available < amount.value() {
            return Err(CollaboratorError::InsufficientBalance {
                account: from,
                requested: amount.value(),
                available,
            });
        }
        book.balances.insert(from, available - amount.value());
        *book.balances.entry(to).or_insert(0) += amount.value();
        Ok(())
    }
}

impl SyntheticToken for MockSyntheticToken {
    fn mint_to(&mut self, recipient: AccountId, amount: Synth) -> Result<(), CollaboratorError> {
        let mut book = self.book.borrow_mut();
        if book.reject_mints {
            return Err(CollaboratorError::Rejected("synthetic token".to_string()));
        }
        *book.balances.entry(recipient).or_insert(0) += amount.value();
        book.total_supply += amount.value();
        Ok(())
    }

    fn burn_from(&mut self, holder: AccountId, amount: Synth) -> Result<(), CollaboratorError> {
        let mut book = self.book.borrow_mut();
        let available = book.balances.get(&holder).copied().unwrap_or(0);
        if available < amount.value() {
            return Err(CollaboratorError::InsufficientBalance {
                account: holder,
                requested: amount.value(),
                available,
            });
        }
        book.balances.insert(holder, available - amount.value());
        book.total_supply -= amount.value();
        Ok(())
    }
}
