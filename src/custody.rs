// 9.2 custody.rs: the reserve asset as the vault sees it. pull from a caller, push to a
// recipient, and read the vault's own balance. the engine never trusts a transfer; it
// re-reads vault_balance() around every call and compares the delta.

use crate::types::{AccountId, Reserve};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Failure reported by any external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("insufficient balance for {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        requested: u128,
        available: u128,
    },

    #[error("{0} rejected the call")]
    Rejected(String),
}

pub trait ReserveCustody {
    /// Move `amount` from `from` into the vault.
    fn pull_from(&mut self, from: AccountId, amount: Reserve) -> Result<(), CollaboratorError>;

    /// Move `amount` from the vault to `to`.
    fn push_to(&mut self, to: AccountId, amount: Reserve) -> Result<(), CollaboratorError>;

    /// Reserve currently held by the vault, as observed on the token.
    fn vault_balance(&self) -> Reserve;
}

#[derive(Debug, Default)]
struct ReserveBook {
    balances: HashMap<AccountId, u128>,
    // skimmed from every inbound vault transfer (fee-on-transfer token)
    inbound_haircut: u128,
    frozen: bool,
}

/// In-memory reserve token. clones share one book so the yield venue mock, the vault and
/// the test all see the same balances.
#[derive(Debug, Clone)]
pub struct MockReserveToken {
    vault: AccountId,
    book: Rc<RefCell<ReserveBook>>,
}

impl MockReserveToken {
    pub fn new(vault: AccountId) -> Self {
        Self {
            vault,
            book: Rc::new(RefCell::new(ReserveBook::default())),
        }
    }

    pub fn vault_account(&self) -> AccountId {
        self.vault
    }

    pub fn mint(&self, account: AccountId, amount: Reserve) {
        let mut book = self.book.borrow_mut();
        *book.balances.entry(account).or_insert(0) += amount.value();
    }

    pub fn balance_of(&self, account: AccountId) -> Reserve {
        Reserve::new(self.book.borrow().balances.get(&account).copied().unwrap_or(0))
    }

    pub fn set_inbound_haircut(&self, haircut: Reserve) {
        self.book.borrow_mut().inbound_haircut = haircut.value();
    }

    /// Refuse every transfer until unfrozen.
    pub fn set_frozen(&self, frozen: bool) {
        self.book.borrow_mut().frozen = frozen;
    }

    pub fn transfer(&self, from: AccountId, to: AccountId, amount: Reserve) -> Result<(), CollaboratorError> {
        let mut book = self.book.borrow_mut();
        if book.frozen {
            return Err(CollaboratorError::Rejected("reserve token".to_string()));
        }

        let available = book.balances.get(&from).copied().unwrap_or(0);
        if available < amount.value() {
            return Err(CollaboratorError::InsufficientBalance {
                account: from,
                requested: amount.value(),
                available,
            });
        }

        let delivered = if to == self.vault {
            amount.value().saturating_sub(book.inbound_haircut)
        } else {
            amount.value()
        };

        book.balances.insert(from, available - amount.value());
        *book.balances.entry(to).or_insert(0) += delivered;
        Ok(())
    }
}

impl ReserveCustody for MockReserveToken {
    fn pull_from(&mut self, from: AccountId, amount: Reserve) -> Result<(), CollaboratorError> {
        self.transfer(from, self.vault, amount)
    }

    fn push_to(&mut self, to: AccountId, amount: Reserve) -> Result<(), CollaboratorError> {
        self.transfer(self.vault, to, amount)
    }

    fn vault_balance(&self) -> Reserve {
        self.balance_of(self.vault)
    }
}
