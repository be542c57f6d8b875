// 9.5 deployment.rs: wires a vault to in-memory collaborators. the simulator and the
// integration tests start here; every mock hands out a shared handle so balances and
// knobs stay reachable after the vault takes ownership of its copy.

use crate::config::VaultConfig;
use crate::custody::MockReserveToken;
use crate::engine::{Collaborators, Vault, VaultError, VaultHandle};
use crate::margin::MockMarginPool;
use crate::price_feed::MockPriceSource;
use crate::synthetic::MockSyntheticToken;
use crate::types::{AccountId, Reserve};
use crate::yield_venue::MockYieldVenue;
use rust_decimal::Decimal;

/// The vault's own account on the mock reserve token.
pub const VAULT_ACCOUNT: AccountId = AccountId(1_000);

#[derive(Debug, Clone)]
pub struct MockDeployment {
    pub config: VaultConfig,
    pub price: MockPriceSource,
    pub reserve: MockReserveToken,
    pub synthetic: MockSyntheticToken,
    pub margin_pool: MockMarginPool,
    pub yield_venue: MockYieldVenue,
}

impl MockDeployment {
    pub fn new(config: VaultConfig, initial_price: Decimal) -> Self {
        let reserve = MockReserveToken::new(VAULT_ACCOUNT);
        let yield_venue = MockYieldVenue::new(config.roles.yield_venue, reserve.clone());

        Self {
            price: MockPriceSource::new("mock_eur_usd", initial_price),
            synthetic: MockSyntheticToken::new(),
            margin_pool: MockMarginPool::default(),
            reserve,
            yield_venue,
            config,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            price_source: Box::new(self.price.clone()),
            reserve: Box::new(self.reserve.clone()),
            synthetic: Box::new(self.synthetic.clone()),
            margin_pool: Box::new(self.margin_pool.clone()),
            yield_venue: Box::new(self.yield_venue.clone()),
        }
    }

    /// A vault with the cache primed from the current mock price.
    pub fn vault(&self) -> Result<Vault, VaultError> {
        let mut vault = Vault::new(self.config.clone(), self.collaborators())?;
        vault.refresh_price(self.config.roles.governance)?;
        Ok(vault)
    }

    pub fn handle(&self) -> Result<VaultHandle, VaultError> {
        Ok(VaultHandle::new(self.vault()?))
    }

    pub fn fund(&self, account: AccountId, units: u128) {
        self.reserve.mint(account, Reserve::from_units(units));
    }

    pub fn governance(&self) -> AccountId {
        self.config.roles.governance
    }

    pub fn margin_account(&self) -> AccountId {
        self.config.roles.margin_pool
    }

    pub fn yield_account(&self) -> AccountId {
        self.config.roles.yield_venue
    }
}
