//! Guarded price reads and the collateralization views built on them.

use super::core::Vault;
use super::results::VaultError;
use crate::capability::Capability;
use crate::collateral::collateralization_ratio_bps;
use crate::events::EventPayload;
use crate::price_feed::PriceOutcome;
use crate::types::{AccountId, Price, Reserve};
use tracing::{debug, info, warn};

impl Vault {
    /// Read the price through the deviation guard. Accepted reads update the cache.
    pub fn validated_price(&mut self) -> PriceOutcome {
        let source = self.collaborators.price_source.as_ref();
        let outcome = self.price_cache.validated_price(source, self.block, self.current_time);
        let source_name = source.name().to_string();

        match outcome {
            PriceOutcome::Cached(price) => {
                debug!(%price, block = self.block.0, "price served from cache");
            }
            PriceOutcome::Accepted(price) => {
                debug!(%price, source = %source_name, "price accepted");
                self.emit_event(EventPayload::PriceAccepted {
                    price,
                    source: source_name,
                });
            }
            PriceOutcome::Rejected(reason) => {
                warn!(%reason, source = %source_name, "price rejected");
                self.emit_event(EventPayload::PriceRejected {
                    reason,
                    source: source_name,
                });
            }
        }
        outcome
    }

    /// Governance override. writes the cache without the deviation check, but only from a
    /// feed that reports valid.
    pub fn refresh_price(&mut self, caller: AccountId) -> Result<Price, VaultError> {
        self.require_capability(caller, Capability::Governance)?;

        let source = self.collaborators.price_source.as_ref();
        let price = self
            .price_cache
            .refresh(source, self.block, self.current_time)?;

        info!(%price, %caller, "price refreshed");
        self.emit_event(EventPayload::PriceRefreshed { price, caller });
        Ok(price)
    }

    pub(super) fn require_price(&mut self) -> Result<Price, VaultError> {
        Ok(self.validated_price().into_result()?)
    }

    /// held + deployed + aggregate margin
    pub(super) fn ratio_backing(&self) -> Result<Reserve, VaultError> {
        let reserve = self.ledger.total_reserve()?;
        Ok(reserve.checked_add(self.aggregate_margin())?)
    }

    pub(super) fn ratio_at(&self, price: Price) -> Result<u128, VaultError> {
        let backing = self.ratio_backing()?;
        Ok(collateralization_ratio_bps(backing, self.ledger.synthetic_supply, price)?)
    }

    /// Current ratio in bps. `u128::MAX` with no supply outstanding.
    pub fn collateralization_ratio_bps(&mut self) -> Result<u128, VaultError> {
        let price = self.require_price()?;
        self.ratio_at(price)
    }

    pub fn can_mint(&mut self) -> bool {
        match self.collateralization_ratio_bps() {
            Ok(ratio) => self.ledger.thresholds.allows_mint(ratio),
            Err(_) => false,
        }
    }

    pub fn should_trigger_liquidation(&mut self) -> Result<bool, VaultError> {
        let ratio = self.collateralization_ratio_bps()?;
        Ok(self.ledger.thresholds.in_liquidation_mode(ratio))
    }
}
