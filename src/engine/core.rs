// 8.0 engine/core.rs: the vault. owns the ledger, the price cache and every collaborator.
// all mutation goes through &mut self, so one operation runs at a time by construction.

use super::results::VaultError;
use crate::capability::Capability;
use crate::config::VaultConfig;
use crate::custody::ReserveCustody;
use crate::events::{Event, EventCollector, EventEmitter, EventPayload};
use crate::ledger::CollateralLedger;
use crate::margin::MarginPool;
use crate::price_feed::{PriceCache, PriceSource};
use crate::synthetic::SyntheticToken;
use crate::types::{AccountId, BlockNumber, Reserve, Timestamp};
use crate::yield_venue::YieldVenue;
use std::fmt;
use tracing::debug;

/// External systems the vault talks to. each one is a trait object so deployments and
/// tests plug in their own.
pub struct Collaborators {
    pub price_source: Box<dyn PriceSource>,
    pub reserve: Box<dyn ReserveCustody>,
    pub synthetic: Box<dyn SyntheticToken>,
    pub margin_pool: Box<dyn MarginPool>,
    pub yield_venue: Box<dyn YieldVenue>,
}

/** 8.1: main vault struct. all state lives here */
pub struct Vault {
    pub(super) config: VaultConfig,
    pub(super) ledger: CollateralLedger,
    pub(super) price_cache: PriceCache,
    pub(super) collaborators: Collaborators,
    pub(super) events: EventCollector,
    pub(super) paused: bool,
    pub(super) in_flight: bool,
    pub(super) block: BlockNumber,
    pub(super) current_time: Timestamp,
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("ledger", &self.ledger)
            .field("price_cache", &self.price_cache)
            .field("paused", &self.paused)
            .field("block", &self.block)
            .finish_non_exhaustive()
    }
}

impl Vault {
    pub fn new(config: VaultConfig, collaborators: Collaborators) -> Result<Self, VaultError> {
        config.validate()?;

        Ok(Self {
            ledger: CollateralLedger::new(config.fees, config.thresholds),
            price_cache: PriceCache::new(config.oracle),
            events: EventCollector::new(config.max_events),
            config,
            collaborators,
            paused: false,
            in_flight: false,
            block: BlockNumber(0),
            current_time: Timestamp::from_millis(0),
        })
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn set_block(&mut self, block: BlockNumber) {
        self.block = block;
    }

    pub fn block(&self) -> BlockNumber {
        self.block
    }

    /// One block later, 12 seconds on.
    pub fn advance_block(&mut self) {
        self.block = self.block.next();
        self.advance_time(12_000);
    }

    pub fn ledger(&self) -> &CollateralLedger {
        &self.ledger
    }

    pub fn price_cache(&self) -> &PriceCache {
        &self.price_cache
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn aggregate_margin(&self) -> Reserve {
        self.collaborators.margin_pool.aggregate_margin()
    }

    /// Deployed reserve the venue can actually hand back right now.
    pub fn available_from_yield_venue(&self) -> Reserve {
        self.ledger
            .reserve_deployed_to_yield
            .min(self.collaborators.yield_venue.available_balance())
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.events()
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    pub(super) fn require_capability(&self, caller: AccountId, required: Capability) -> Result<(), VaultError> {
        if self.config.roles.grants(caller, required) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized { caller, required })
        }
    }

    pub(super) fn ensure_not_paused(&self) -> Result<(), VaultError> {
        if self.paused {
            Err(VaultError::Paused)
        } else {
            Ok(())
        }
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(self.events.next_id(), self.block, self.current_time, payload);
        debug!(id = event.id.0, block = event.block.0, payload = ?event.payload, "event");
        self.events.emit(event);
    }
}
