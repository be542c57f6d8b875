// 11.0: every committed state change produces an event. used for audit trails and for
// notifying off-core systems. rejected prices and rolled back operations are logged too,
// since an operator needs to see what the guard refused.

use crate::capability::Capability;
use crate::collateral::CollateralThresholds;
use crate::ledger::FeeSchedule;
use crate::price_feed::{OracleParams, PriceRejection};
use crate::types::{AccountId, BlockNumber, Price, Reserve, Synth, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub block: BlockNumber,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, block: BlockNumber, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            block,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Price events
    PriceAccepted { price: Price, source: String },
    PriceRejected { reason: PriceRejection, source: String },
    PriceRefreshed { price: Price, caller: AccountId },

    // Conversion events
    Minted(MintedEvent),
    Redeemed(RedeemedEvent),
    LiquidationRedeemed(LiquidationRedeemedEvent),

    // Adapter events
    MarginCredited { amount: Reserve, held_after: Reserve },
    MarginDebited { recipient: AccountId, amount: Reserve, held_after: Reserve },
    YieldDeployed { amount: Reserve, deployed_after: Reserve },
    YieldWithdrawn { reported: Reserve, observed: Reserve, deployed_after: Reserve },
    YieldHarvested { amount: Reserve },

    // Governance events
    ParametersUpdated { fees: FeeSchedule },
    ThresholdsUpdated { thresholds: CollateralThresholds },
    OracleParamsUpdated { params: OracleParams },
    Paused { caller: AccountId },
    Unpaused { caller: AccountId },
    FeesWithdrawn { recipient: AccountId, amount: Reserve },

    // Failure events
    OperationRolledBack(RollbackEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintedEvent {
    pub account_id: AccountId,
    pub reserve_in: Reserve,
    pub fee: Reserve,
    pub synthetic_out: Synth,
    pub price: Price,
    pub ratio_before_bps: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemedEvent {
    pub account_id: AccountId,
    pub synthetic_in: Synth,
    pub fee: Reserve,
    pub reserve_out: Reserve,
    pub price: Price,
    pub pulled_from_yield: Reserve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationRedeemedEvent {
    pub account_id: AccountId,
    pub synthetic_in: Synth,
    pub reserve_out: Reserve,
    pub fair_value: Reserve,
    pub ratio_bps: u128,
    pub pulled_from_yield: Reserve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackEvent {
    pub operation: String,
    pub error: String,
    pub compensations: usize,
    /// compensation steps that themselves failed
    pub failed_compensations: usize,
}

impl RollbackEvent {
    pub fn is_clean(&self) -> bool {
        self.failed_compensations == 0
    }
}

/// Capability a payload's actor must have held, if any.
pub fn required_capability(payload: &EventPayload) -> Option<Capability> {
    match payload {
        EventPayload::PriceRefreshed { .. }
        | EventPayload::ParametersUpdated { .. }
        | EventPayload::ThresholdsUpdated { .. }
        | EventPayload::OracleParamsUpdated { .. }
        | EventPayload::Paused { .. }
        | EventPayload::Unpaused { .. }
        | EventPayload::FeesWithdrawn { .. } => Some(Capability::Governance),
        EventPayload::MarginCredited { .. } | EventPayload::MarginDebited { .. } => Some(Capability::MarginPool),
        EventPayload::YieldDeployed { .. }
        | EventPayload::YieldWithdrawn { .. }
        | EventPayload::YieldHarvested { .. } => Some(Capability::YieldVenue),
        _ => None,
    }
}

pub trait EventEmitter {
    fn emit(&mut self, event: Event);
}

/// Ring buffer of the most recent events. ids keep counting after old events drop off.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: VecDeque<Event>,
    next_id: u64,
    capacity: usize,
}

impl EventCollector {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            next_id: 1,
            capacity,
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn next_id(&mut self) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl EventEmitter for EventCollector {
    fn emit(&mut self, event: Event) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
