// 2.x price_feed.rs: price source abstraction plus the cache and deviation guard that gates
// every price-dependent operation. the vault never reads the source directly.
//
// the guard fails closed. an invalid feed, a non-positive print, or a jump larger than
// max_deviation_bps against the last accepted price all come back as a rejection and leave
// the cache untouched. the only way to write the cache without a deviation check is the
// privileged refresh, which still requires the feed to report valid.

use crate::types::{BlockNumber, Price, Timestamp, BPS_DENOMINATOR};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Raw reading from an oracle: the price and the feed's own validity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    pub price: Decimal,
    pub is_valid: bool,
}

/// Implement this to plug in an oracle network. Staleness policy belongs to the source and
/// surfaces through `is_valid`.
pub trait PriceSource {
    fn name(&self) -> &str;

    fn get_price(&self) -> PriceReading;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParams {
    /// Largest accepted move against the cached price, in bps.
    pub max_deviation_bps: u32,
    /// Blocks that must elapse before the source is queried again.
    pub min_blocks_between_updates: u64,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            max_deviation_bps: 500,
            min_blocks_between_updates: 1,
        }
    }
}

/// Why a price was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRejection {
    FeedInvalid,
    NonPositive { raw: Decimal },
    /// Nothing cached yet to compare against. needs a privileged refresh.
    NoReference,
    ExcessiveDeviation {
        previous: Price,
        raw: Price,
        deviation_bps: Decimal,
        max_bps: u32,
    },
}

impl fmt::Display for PriceRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRejection::FeedInvalid => write!(f, "feed reports invalid"),
            PriceRejection::NonPositive { raw } => write!(f, "non-positive price {}", raw),
            PriceRejection::NoReference => write!(f, "no cached reference price"),
            PriceRejection::ExcessiveDeviation { previous, raw, deviation_bps, max_bps } => write!(
                f,
                "price moved {} -> {} ({} bps, max {} bps)",
                previous, raw, deviation_bps, max_bps
            ),
        }
    }
}

/// Result of one guarded read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOutcome {
    /// Served from cache, source not queried (rate limit window).
    Cached(Price),
    /// Fresh read that passed the deviation check and now sits in the cache.
    Accepted(Price),
    Rejected(PriceRejection),
}

impl PriceOutcome {
    pub fn price(&self) -> Option<Price> {
        match self {
            PriceOutcome::Cached(p) | PriceOutcome::Accepted(p) => Some(*p),
            PriceOutcome::Rejected(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.price().is_some()
    }

    pub fn into_result(self) -> Result<Price, PriceRejection> {
        match self {
            PriceOutcome::Cached(p) | PriceOutcome::Accepted(p) => Ok(p),
            PriceOutcome::Rejected(reason) => Err(reason),
        }
    }
}

/// `|raw - previous| * 10000 / previous`, or None when the move is too large for a Decimal.
pub fn deviation_bps(previous: Price, raw: Price) -> Option<Decimal> {
    raw.value()
        .checked_sub(previous.value())?
        .abs()
        .checked_mul(Decimal::from(BPS_DENOMINATOR))?
        .checked_div(previous.value())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCache {
    pub last_valid_price: Option<Price>,
    pub last_update_block: BlockNumber,
    pub last_update_time: Timestamp,
    pub params: OracleParams,
}

impl PriceCache {
    pub fn new(params: OracleParams) -> Self {
        Self {
            last_valid_price: None,
            last_update_block: BlockNumber(0),
            last_update_time: Timestamp::from_millis(0),
            params,
        }
    }

    /// Guarded read. may serve the cache, accept a fresh read, or reject.
    pub fn validated_price(
        &mut self,
        source: &dyn PriceSource,
        block: BlockNumber,
        now: Timestamp,
    ) -> PriceOutcome {
        if let Some(cached) = self.last_valid_price {
            if block.since(self.last_update_block) < self.params.min_blocks_between_updates {
                return PriceOutcome::Cached(cached);
            }
        }

        let raw = match Self::read_source(source) {
            Ok(raw) => raw,
            Err(reason) => return PriceOutcome::Rejected(reason),
        };

        let Some(previous) = self.last_valid_price else {
            return PriceOutcome::Rejected(PriceRejection::NoReference);
        };

        // an unrepresentable move is as far outside the band as it gets
        let deviation = deviation_bps(previous, raw).unwrap_or(Decimal::MAX);
        if deviation > Decimal::from(self.params.max_deviation_bps) {
            return PriceOutcome::Rejected(PriceRejection::ExcessiveDeviation {
                previous,
                raw,
                deviation_bps: deviation,
                max_bps: self.params.max_deviation_bps,
            });
        }

        self.store(raw, block, now);
        PriceOutcome::Accepted(raw)
    }

    /// Privileged path: skips the deviation check but still requires a valid positive read.
    pub fn refresh(
        &mut self,
        source: &dyn PriceSource,
        block: BlockNumber,
        now: Timestamp,
    ) -> Result<Price, PriceRejection> {
        let raw = Self::read_source(source)?;
        self.store(raw, block, now);
        Ok(raw)
    }

    fn read_source(source: &dyn PriceSource) -> Result<Price, PriceRejection> {
        let reading = source.get_price();
        if !reading.is_valid {
            return Err(PriceRejection::FeedInvalid);
        }
        Price::new(reading.price).ok_or(PriceRejection::NonPositive { raw: reading.price })
    }

    fn store(&mut self, price: Price, block: BlockNumber, now: Timestamp) {
        self.last_valid_price = Some(price);
        self.last_update_block = block;
        self.last_update_time = now;
    }
}

/// Mock source for tests and the simulator. clones share state so a test can keep a handle
/// after moving one into the vault.
#[derive(Debug, Clone)]
pub struct MockPriceSource {
    name: String,
    price: Rc<Cell<Decimal>>,
    valid: Rc<Cell<bool>>,
    reads: Rc<Cell<u64>>,
}

impl MockPriceSource {
    pub fn new(name: &str, price: Decimal) -> Self {
        Self {
            name: name.to_string(),
            price: Rc::new(Cell::new(price)),
            valid: Rc::new(Cell::new(true)),
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn set_price(&self, price: Decimal) {
        self.price.set(price);
    }

    pub fn set_valid(&self, valid: bool) {
        self.valid.set(valid);
    }

    /// How many times the vault actually queried this source.
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_price(&self) -> PriceReading {
        self.reads.set(self.reads.get() + 1);
        PriceReading {
            price: self.price.get(),
            is_valid: self.valid.get(),
        }
    }
}
