//! Collateral ledger.
//!
//! The authoritative record of reserve held directly, reserve deployed to the yield
//! venue, and synthetic supply outstanding. Engines mutate it through the checked
//! helpers below; nothing else writes it. Fee and threshold settings live beside the
//! balances so a ledger snapshot restores the whole solvency picture on rollback.

use crate::collateral::CollateralThresholds;
use crate::math::MathError;
use crate::types::{Bps, Reserve, Synth};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub mint_fee_bps: Bps,
    pub redeem_fee_bps: Bps,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            mint_fee_bps: Bps::new(10),   // 0.1%
            redeem_fee_bps: Bps::new(10), // 0.1%
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralLedger {
    pub reserve_held_direct: Reserve,
    pub reserve_deployed_to_yield: Reserve,
    pub synthetic_supply: Synth,
    /// Fee income. part of `reserve_held_direct` until withdrawn.
    pub accrued_fees: Reserve,
    pub fees: FeeSchedule,
    pub thresholds: CollateralThresholds,
}

impl CollateralLedger {
    pub fn new(fees: FeeSchedule, thresholds: CollateralThresholds) -> Self {
        Self {
            reserve_held_direct: Reserve::zero(),
            reserve_deployed_to_yield: Reserve::zero(),
            synthetic_supply: Synth::zero(),
            accrued_fees: Reserve::zero(),
            fees,
            thresholds,
        }
    }

    /// held + deployed. what synthetic holders can ultimately be paid from.
    pub fn total_reserve(&self) -> Result<Reserve, MathError> {
        self.reserve_held_direct.checked_add(self.reserve_deployed_to_yield)
    }

    pub fn credit_held(&mut self, amount: Reserve) -> Result<(), MathError> {
        self.reserve_held_direct = self.reserve_held_direct.checked_add(amount)?;
        Ok(())
    }

    pub fn debit_held(&mut self, amount: Reserve) -> Result<(), MathError> {
        self.reserve_held_direct = self.reserve_held_direct.checked_sub(amount)?;
        Ok(())
    }

    pub fn move_to_yield(&mut self, amount: Reserve) -> Result<(), MathError> {
        let held = self.reserve_held_direct.checked_sub(amount)?;
        let deployed = self.reserve_deployed_to_yield.checked_add(amount)?;
        self.reserve_held_direct = held;
        self.reserve_deployed_to_yield = deployed;
        Ok(())
    }

    /// Books reserve that came back from the venue. `released` leaves the deployed figure,
    /// `received` is what actually landed and is credited to held.
    pub fn return_from_yield(&mut self, released: Reserve, received: Reserve) -> Result<(), MathError> {
        self.reserve_deployed_to_yield = self.reserve_deployed_to_yield.saturating_sub(released);
        self.credit_held(received)
    }

    pub fn increase_supply(&mut self, amount: Synth) -> Result<(), MathError> {
        self.synthetic_supply = self.synthetic_supply.checked_add(amount)?;
        Ok(())
    }

    pub fn decrease_supply(&mut self, amount: Synth) -> Result<(), MathError> {
        self.synthetic_supply = self.synthetic_supply.checked_sub(amount)?;
        Ok(())
    }

    pub fn accrue_fee(&mut self, amount: Reserve) -> Result<(), MathError> {
        self.accrued_fees = self.accrued_fees.checked_add(amount)?;
        Ok(())
    }

    /// Carves fee income out of held reserve.
    pub fn release_fees(&mut self, amount: Reserve) -> Result<(), MathError> {
        let accrued = self.accrued_fees.checked_sub(amount)?;
        let held = self.reserve_held_direct.checked_sub(amount)?;
        self.accrued_fees = accrued;
        self.reserve_held_direct = held;
        Ok(())
    }

    /// Pro-rata payouts spend fee income like any other reserve. keeps the fee figure
    /// from claiming more than the vault still has.
    pub fn cap_fees_to_reserve(&mut self) -> Result<(), MathError> {
        let total = self.total_reserve()?;
        if self.accrued_fees > total {
            self.accrued_fees = total;
        }
        Ok(())
    }

    /// Fee income that can leave right now without touching deployed reserve.
    pub fn withdrawable_fees(&self) -> Reserve {
        self.accrued_fees.min(self.reserve_held_direct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> CollateralLedger {
        CollateralLedger::new(FeeSchedule::default(), CollateralThresholds::default())
    }

    #[test]
    fn yield_round_trip_keeps_total() {
        let mut ledger = ledger();
        ledger.credit_held(Reserve::from_units(1_000)).unwrap();
        ledger.move_to_yield(Reserve::from_units(400)).unwrap();

        assert_eq!(ledger.reserve_held_direct, Reserve::from_units(600));
        assert_eq!(ledger.reserve_deployed_to_yield, Reserve::from_units(400));
        assert_eq!(ledger.total_reserve().unwrap(), Reserve::from_units(1_000));

        ledger
            .return_from_yield(Reserve::from_units(400), Reserve::from_units(400))
            .unwrap();
        assert_eq!(ledger.reserve_deployed_to_yield, Reserve::zero());
        assert_eq!(ledger.reserve_held_direct, Reserve::from_units(1_000));
    }

    #[test]
    fn cannot_overdraw_held() {
        let mut ledger = ledger();
        ledger.credit_held(Reserve::new(5)).unwrap();
        assert_eq!(ledger.move_to_yield(Reserve::new(6)), Err(MathError::Underflow));
        assert_eq!(ledger.reserve_held_direct, Reserve::new(5));
    }

    #[test]
    fn supply_accounting() {
        let mut ledger = ledger();
        ledger.increase_supply(Synth::from_units(10)).unwrap();
        ledger.decrease_supply(Synth::from_units(4)).unwrap();
        assert_eq!(ledger.synthetic_supply, Synth::from_units(6));
        assert!(ledger.decrease_supply(Synth::from_units(7)).is_err());
    }

    #[test]
    fn fees_never_exceed_reserve() {
        let mut ledger = ledger();
        ledger.credit_held(Reserve::new(100)).unwrap();
        ledger.accrue_fee(Reserve::new(30)).unwrap();

        ledger.debit_held(Reserve::new(90)).unwrap();
        assert_eq!(ledger.withdrawable_fees(), Reserve::new(10));

        ledger.cap_fees_to_reserve().unwrap();
        assert_eq!(ledger.accrued_fees, Reserve::new(10));

        ledger.release_fees(Reserve::new(10)).unwrap();
        assert!(ledger.reserve_held_direct.is_zero());
        assert!(ledger.accrued_fees.is_zero());
    }
}
