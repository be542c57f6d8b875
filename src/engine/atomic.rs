// 8.2 engine/atomic.rs: all-or-nothing execution.
//
// an operation runs validate -> update ledger -> invoke collaborator -> verify -> finalize.
// if any step fails, the ledger goes back to its snapshot and every collaborator side effect
// already performed is undone in reverse order. the price cache is not part of the
// snapshot: a read that passed the guard stays accepted.

use super::core::Vault;
use super::results::VaultError;
use crate::events::{EventPayload, RollbackEvent};
use crate::types::{AccountId, Reserve, Synth};
use tracing::{error, warn};

/// Inverse of one collaborator call that already happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Compensation {
    /// reserve was pulled from `to`
    RefundReserve { to: AccountId, amount: Reserve },
    /// synthetic was minted to `holder`
    BurnSynthetic { holder: AccountId, amount: Synth },
    /// synthetic was burned from `holder`
    RemintSynthetic { holder: AccountId, amount: Synth },
    /// reserve came back from the yield venue
    Redeploy { amount: Reserve },
    /// reserve went out to the yield venue
    Recall { amount: Reserve },
}

#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<Compensation>,
}

impl Journal {
    pub(crate) fn record(&mut self, compensation: Compensation) {
        self.entries.push(compensation);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Vault {
    pub(super) fn atomically<T>(
        &mut self,
        operation: &'static str,
        body: impl FnOnce(&mut Vault, &mut Journal) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        if self.in_flight {
            return Err(VaultError::ReentrantCall);
        }
        self.in_flight = true;

        let snapshot = self.ledger.clone();
        let mut journal = Journal::default();
        let result = body(self, &mut journal);

        if let Err(err) = &result {
            self.ledger = snapshot;
            let compensations = journal.len();
            let failed = self.unwind(journal);
            warn!(operation, error = %err, compensations, failed, "operation rolled back");
            self.emit_event(EventPayload::OperationRolledBack(RollbackEvent {
                operation: operation.to_string(),
                error: err.to_string(),
                compensations,
                failed_compensations: failed,
            }));
        }

        self.in_flight = false;
        result
    }

    // returns how many compensation steps failed
    fn unwind(&mut self, journal: Journal) -> usize {
        let mut failed = 0;
        for step in journal.entries.into_iter().rev() {
            let outcome = match step {
                Compensation::RefundReserve { to, amount } => self.collaborators.reserve.push_to(to, amount),
                Compensation::BurnSynthetic { holder, amount } => {
                    self.collaborators.synthetic.burn_from(holder, amount)
                }
                Compensation::RemintSynthetic { holder, amount } => {
                    self.collaborators.synthetic.mint_to(holder, amount)
                }
                Compensation::Redeploy { amount } => self.collaborators.yield_venue.deploy(amount),
                Compensation::Recall { amount } => self.collaborators.yield_venue.withdraw(amount).map(|_| ()),
            };
            if let Err(e) = outcome {
                failed += 1;
                error!(?step, error = %e, "compensation failed");
            }
        }
        failed
    }
}
