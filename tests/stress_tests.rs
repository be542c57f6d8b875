//! Stress tests
//!
//! These tests push the vault through hostile collaborators and crowded exits to verify
//! it stays solvent, rejects reentry, and never keeps half of an operation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cell::RefCell;
use std::rc::Rc;
use vault_core::*;

const ALICE: AccountId = AccountId(10);
const MALLORY: AccountId = AccountId(66);

fn setup(config: VaultConfig, price: Decimal) -> (MockDeployment, Vault) {
    let deployment = MockDeployment::new(config, price);
    let vault = deployment.vault().unwrap();
    (deployment, vault)
}

/// A synthetic token that calls back into the vault from inside mint_to.
mod reentrancy_tests {
    use super::*;

    #[derive(Clone)]
    struct ReentrantToken {
        inner: MockSyntheticToken,
        handle: Rc<RefCell<Option<VaultHandle>>>,
        seen: Rc<RefCell<Vec<VaultError>>>,
        propagate: bool,
    }

    impl SyntheticToken for ReentrantToken {
        fn mint_to(&mut self, recipient: AccountId, amount: Synth) -> Result<(), CollaboratorError> {
            let slot = self.handle.borrow().clone();
            if let Some(handle) = slot {
                if let Err(e) = handle.redeem(recipient, Synth::new(1), Reserve::zero()) {
                    self.seen.borrow_mut().push(e);
                    if self.propagate {
                        return Err(CollaboratorError::Rejected("reentrant token".to_string()));
                    }
                }
                if handle.inspect().is_err() {
                    self.seen.borrow_mut().push(VaultError::ReentrantCall);
                }
            }
            self.inner.mint_to(recipient, amount)
        }

        fn burn_from(&mut self, holder: AccountId, amount: Synth) -> Result<(), CollaboratorError> {
            self.inner.burn_from(holder, amount)
        }
    }

    fn reentrant_vault(propagate: bool) -> (MockDeployment, VaultHandle, ReentrantToken) {
        let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.0));
        let token = ReentrantToken {
            inner: deployment.synthetic.clone(),
            handle: Rc::new(RefCell::new(None)),
            seen: Rc::new(RefCell::new(Vec::new())),
            propagate,
        };

        let mut collaborators = deployment.collaborators();
        collaborators.synthetic = Box::new(token.clone());
        let mut vault = Vault::new(deployment.config.clone(), collaborators).unwrap();
        vault.refresh_price(deployment.governance()).unwrap();

        let handle = VaultHandle::new(vault);
        *token.handle.borrow_mut() = Some(handle.clone());
        (deployment, handle, token)
    }

    #[test]
    fn callback_during_mint_is_rejected() {
        let (deployment, handle, token) = reentrant_vault(false);
        deployment.fund(MALLORY, 1_000);

        let minted = handle
            .mint(MALLORY, Reserve::from_units(1_000), Synth::zero())
            .unwrap();

        let seen = token.seen.borrow();
        assert_eq!(seen.as_slice(), &[VaultError::ReentrantCall, VaultError::ReentrantCall]);
        assert_eq!(deployment.synthetic.balance_of(MALLORY), minted.synthetic_out);

        let vault = handle.inspect().unwrap();
        assert_eq!(vault.ledger().synthetic_supply, minted.synthetic_out);
    }

    #[test]
    fn failing_callback_rolls_back_the_mint() {
        let (deployment, handle, token) = reentrant_vault(true);
        deployment.fund(MALLORY, 1_000);

        let err = handle
            .mint(MALLORY, Reserve::from_units(1_000), Synth::zero())
            .unwrap_err();
        assert!(matches!(err, VaultError::Collaborator(CollaboratorError::Rejected(_))));
        assert_eq!(token.seen.borrow().as_slice(), &[VaultError::ReentrantCall]);

        // reserve went back to the caller and the books are empty again
        assert_eq!(deployment.reserve.balance_of(MALLORY), Reserve::from_units(1_000));
        let vault = handle.inspect().unwrap();
        assert!(vault.ledger().reserve_held_direct.is_zero());
        assert!(vault.ledger().synthetic_supply.is_zero());
        match vault.last_event().map(|e| &e.payload) {
            Some(EventPayload::OperationRolledBack(rollback)) => {
                assert_eq!(rollback.operation, "mint");
                assert_eq!(rollback.compensations, 1);
                assert!(rollback.is_clean());
            }
            other => panic!("expected rollback event, got {:?}", other),
        }
    }

    #[test]
    fn handle_is_usable_after_the_operation() {
        let (deployment, handle, _token) = reentrant_vault(false);
        deployment.fund(MALLORY, 10);
        handle
            .mint(MALLORY, Reserve::from_units(10), Synth::zero())
            .unwrap();
        assert!(handle.liquidation_status().is_ok());
    }
}

/// Collaborators that refuse or short-change the vault.
mod rollback_tests {
    use super::*;

    #[test]
    fn rejected_mint_refunds_reserve() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.08));
        deployment.fund(ALICE, 500);
        deployment.synthetic.set_reject_mints(true);

        let err = vault
            .mint(ALICE, Reserve::from_units(500), Synth::zero())
            .unwrap_err();
        assert!(matches!(err, VaultError::Collaborator(_)));
        assert_eq!(deployment.reserve.balance_of(ALICE), Reserve::from_units(500));
        assert!(deployment.reserve.balance_of(VAULT_ACCOUNT).is_zero());
        assert!(vault.ledger().reserve_held_direct.is_zero());
        assert!(vault.ledger().accrued_fees.is_zero());
    }

    #[test]
    fn fee_on_transfer_reserve_is_refused() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        deployment.fund(ALICE, 500);
        deployment.reserve.set_inbound_haircut(Reserve::new(10));

        let err = vault
            .mint(ALICE, Reserve::from_units(500), Synth::zero())
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::ReserveTransferMismatch {
                expected: Reserve::from_units(500),
                observed: Reserve::new(499_999_990),
            }
        );
        assert!(deployment.synthetic.total_supply().is_zero());
        assert!(vault.ledger().synthetic_supply.is_zero());
        // the refund goes out in full, so only the haircut is lost to the token
        assert_eq!(deployment.reserve.balance_of(ALICE), Reserve::new(499_999_990));
    }

    #[test]
    fn frozen_payout_remints_burned_synthetic() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        deployment.fund(ALICE, 1_000);
        let minted = vault
            .mint(ALICE, Reserve::from_units(1_000), Synth::zero())
            .unwrap();
        let before = vault.ledger().clone();

        deployment.reserve.set_frozen(true);
        let err = vault
            .redeem(ALICE, minted.synthetic_out, Reserve::zero())
            .unwrap_err();
        assert!(matches!(err, VaultError::Collaborator(CollaboratorError::Rejected(_))));
        assert_eq!(vault.ledger(), &before);
        assert_eq!(deployment.synthetic.balance_of(ALICE), minted.synthetic_out);

        deployment.reserve.set_frozen(false);
        assert!(vault.redeem(ALICE, minted.synthetic_out, Reserve::zero()).is_ok());
    }

    #[test]
    fn illiquid_venue_blocks_redeem() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        let venue = deployment.yield_account();
        deployment.fund(ALICE, 1_000);
        let minted = vault
            .mint(ALICE, Reserve::from_units(1_000), Synth::zero())
            .unwrap();
        vault.deploy_to_yield(venue, Reserve::from_units(900)).unwrap();

        deployment
            .yield_venue
            .set_liquidity_cap(Some(Reserve::from_units(100)));
        assert_eq!(vault.available_from_yield_venue(), Reserve::from_units(100));

        let err = vault
            .redeem(ALICE, minted.synthetic_out, Reserve::zero())
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::InsufficientLiquidity {
                requested: Reserve::new(998_001_000),
                available: Reserve::from_units(200),
            }
        );
    }

    #[test]
    fn oracle_outage_is_retryable() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        deployment.fund(ALICE, 100);
        deployment.price.set_valid(false);
        vault.advance_block();

        let err = vault
            .mint(ALICE, Reserve::from_units(100), Synth::zero())
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!vault.can_mint());

        deployment.price.set_valid(true);
        vault.advance_block();
        assert!(vault.mint(ALICE, Reserve::from_units(100), Synth::zero()).is_ok());
    }
}

/// Many holders leaving an undercollateralized vault.
mod liquidation_exodus_tests {
    use super::*;

    #[test]
    fn everyone_exits_and_collateral_is_exhausted() {
        let mut config = VaultConfig::default();
        config.fees.mint_fee_bps = Bps::new(30);
        let (deployment, mut vault) = setup(config, dec!(1.0));
        let venue = deployment.yield_account();
        deployment.margin_pool.set_margin(Reserve::from_units(1_000_000));

        let holders: Vec<AccountId> = (100..120).map(AccountId).collect();
        let mut minted = Vec::new();
        for (i, holder) in holders.iter().enumerate() {
            let amount = 1_000 + 137 * i as u128;
            deployment.fund(*holder, amount);
            let result = vault
                .mint(*holder, Reserve::from_units(amount), Synth::zero())
                .unwrap();
            minted.push(result.synthetic_out);
        }

        let total_reserve = vault.ledger().total_reserve().unwrap();
        vault
            .deploy_to_yield(venue, Reserve::new(total_reserve.value() / 2))
            .unwrap();

        deployment.margin_pool.set_margin(Reserve::zero());
        for price in [dec!(1.03), dec!(1.06)] {
            vault.advance_block();
            deployment.price.set_price(price);
            assert!(vault.validated_price().is_valid());
        }
        assert!(vault.should_trigger_liquidation().unwrap());

        let mut paid = 0u128;
        for (holder, amount) in holders.iter().zip(&minted) {
            let exit = vault
                .redeem_in_liquidation_mode(*holder, *amount, Reserve::zero())
                .unwrap();
            assert!(!exit.is_premium);
            paid += exit.reserve_out.value();
        }

        assert_eq!(paid, total_reserve.value());
        assert!(vault.ledger().synthetic_supply.is_zero());
        assert!(vault.ledger().total_reserve().unwrap().is_zero());
        assert!(vault.ledger().accrued_fees.is_zero());
        assert!(deployment.synthetic.total_supply().is_zero());
    }

    #[test]
    fn over_supply_payout_is_invalid() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        deployment.fund(ALICE, 100);
        let minted = vault
            .mint(ALICE, Reserve::from_units(100), Synth::zero())
            .unwrap();

        assert_eq!(
            vault.calculate_liquidation_payout(Synth::zero()),
            Err(VaultError::InvalidAmount)
        );
        assert_eq!(
            vault.calculate_liquidation_payout(Synth::new(minted.synthetic_out.value() + 1)),
            Err(VaultError::InvalidAmount)
        );
        let payout = vault.calculate_liquidation_payout(minted.synthetic_out).unwrap();
        assert_eq!(payout.reserve_out, Reserve::from_units(100));
        assert!(payout.is_premium);
    }
}

/// Capability checks on every privileged entry point.
mod authorization_tests {
    use super::*;

    #[test]
    fn adapter_calls_need_their_capability() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        let amount = Reserve::from_units(1);

        let cases = [
            (vault.credit_margin(MALLORY, amount), Capability::MarginPool),
            (vault.debit_margin(MALLORY, MALLORY, amount), Capability::MarginPool),
            (vault.deploy_to_yield(MALLORY, amount), Capability::YieldVenue),
            (vault.withdraw_from_yield(MALLORY, amount).map(|_| ()), Capability::YieldVenue),
            (vault.harvest_yield(MALLORY).map(|_| ()), Capability::YieldVenue),
        ];
        for (result, required) in cases {
            assert_eq!(result, Err(VaultError::Unauthorized { caller: MALLORY, required }));
        }

        // holding one capability does not grant another
        assert_eq!(
            vault.deploy_to_yield(deployment.margin_account(), amount),
            Err(VaultError::Unauthorized {
                caller: deployment.margin_account(),
                required: Capability::YieldVenue,
            })
        );
    }

    #[test]
    fn governance_calls_need_governance() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        let unauthorized = |caller| VaultError::Unauthorized {
            caller,
            required: Capability::Governance,
        };

        assert_eq!(vault.pause(MALLORY), Err(unauthorized(MALLORY)));
        assert_eq!(vault.update_parameters(MALLORY, 0, 0), Err(unauthorized(MALLORY)));
        assert_eq!(
            vault.update_collateralization_thresholds(MALLORY, 12_000, 10_500),
            Err(unauthorized(MALLORY))
        );
        assert_eq!(vault.update_oracle_parameters(MALLORY, 100, 1), Err(unauthorized(MALLORY)));
        assert_eq!(vault.refresh_price(MALLORY), Err(unauthorized(MALLORY)));
        assert_eq!(
            vault.withdraw_accumulated_fees(deployment.yield_account(), MALLORY),
            Err(unauthorized(deployment.yield_account()))
        );
        assert!(!vault.is_paused());
    }

    #[test]
    fn handle_checks_capabilities_too() {
        let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.0));
        let handle = deployment.handle().unwrap();
        let margin = deployment.margin_account();
        deployment.fund(margin, 20);

        assert!(matches!(
            handle.credit_margin(MALLORY, Reserve::from_units(20)),
            Err(VaultError::Unauthorized { .. })
        ));
        handle.credit_margin(margin, Reserve::from_units(20)).unwrap();
        handle
            .debit_margin(margin, MALLORY, Reserve::from_units(5))
            .unwrap();
        assert_eq!(
            handle.inspect().unwrap().ledger().reserve_held_direct,
            Reserve::from_units(15)
        );
    }

    #[test]
    fn debit_margin_bounded_by_held() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        let margin = deployment.margin_account();
        deployment.fund(margin, 50);
        vault.credit_margin(margin, Reserve::from_units(50)).unwrap();

        assert_eq!(
            vault.debit_margin(margin, MALLORY, Reserve::from_units(51)),
            Err(VaultError::InsufficientReserve {
                requested: Reserve::from_units(51),
                available: Reserve::from_units(50),
            })
        );
        vault.debit_margin(margin, MALLORY, Reserve::from_units(50)).unwrap();
        assert_eq!(deployment.reserve.balance_of(MALLORY), Reserve::from_units(50));
    }
}

/// Governance parameter changes and config loading.
mod governance_tests {
    use super::*;

    #[test]
    fn parameter_bounds_are_enforced() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        let governance = deployment.governance();

        assert!(matches!(
            vault.update_parameters(governance, 1_001, 10),
            Err(VaultError::InvalidParameter { name: "mint_fee_bps", value: 1_001, .. })
        ));
        assert!(matches!(
            vault.update_collateralization_thresholds(governance, 10_000, 10_100),
            Err(VaultError::InvalidParameter { name: "min_collateral_ratio_bps", .. })
        ));
        assert!(matches!(
            vault.update_oracle_parameters(governance, 0, 1),
            Err(VaultError::InvalidParameter { name: "max_deviation_bps", .. })
        ));

        vault.update_parameters(governance, 25, 5).unwrap();
        vault
            .update_collateralization_thresholds(governance, 12_500, 10_500)
            .unwrap();
        vault.update_oracle_parameters(governance, 200, 3).unwrap();

        assert_eq!(vault.ledger().fees.mint_fee_bps, Bps::new(25));
        assert_eq!(vault.ledger().thresholds.critical_collateral_ratio_bps, 10_500);
        assert_eq!(vault.price_cache().params.max_deviation_bps, 200);
        assert!(vault.config().validate().is_ok());
    }

    #[test]
    fn vault_loads_from_json() {
        let json = Environment::Mainnet.config().to_json().unwrap();
        let config = VaultConfig::from_json(&json).unwrap();
        let deployment = MockDeployment::new(config, dec!(1.08));
        let vault = deployment.vault().unwrap();
        assert_eq!(vault.ledger().thresholds.min_collateral_ratio_bps, 12_000);
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = VaultConfig::default();
        config.thresholds.critical_collateral_ratio_bps = 12_000;
        let deployment = MockDeployment::new(config, dec!(1.0));
        assert!(matches!(
            deployment.vault(),
            Err(VaultError::InvalidParameter { name: "min_collateral_ratio_bps", .. })
        ));
    }

    #[test]
    fn event_log_is_bounded() {
        let mut config = VaultConfig::default();
        config.max_events = 8;
        let (deployment, mut vault) = setup(config, dec!(1.0));
        for _ in 0..20 {
            vault.pause(deployment.governance()).unwrap();
            vault.unpause(deployment.governance()).unwrap();
        }
        assert_eq!(vault.events().count(), 8);
        assert!(matches!(
            vault.last_event().map(|e| &e.payload),
            Some(EventPayload::Unpaused { .. })
        ));
    }
}

/// Interest from the yield venue and what governance can take out of it.
mod yield_tests {
    use super::*;

    #[test]
    fn harvest_books_interest_as_fees() {
        let (deployment, mut vault) = setup(VaultConfig::default(), dec!(1.0));
        let venue = deployment.yield_account();
        deployment.margin_pool.set_margin(Reserve::from_units(200));
        deployment.fund(ALICE, 1_000);
        vault.mint(ALICE, Reserve::from_units(1_000), Synth::zero()).unwrap();
        vault.deploy_to_yield(venue, Reserve::from_units(500)).unwrap();

        deployment.yield_venue.accrue_interest(Reserve::from_units(7));
        assert_eq!(vault.harvest_yield(venue).unwrap(), Reserve::from_units(7));
        assert_eq!(vault.ledger().accrued_fees, Reserve::from_units(8));
        assert_eq!(vault.ledger().reserve_held_direct, Reserve::from_units(507));
        assert_eq!(vault.ledger().reserve_deployed_to_yield, Reserve::from_units(500));

        // nothing above principal left
        assert!(vault.harvest_yield(venue).unwrap().is_zero());

        let withdrawn = vault
            .withdraw_accumulated_fees(deployment.governance(), MALLORY)
            .unwrap();
        assert_eq!(withdrawn, Reserve::from_units(8));
        assert_eq!(deployment.reserve.balance_of(MALLORY), Reserve::from_units(8));
        assert!(vault.ledger().accrued_fees.is_zero());
        assert_eq!(vault.ledger().total_reserve().unwrap(), Reserve::from_units(999));
    }
}
