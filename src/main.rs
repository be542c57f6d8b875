//! Euro-pegged vault simulation.
//!
//! Walks the vault through its lifecycle against in-memory collaborators: minting and
//! redeeming at the peg, the oracle deviation guard, yield deployment, a slide into
//! liquidation mode, and a yield venue that under-delivers.
//!
//! Set `RUST_LOG=vault_core=debug` to see every event as it is emitted.

use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;
use vault_core::*;

const ALICE: AccountId = AccountId(10);
const BOB: AccountId = AccountId(11);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Euro-Pegged Synthetic Vault Simulation\n");

    let scenarios: [(&str, fn() -> Result<(), VaultError>); 5] = [
        ("mint and redeem", scenario_1_mint_and_redeem),
        ("oracle deviation guard", scenario_2_deviation_guard),
        ("yield deployment", scenario_3_yield),
        ("liquidation mode", scenario_4_liquidation_mode),
        ("yield short delivery", scenario_5_short_delivery),
    ];

    for (name, scenario) in scenarios {
        if let Err(e) = scenario() {
            eprintln!("scenario '{}' failed: {}", name, e);
            std::process::exit(1);
        }
    }

    println!("\nAll simulations completed successfully.");
}

/// Vault on the wall clock, so event timestamps in debug output read as real times.
fn open_vault(deployment: &MockDeployment) -> Result<Vault, VaultError> {
    let mut vault = deployment.vault()?;
    vault.set_time(Timestamp::now());
    Ok(vault)
}

fn units(amount: Reserve) -> String {
    format!("{}.{:06}", amount.value() / RESERVE_UNIT, amount.value() % RESERVE_UNIT)
}

fn synth_units(amount: Synth) -> String {
    format!("{}.{:02}", amount.value() / SYNTH_UNIT, (amount.value() % SYNTH_UNIT) / 10u128.pow(16))
}

fn print_ratio(vault: &mut Vault) -> Result<(), VaultError> {
    let ratio = vault.collateralization_ratio_bps()?;
    if ratio == FULLY_COLLATERALIZED {
        println!("  Ratio: no debt outstanding");
    } else {
        println!("  Ratio: {}.{:02}%", ratio / 100, ratio % 100);
    }
    Ok(())
}

/// Mint at 1.08, redeem half, show fee income.
fn scenario_1_mint_and_redeem() -> Result<(), VaultError> {
    println!("Scenario 1: Mint and Redeem at the Peg\n");

    let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.08));
    deployment.fund(ALICE, 10_800);
    deployment.margin_pool.set_margin(Reserve::from_units(2_000));
    let mut vault = open_vault(&deployment)?;

    let minted = vault.mint(ALICE, Reserve::from_units(10_800), Synth::zero())?;
    println!("  Alice deposits 10,800 USD at 1.08 EUR/USD");
    println!("  Minted {} EUR, fee {} USD", synth_units(minted.synthetic_out), units(minted.fee));
    print_ratio(&mut vault)?;

    let quote = vault.calculate_redeem_amount(Synth::from_units(5_000))?;
    let redeemed = vault.redeem(ALICE, Synth::from_units(5_000), quote.reserve_out)?;
    println!("  Alice redeems 5,000 EUR -> {} USD (fee {})", units(redeemed.reserve_out), units(redeemed.fee));
    println!("  Accrued fees: {} USD\n", units(vault.ledger().accrued_fees));
    Ok(())
}

/// 100 -> 106 is refused at 500 bps, 100 -> 104 goes through.
fn scenario_2_deviation_guard() -> Result<(), VaultError> {
    println!("Scenario 2: Oracle Deviation Guard\n");

    let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.00));
    let mut vault = open_vault(&deployment)?;

    vault.advance_block();
    deployment.price.set_price(dec!(1.06));
    match vault.validated_price() {
        PriceOutcome::Rejected(reason) => println!("  1.00 -> 1.06 rejected: {}", reason),
        other => println!("  1.00 -> 1.06 unexpectedly {:?}", other),
    }

    vault.advance_block();
    deployment.price.set_price(dec!(1.04));
    if let Some(price) = vault.validated_price().price() {
        println!("  1.00 -> 1.04 accepted at {}", price);
    }

    deployment.price.set_valid(false);
    vault.advance_block();
    match vault.calculate_mint_amount(Reserve::from_units(100)) {
        Err(e) => println!("  Feed goes invalid, quote fails closed: {} (retryable: {})\n", e, e.is_retryable()),
        Ok(quote) => println!("  Feed invalid but quote served: {:?}\n", quote),
    }
    Ok(())
}

/// Idle reserve goes to the venue, interest is harvested, a large redeem pulls it back.
fn scenario_3_yield() -> Result<(), VaultError> {
    println!("Scenario 3: Yield Deployment\n");

    let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.00));
    deployment.fund(ALICE, 50_000);
    deployment.margin_pool.set_margin(Reserve::from_units(10_000));
    let mut vault = open_vault(&deployment)?;
    let venue = deployment.yield_account();

    vault.mint(ALICE, Reserve::from_units(50_000), Synth::zero())?;
    vault.deploy_to_yield(venue, Reserve::from_units(40_000))?;
    println!(
        "  Deployed 40,000 USD. held {}, deployed {}",
        units(vault.ledger().reserve_held_direct),
        units(vault.ledger().reserve_deployed_to_yield)
    );

    deployment.yield_venue.accrue_interest(Reserve::from_units(120));
    let harvested = vault.harvest_yield(venue)?;
    println!("  Harvested {} USD of interest into fees", units(harvested));

    let redeemed = vault.redeem(ALICE, Synth::from_units(30_000), Reserve::zero())?;
    println!(
        "  Alice redeems 30,000 EUR -> {} USD, {} pulled from the venue",
        units(redeemed.reserve_out),
        units(redeemed.pulled_from_yield)
    );

    for event in vault.events() {
        if let Some(capability) = required_capability(&event.payload) {
            println!("  block {}: {} action {:?}", event.block.0, capability, event.payload);
        }
    }
    println!();
    Ok(())
}

/// Margin drains and the euro strengthens until the ratio falls through critical.
fn scenario_4_liquidation_mode() -> Result<(), VaultError> {
    println!("Scenario 4: Liquidation Mode\n");

    let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.00));
    deployment.fund(ALICE, 600_000);
    deployment.fund(BOB, 400_000);
    deployment.margin_pool.set_margin(Reserve::from_units(150_000));
    let mut vault = open_vault(&deployment)?;

    let alice_mint = vault.mint(ALICE, Reserve::from_units(600_000), Synth::zero())?;
    let bob_mint = vault.mint(BOB, Reserve::from_units(400_000), Synth::zero())?;
    print_ratio(&mut vault)?;

    for price in [dec!(1.04), dec!(1.08)] {
        vault.advance_block();
        deployment.price.set_price(price);
        vault.validated_price();
    }
    deployment.margin_pool.set_margin(Reserve::zero());
    println!("  EUR/USD moves to 1.08 and the margin pool drains");

    let status = vault.liquidation_status()?;
    println!(
        "  In liquidation mode: {} (ratio {} bps)",
        status.in_liquidation_mode, status.ratio_bps
    );

    vault.pause(deployment.governance())?;
    println!("  Governance pauses the vault; normal redeem: {:?}", vault.redeem(ALICE, Synth::new(1), Reserve::zero()).err());

    let alice = vault.redeem_in_liquidation_mode(ALICE, alice_mint.synthetic_out, Reserve::zero())?;
    println!(
        "  Alice exits with {} USD (fair value {}, haircut {} bps)",
        units(alice.reserve_out),
        units(alice.fair_value),
        alice.bps
    );
    let bob = vault.redeem_in_liquidation_mode(BOB, bob_mint.synthetic_out, Reserve::zero())?;
    println!("  Bob exits with {} USD", units(bob.reserve_out));
    println!(
        "  Left in vault: {} USD, supply {} EUR\n",
        units(vault.ledger().total_reserve()?),
        synth_units(vault.ledger().synthetic_supply)
    );
    Ok(())
}

/// The venue reports a full withdrawal but delivers one minor unit less.
fn scenario_5_short_delivery() -> Result<(), VaultError> {
    println!("Scenario 5: Yield Venue Short Delivery\n");

    let deployment = MockDeployment::new(VaultConfig::default(), dec!(1.00));
    deployment.fund(ALICE, 1_000);
    let mut vault = open_vault(&deployment)?;
    let venue = deployment.yield_account();

    vault.mint(ALICE, Reserve::from_units(1_000), Synth::zero())?;
    vault.deploy_to_yield(venue, Reserve::from_units(500))?;
    let before = vault.ledger().clone();

    deployment.yield_venue.set_short_delivery(Reserve::new(1));
    match vault.withdraw_from_yield(venue, Reserve::from_units(500)) {
        Err(e) => println!("  Withdrawal refused: {}", e),
        Ok(amount) => println!("  Withdrawal unexpectedly booked {}", units(amount)),
    }
    println!("  Ledger unchanged: {}", vault.ledger() == &before);
    println!(
        "  Venue balance after compensation: {} USD",
        units(deployment.yield_venue.balance())
    );
    Ok(())
}
