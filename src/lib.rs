// vault-core: euro-pegged synthetic vault.
// solvency-first architecture: nothing mints unless the collateral ratio allows it, and
// an undercollateralized vault pays every holder the same pro-rata share.
// all computation is deterministic; collaborators sit behind traits.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Reserve, Synth, Price, Bps, BlockNumber
//   1.9  math.rs: mul_div over a 256-bit intermediate
//   2.x  price_feed.rs: price source, cache, deviation guard
//   3.x  conversion.rs: mint/redeem quotes
//   4.x  capability.rs: roles for privileged entry points
//   5.x  ledger.rs: the collateral ledger
//   5.1  collateral.rs: ratio formula and thresholds
//   6.x  liquidation.rs: pro-rata payout in liquidation mode
//   7.x  config.rs: versioned config, bounds, env presets
//   8.x  engine/: the vault: pricing, conversions, liquidations, adapter, governance
//   9.x  margin.rs: aggregate margin from the margin pool (mocked)
//   9.2  custody.rs: reserve token transfers (mocked)
//   9.3  synthetic.rs: synthetic token mint/burn (mocked)
//   9.4  yield_venue.rs: yield venue (mocked)
//   9.5  deployment.rs: vault wired to the mocks
//   11.x events.rs: state transition events for audit

// core solvency modules
pub mod collateral;
pub mod conversion;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod liquidation;
pub mod math;
pub mod types;

// access and configuration
pub mod capability;
pub mod config;

// integration modules
pub mod custody;
pub mod deployment;
pub mod margin;
pub mod price_feed;
pub mod synthetic;
pub mod yield_venue;

// re exports for convenience
pub use capability::{Capability, RoleAssignments};
pub use collateral::{collateralization_ratio_bps, CollateralThresholds, FULLY_COLLATERALIZED};
pub use config::{ConfigError, Environment, VaultConfig, CONFIG_VERSION};
pub use conversion::{quote_mint, quote_redeem, MintQuote, RedeemQuote};
pub use custody::{CollaboratorError, MockReserveToken, ReserveCustody};
pub use deployment::{MockDeployment, VAULT_ACCOUNT};
pub use engine::*;
pub use events::*;
pub use ledger::{CollateralLedger, FeeSchedule};
pub use liquidation::{LiquidationPayout, LiquidationSnapshot};
pub use margin::{MarginPool, MockMarginPool};
pub use math::{mul_div, MathError};
pub use price_feed::{MockPriceSource, OracleParams, PriceCache, PriceOutcome, PriceReading, PriceRejection, PriceSource};
pub use synthetic::{MockSyntheticToken, SyntheticToken};
pub use types::*;
pub use yield_venue::{MockYieldVenue, YieldVenue};
