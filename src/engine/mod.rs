// 8.0: vault engine. coordinates price reads, mint/redeem, liquidation mode and the
// reserve adapter. deterministic: time and block height only move when the host says so.

mod adapter;
mod atomic;
mod conversions;
mod core;
mod governance;
mod handle;
mod liquidations;
mod pricing;
mod results;

pub use core::{Collaborators, Vault};
pub use handle::VaultHandle;
pub use results::{LiquidationRedemption, MintResult, RedeemResult, VaultError};
