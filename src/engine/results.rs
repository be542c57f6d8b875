// 8.0.2: result types and errors for vault operations.

use crate::capability::Capability;
use crate::config::ConfigError;
use crate::custody::CollaboratorError;
use crate::liquidation::PayoutError;
use crate::math::MathError;
use crate::price_feed::PriceRejection;
use crate::types::{AccountId, Price, Reserve, Synth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintResult {
    pub reserve_in: Reserve,
    pub fee: Reserve,
    pub synthetic_out: Synth,
    pub price: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeemResult {
    pub synthetic_in: Synth,
    pub fee: Reserve,
    pub reserve_out: Reserve,
    pub price: Price,
    /// Part of the payout that had to come back from the yield venue first.
    pub pulled_from_yield: Reserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationRedemption {
    pub synthetic_in: Synth,
    pub reserve_out: Reserve,
    pub fair_value: Reserve,
    pub is_premium: bool,
    pub bps: u128,
    pub pulled_from_yield: Reserve,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("Oracle price invalid: {reason}")]
    OracleInvalid { reason: PriceRejection },

    #[error("Mint refused: ratio {ratio} bps below minimum {minimum} bps")]
    UndercollateralizedMint { ratio: u128, minimum: u32 },

    #[error("Slippage: computed {computed}, minimum {minimum}")]
    ExcessiveSlippage { computed: u128, minimum: u128 },

    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Reserve, available: Reserve },

    #[error("Insufficient reserve: requested {requested}, available {available}")]
    InsufficientReserve { requested: Reserve, available: Reserve },

    #[error("Amount must be positive and within supply")]
    InvalidAmount,

    #[error("Not in liquidation mode: ratio {ratio} bps above critical {critical} bps")]
    NotInLiquidationMode { ratio: u128, critical: u32 },

    #[error("Unauthorized: {caller} lacks {required} capability")]
    Unauthorized { caller: AccountId, required: Capability },

    #[error("Reentrant call rejected")]
    ReentrantCall,

    #[error("Vault is paused")]
    Paused,

    #[error("Yield withdrawal mismatch: venue reported {reported}, vault observed {observed}")]
    YieldWithdrawalMismatch { reported: Reserve, observed: Reserve },

    #[error("Reserve transfer mismatch: expected {expected}, observed {observed}")]
    ReserveTransferMismatch { expected: Reserve, observed: Reserve },

    #[error("Liquidation mode active: ratio {ratio} bps, critical {critical} bps")]
    LiquidationModeActive { ratio: u128, critical: u32 },

    #[error("Invalid parameter {name} = {value}, allowed [{min}, {max}]")]
    InvalidParameter {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Config error: {0}")]
    Config(ConfigError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] MathError),
}

impl VaultError {
    /// Only a bad price read can clear up without anyone changing state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::OracleInvalid { .. })
    }
}

impl From<ConfigError> for VaultError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::OutOfBounds { name, value, min, max } => {
                VaultError::InvalidParameter { name, value, min, max }
            }
            other => VaultError::Config(other),
        }
    }
}

impl From<PayoutError> for VaultError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::InvalidAmount { .. } => VaultError::InvalidAmount,
            PayoutError::Math(e) => VaultError::Arithmetic(e),
        }
    }
}

impl From<PriceRejection> for VaultError {
    fn from(reason: PriceRejection) -> Self {
        VaultError::OracleInvalid { reason }
    }
}
