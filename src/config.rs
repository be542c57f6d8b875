// 7.0 config.rs: all settings in one place. fees, thresholds, oracle guard, roles.
// 7.1 the config is versioned instead of upgradeable. a vault only accepts a document
// whose version matches CONFIG_VERSION, and every bound is checked before construction.

use serde::{Deserialize, Serialize};

use crate::capability::RoleAssignments;
use crate::collateral::CollateralThresholds;
use crate::ledger::FeeSchedule;
use crate::price_feed::OracleParams;
use crate::types::{Bps, Reserve, BPS_DENOMINATOR};

pub const CONFIG_VERSION: u32 = 1;

/// 10%. anything above this is a misconfiguration, not a fee.
pub const MAX_FEE_BPS: u32 = 1_000;

/// 1000%. thresholds above this are almost certainly a units mistake.
pub const MAX_COLLATERAL_RATIO_BPS: u32 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub version: u32,
    pub fees: FeeSchedule,
    pub thresholds: CollateralThresholds,
    pub oracle: OracleParams,
    pub roles: RoleAssignments,
    // Largest accepted gap between what the yield venue reports and what arrives
    pub yield_withdraw_tolerance: Reserve,
    // Audit log capacity
    pub max_events: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            fees: FeeSchedule::default(),
            thresholds: CollateralThresholds::default(),
            oracle: OracleParams::default(),
            roles: RoleAssignments::default(),
            yield_withdraw_tolerance: Reserve::zero(),
            max_events: 10_000,
        }
    }
}

impl VaultConfig {
    // Looser thresholds and free minting for integration environments
    pub fn testnet() -> Self {
        let mut config = Self::default();
        config.fees.mint_fee_bps = Bps::new(0);
        config.fees.redeem_fee_bps = Bps::new(5);
        config.oracle.max_deviation_bps = 1_000; // 10%, test feeds are noisy
        config.oracle.min_blocks_between_updates = 0;
        config
    }

    // Conservative settings for production
    pub fn mainnet_conservative() -> Self {
        let mut config = Self::default();
        config.thresholds.min_collateral_ratio_bps = 12_000; // 120%
        config.thresholds.critical_collateral_ratio_bps = 10_500; // 105%
        config.oracle.max_deviation_bps = 300; // 3%
        config.oracle.min_blocks_between_updates = 5;
        config.max_events = 100_000;
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: VaultConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                expected: CONFIG_VERSION,
            });
        }

        validate_fees(&self.fees)?;
        validate_thresholds(&self.thresholds)?;
        validate_oracle(&self.oracle)?;

        let roles = self.roles;
        if roles.governance == roles.margin_pool
            || roles.governance == roles.yield_venue
            || roles.margin_pool == roles.yield_venue
        {
            return Err(ConfigError::InvalidRoles {
                reason: "each capability needs its own identity".to_string(),
            });
        }

        if self.max_events == 0 {
            return Err(ConfigError::InvalidEventLog);
        }

        Ok(())
    }
}

pub fn validate_fees(fees: &FeeSchedule) -> Result<(), ConfigError> {
    for (name, bps) in [("mint_fee_bps", fees.mint_fee_bps), ("redeem_fee_bps", fees.redeem_fee_bps)] {
        if bps.value() > MAX_FEE_BPS {
            return Err(ConfigError::OutOfBounds {
                name,
                value: bps.value(),
                min: 0,
                max: MAX_FEE_BPS,
            });
        }
    }
    Ok(())
}

pub fn validate_thresholds(thresholds: &CollateralThresholds) -> Result<(), ConfigError> {
    let critical = thresholds.critical_collateral_ratio_bps;
    let min = thresholds.min_collateral_ratio_bps;

    // 10000 <= critical < min <= 100000
    if !(BPS_DENOMINATOR..MAX_COLLATERAL_RATIO_BPS).contains(&critical) {
        return Err(ConfigError::OutOfBounds {
            name: "critical_collateral_ratio_bps",
            value: critical,
            min: BPS_DENOMINATOR,
            max: MAX_COLLATERAL_RATIO_BPS - 1,
        });
    }
    if min <= critical || min > MAX_COLLATERAL_RATIO_BPS {
        return Err(ConfigError::OutOfBounds {
            name: "min_collateral_ratio_bps",
            value: min,
            min: critical + 1,
            max: MAX_COLLATERAL_RATIO_BPS,
        });
    }
    Ok(())
}

pub fn validate_oracle(oracle: &OracleParams) -> Result<(), ConfigError> {
    if oracle.max_deviation_bps == 0 || oracle.max_deviation_bps > BPS_DENOMINATOR {
        return Err(ConfigError::OutOfBounds {
            name: "max_deviation_bps",
            value: oracle.max_deviation_bps,
            min: 1,
            max: BPS_DENOMINATOR,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config version {found} not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("{name} = {value} outside [{min}, {max}]")]
    OutOfBounds {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid roles: {reason}")]
    InvalidRoles { reason: String },

    #[error("event log capacity must be positive")]
    InvalidEventLog,

    #[error("config parse error: {0}")]
    Parse(String),
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn config(&self) -> VaultConfig {
        match self {
            Environment::Development => VaultConfig::default(),
            Environment::Testnet => VaultConfig::testnet(),
            Environment::Mainnet => VaultConfig::mainnet_conservative(),
        }
    }
}
