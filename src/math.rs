// 1.7: overflow-safe integer math. synthetic supply is 18 decimals, so products of two
// amounts routinely exceed u128 before the division brings them back down.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow")]
    Underflow,

    #[error("division by zero")]
    DivisionByZero,
}

/// `a * b / denominator` rounded down, with a 256-bit intermediate.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let quotient = product / U256::from(denominator);
    u128::try_from(quotient).map_err(|_| MathError::Overflow)
}
