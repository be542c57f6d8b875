// 3.x conversion.rs: mint and redeem quotes. pure functions, no ledger access.
// fees are charged in reserve units. the net side rounds down and the fee is the
// remainder, so rounding always stays in the vault. the amount that crosses the peg is
// converted with the 18-decimal fixed price.

use crate::math::MathError;
use crate::types::{Bps, Price, Reserve, Synth};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintQuote {
    pub reserve_in: Reserve,
    /// Reserve kept by the vault as fee income.
    pub fee: Reserve,
    pub synthetic_out: Synth,
    pub price: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemQuote {
    pub synthetic_in: Synth,
    /// Reserve value of `synthetic_in` at the price, before fee.
    pub gross: Reserve,
    pub fee: Reserve,
    pub reserve_out: Reserve,
    pub price: Price,
}

/// synthetic_out = reserve_in * (10000 - fee_bps) / 10000 / price
pub fn quote_mint(reserve_in: Reserve, price: Price, mint_fee: Bps) -> Result<MintQuote, MathError> {
    let net = Reserve::new(mint_fee.net_of(reserve_in.value())?);
    let fee = reserve_in.checked_sub(net)?;
    let synthetic_out = price.reserve_to_synth(net)?;

    Ok(MintQuote {
        reserve_in,
        fee,
        synthetic_out,
        price,
    })
}

/// reserve_out = synthetic_in * price * (10000 - fee_bps) / 10000, fee = gross - reserve_out
pub fn quote_redeem(synthetic_in: Synth, price: Price, redeem_fee: Bps) -> Result<RedeemQuote, MathError> {
    let gross = price.synth_to_reserve(synthetic_in)?;
    let reserve_out = Reserve::new(redeem_fee.net_of(gross.value())?);
    let fee = gross.checked_sub(reserve_out)?;

    Ok(RedeemQuote {
        synthetic_in,
        gross,
        fee,
        reserve_out,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mint_at_par_with_fee() {
        let price = Price::new_unchecked(dec!(1.0));
        let quote = quote_mint(Reserve::from_units(1_000), price, Bps::new(30)).unwrap();

        assert_eq!(quote.fee, Reserve::from_units(3));
        assert_eq!(quote.synthetic_out, Synth::from_units(997));
    }

    #[test]
    fn mint_against_strong_euro() {
        // 1.25 USD per EUR: 1000 USD buys 800 EUR before fees
        let price = Price::new_unchecked(dec!(1.25));
        let quote = quote_mint(Reserve::from_units(1_000), price, Bps::new(0)).unwrap();
        assert_eq!(quote.synthetic_out, Synth::from_units(800));
    }

    #[test]
    fn redeem_with_fee() {
        let price = Price::new_unchecked(dec!(1.10));
        let quote = quote_redeem(Synth::from_units(100), price, Bps::new(50)).unwrap();

        assert_eq!(quote.gross, Reserve::from_units(110));
        assert_eq!(quote.fee, Reserve::new(550_000));
        assert_eq!(quote.reserve_out, Reserve::new(109_450_000));
    }

    #[test]
    fn small_amounts_still_pay_fees() {
        let price = Price::new_unchecked(dec!(1.0));

        // 1 bps of 9999 minor units is 0.9999, charged as a whole unit
        let mint = quote_mint(Reserve::new(9_999), price, Bps::new(1)).unwrap();
        assert_eq!(mint.fee, Reserve::new(1));
        assert_eq!(mint.synthetic_out, Synth::new(9_998_000_000_000_000));

        let redeem = quote_redeem(mint.synthetic_out, price, Bps::new(1)).unwrap();
        assert_eq!(redeem.gross, Reserve::new(9_998));
        assert_eq!(redeem.fee, Reserve::new(1));
        assert_eq!(redeem.reserve_out, Reserve::new(9_997));

        // splitting into single units does not dodge the fee
        let unit = quote_mint(Reserve::new(1), price, Bps::new(1)).unwrap();
        assert_eq!(unit.fee, Reserve::new(1));
        assert!(unit.synthetic_out.is_zero());
    }

    #[test]
    fn zero_fee_takes_nothing() {
        let price = Price::new_unchecked(dec!(1.08));
        let quote = quote_mint(Reserve::new(12_345), price, Bps::new(0)).unwrap();
        assert!(quote.fee.is_zero());
    }

    #[test]
    fn dust_rounds_to_zero() {
        let price = Price::new_unchecked(dec!(1.08));
        // one synth minor unit is worth far less than a reserve minor unit
        let quote = quote_redeem(Synth::new(1), price, Bps::new(10)).unwrap();
        assert_eq!(quote.reserve_out, Reserve::zero());
    }
}
