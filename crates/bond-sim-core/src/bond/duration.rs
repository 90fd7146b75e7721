//! Macaulay duration, modified duration and convexity of a level-coupon
//! bullet bond, all measured in coupon periods.
//!
//! Discount factors are accumulated by iterative multiplication so that the
//! period-by-period sums stay at full decimal precision.

use rust_decimal::Decimal;

use crate::error::BondSimError;
use crate::types::{Money, Periods, Rate};
use crate::BondSimResult;

use super::pricing::compound;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Macaulay duration: present-value-weighted average time to receipt.
///
/// ```text
/// for t in 1..=n:  num += t * C/(1+r)^t ;  den += C/(1+r)^t
/// num += n * F/(1+r)^n ;  den += F/(1+r)^n
/// D = num / den
/// ```
///
/// A zero-coupon bond returns exactly `maturity`.
pub fn compute_duration(
    coupon: Money,
    face_value: Money,
    required_rate: Rate,
    maturity: Periods,
) -> BondSimResult<Decimal> {
    validate_cash_flows(coupon, face_value, required_rate, maturity)?;

    if coupon.is_zero() {
        return Ok(Decimal::from(maturity));
    }

    let one_plus_r = Decimal::ONE + required_rate;
    let mut numerator = Decimal::ZERO;
    let mut denominator = Decimal::ZERO;
    let mut df = Decimal::ONE;

    for t in 1..=maturity {
        df = next_factor(df, one_plus_r)?;
        let pv_coupon = discount(coupon, df)?;
        numerator = weighted_add(numerator, Decimal::from(t), pv_coupon)?;
        denominator = weighted_add(denominator, Decimal::ONE, pv_coupon)?;
    }

    let pv_face = discount(face_value, df)?;
    numerator = weighted_add(numerator, Decimal::from(maturity), pv_face)?;
    denominator = weighted_add(denominator, Decimal::ONE, pv_face)?;

    if denominator <= Decimal::ZERO {
        return Err(BondSimError::DivisionByZero {
            context: "Macaulay duration: present value is not positive".into(),
        });
    }

    numerator.checked_div(denominator).ok_or_else(present_value_overflow)
}

/// Modified duration: Macaulay duration / (1 + r).
pub fn compute_modified_duration(macaulay: Decimal, required_rate: Rate) -> BondSimResult<Decimal> {
    let one_plus_r = Decimal::ONE + required_rate;
    if one_plus_r <= Decimal::ZERO {
        return Err(BondSimError::invalid(
            "required_rate",
            "Required rate must be greater than -1 (i.e. > -100%).",
        ));
    }
    macaulay.checked_div(one_plus_r).ok_or_else(|| {
        BondSimError::invalid("required_rate", "Modified duration overflows decimal range.")
    })
}

/// Convexity from the same discounted cash flows as the duration:
/// sum of t(t+1) * PV(CF_t) / (P * (1+r)^2).
pub fn compute_convexity(
    coupon: Money,
    face_value: Money,
    required_rate: Rate,
    maturity: Periods,
) -> BondSimResult<Decimal> {
    validate_cash_flows(coupon, face_value, required_rate, maturity)?;

    let one_plus_r = Decimal::ONE + required_rate;
    let mut numerator = Decimal::ZERO;
    let mut price = Decimal::ZERO;
    let mut df = Decimal::ONE;

    for t in 1..=maturity {
        df = next_factor(df, one_plus_r)?;
        let cf = if t == maturity {
            coupon.checked_add(face_value).ok_or_else(present_value_overflow)?
        } else {
            coupon
        };
        let pv_cf = discount(cf, df)?;
        let t_dec = Decimal::from(t);
        numerator = weighted_add(numerator, t_dec * (t_dec + Decimal::ONE), pv_cf)?;
        price = weighted_add(price, Decimal::ONE, pv_cf)?;
    }

    let denominator = price
        .checked_mul(compound(one_plus_r, 2)?)
        .ok_or_else(present_value_overflow)?;
    if denominator <= Decimal::ZERO {
        return Err(BondSimError::DivisionByZero {
            context: "convexity: present value is not positive".into(),
        });
    }

    numerator.checked_div(denominator).ok_or_else(present_value_overflow)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_cash_flows(
    coupon: Money,
    face_value: Money,
    required_rate: Rate,
    maturity: Periods,
) -> BondSimResult<()> {
    if maturity == 0 {
        return Err(BondSimError::invalid(
            "maturity",
            "Maturity must be at least one period.",
        ));
    }
    if face_value <= Decimal::ZERO {
        return Err(BondSimError::invalid(
            "face_value",
            "Face value must be positive.",
        ));
    }
    if coupon < Decimal::ZERO {
        return Err(BondSimError::invalid("coupon", "Coupon must be non-negative."));
    }
    if required_rate <= -Decimal::ONE {
        return Err(BondSimError::invalid(
            "required_rate",
            "Required rate must be greater than -1 (i.e. > -100%).",
        ));
    }
    Ok(())
}

/// cash_flow / (1+r)^t
fn discount(cash_flow: Money, df: Decimal) -> BondSimResult<Decimal> {
    cash_flow.checked_div(df).ok_or_else(present_value_overflow)
}

/// acc + weight * value
fn weighted_add(acc: Decimal, weight: Decimal, value: Decimal) -> BondSimResult<Decimal> {
    weight
        .checked_mul(value)
        .and_then(|term| acc.checked_add(term))
        .ok_or_else(present_value_overflow)
}

fn present_value_overflow() -> BondSimError {
    BondSimError::invalid("required_rate", "Present value overflows decimal range.")
}

fn next_factor(df: Decimal, one_plus_r: Decimal) -> BondSimResult<Decimal> {
    match df.checked_mul(one_plus_r) {
        Some(next) if !next.is_zero() => Ok(next),
        Some(_) => Err(BondSimError::DivisionByZero {
            context: "discount factor underflows to zero".into(),
        }),
        None => Err(BondSimError::invalid(
            "maturity",
            "Compounding factor overflows.",
        )),
    }
}
