use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BondSimError;
use crate::types::{Money, Periods, Rate};
use crate::BondSimResult;

/// Where a bond trades relative to its face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceClassification {
    Par,
    Premium,
    Discount,
}

/// Coupon paid each period: face_value * coupon_rate.
pub fn compute_coupon(face_value: Money, coupon_rate: Rate) -> BondSimResult<Money> {
    face_value
        .checked_mul(coupon_rate)
        .ok_or_else(|| BondSimError::invalid("coupon_rate", "Coupon overflows decimal range."))
}

/// Closed-form level-annuity price of a bullet bond.
///
/// ```text
/// price = coupon * (1 - (1+r)^-n) / r + face_value * (1+r)^-n
/// ```
///
/// `required_rate` must not be zero: the annuity factor divides by it. Use
/// [`undiscounted_price`] for the zero-rate limit instead.
pub fn compute_price(
    face_value: Money,
    required_rate: Rate,
    coupon: Money,
    maturity: Periods,
) -> BondSimResult<Money> {
    if maturity == 0 {
        return Err(BondSimError::invalid(
            "maturity",
            "Maturity must be at least one period.",
        ));
    }
    if required_rate.is_zero() {
        return Err(BondSimError::invalid(
            "required_rate",
            "Required rate must be non-zero for the annuity formula; use the undiscounted price for the zero-rate limit.",
        ));
    }
    if required_rate <= -Decimal::ONE {
        return Err(BondSimError::invalid(
            "required_rate",
            "Required rate must be greater than -1 (i.e. > -100%).",
        ));
    }

    let growth = compound(Decimal::ONE + required_rate, maturity)?;
    let discount = Decimal::ONE / growth;
    let annuity_factor = (Decimal::ONE - discount) / required_rate;

    coupon
        .checked_mul(annuity_factor)
        .zip(face_value.checked_mul(discount))
        .and_then(|(coupons, principal)| coupons.checked_add(principal))
        .ok_or_else(|| {
            BondSimError::invalid("required_rate", "Present value overflows decimal range.")
        })
}

/// Price with no discounting: every coupon plus the face value.
pub fn undiscounted_price(
    face_value: Money,
    coupon: Money,
    maturity: Periods,
) -> BondSimResult<Money> {
    coupon
        .checked_mul(Decimal::from(maturity))
        .and_then(|coupons| coupons.checked_add(face_value))
        .ok_or_else(|| {
            BondSimError::invalid("coupon", "Undiscounted price overflows decimal range.")
        })
}

/// Classify a price against face value, to the cent.
pub fn classify(price: Money, face_value: Money) -> PriceClassification {
    match price.round_dp(2).cmp(&face_value.round_dp(2)) {
        std::cmp::Ordering::Equal => PriceClassification::Par,
        std::cmp::Ordering::Greater => PriceClassification::Premium,
        std::cmp::Ordering::Less => PriceClassification::Discount,
    }
}

// ---------------------------------------------------------------------------
// Crate helpers
// ---------------------------------------------------------------------------

/// Price at any rate above -100%, substituting the zero-rate limit.
pub(crate) fn price_at(
    face_value: Money,
    rate: Rate,
    coupon: Money,
    maturity: Periods,
) -> BondSimResult<Money> {
    if rate.is_zero() {
        if maturity == 0 {
            return Err(BondSimError::invalid(
                "maturity",
                "Maturity must be at least one period.",
            ));
        }
        return undiscounted_price(face_value, coupon, maturity);
    }
    compute_price(face_value, rate, coupon, maturity)
}

/// (1 + r)^n by iterative multiplication.
pub(crate) fn compound(one_plus_r: Decimal, periods: Periods) -> BondSimResult<Decimal> {
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(one_plus_r)
            .ok_or_else(|| BondSimError::invalid("maturity", "Compounding factor overflows."))?;
    }
    if factor.is_zero() {
        return Err(BondSimError::DivisionByZero {
            context: "discount factor underflows to zero".into(),
        });
    }
    Ok(factor)
}
