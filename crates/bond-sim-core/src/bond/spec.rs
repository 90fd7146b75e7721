use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BondSimError;
use crate::types::{Money, Periods, Rate};
use crate::BondSimResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest face value accepted for a simulated bond.
pub const MAX_FACE_VALUE: Money = dec!(1000000);

/// Longest maturity accepted for a simulated bond (in coupon periods).
pub const MAX_MATURITY: Periods = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Closed interval of rates, e.g. the admissible credit spread for a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: Rate,
    pub max: Rate,
}

impl RateRange {
    pub const fn new(min: Rate, max: Rate) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, rate: Rate) -> bool {
        rate >= self.min && rate <= self.max
    }
}

/// Issuer credit rating bucket. Informational for the pricing math; drives
/// the admissible credit spread and the typical coupon band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditRating {
    #[default]
    #[serde(alias = "Investment Grade")]
    InvestmentGrade,
    #[serde(alias = "High Yield")]
    HighYield,
}

impl CreditRating {
    pub fn label(&self) -> &'static str {
        match self {
            CreditRating::InvestmentGrade => "Investment Grade",
            CreditRating::HighYield => "High Yield",
        }
    }

    /// Credit spread over the reference rate allowed for this rating.
    pub fn credit_spread_range(&self) -> RateRange {
        match self {
            CreditRating::InvestmentGrade => RateRange::new(dec!(0.00), dec!(0.01)),
            CreditRating::HighYield => RateRange::new(dec!(0.01), dec!(0.05)),
        }
    }

    /// Coupon band usually seen for issuers with this rating.
    pub fn typical_coupon_range(&self) -> RateRange {
        match self {
            CreditRating::InvestmentGrade => RateRange::new(dec!(0.01), dec!(0.05)),
            CreditRating::HighYield => RateRange::new(dec!(0.05), dec!(0.10)),
        }
    }

    /// Spread applied when a bond is first moved into this rating.
    pub fn default_credit_spread(&self) -> Rate {
        match self {
            CreditRating::InvestmentGrade => dec!(0.008),
            CreditRating::HighYield => dec!(0.01),
        }
    }
}

impl std::fmt::Display for CreditRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable description of a single level-coupon bullet bond.
///
/// A fresh value is built for every evaluation; nothing in the engine keeps
/// a reference to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondSpec {
    /// Principal repaid at maturity (e.g. 1000)
    pub face_value: Money,
    /// Coupon rate per period as a decimal (0.05 = 5%)
    pub coupon_rate: Rate,
    /// Whole coupon periods until maturity
    pub maturity: Periods,
    /// Discount rate (yield) per period as a decimal
    pub required_rate: Rate,
    /// Informational rating bucket; not used in the valuation math
    #[serde(default)]
    pub credit_rating: CreditRating,
}

impl Default for BondSpec {
    fn default() -> Self {
        Self {
            face_value: dec!(1000),
            coupon_rate: dec!(0.04875),
            maturity: 1,
            required_rate: dec!(0.05),
            credit_rating: CreditRating::InvestmentGrade,
        }
    }
}

impl BondSpec {
    /// Build and validate a bond specification.
    pub fn new(
        face_value: Money,
        coupon_rate: Rate,
        maturity: Periods,
        required_rate: Rate,
        credit_rating: CreditRating,
    ) -> BondSimResult<Self> {
        let spec = Self {
            face_value,
            coupon_rate,
            maturity,
            required_rate,
            credit_rating,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check every field against the simulator's admissible ranges.
    pub fn validate(&self) -> BondSimResult<()> {
        if self.face_value <= Decimal::ZERO {
            return Err(BondSimError::invalid(
                "face_value",
                "Face value must be positive.",
            ));
        }
        if self.face_value > MAX_FACE_VALUE {
            return Err(BondSimError::invalid(
                "face_value",
                format!("Face value must not exceed {MAX_FACE_VALUE}."),
            ));
        }
        if self.coupon_rate < Decimal::ZERO || self.coupon_rate > Decimal::ONE {
            return Err(BondSimError::invalid(
                "coupon_rate",
                "Coupon rate must be between 0 and 1.",
            ));
        }
        if self.maturity == 0 {
            return Err(BondSimError::invalid(
                "maturity",
                "Maturity must be at least one period.",
            ));
        }
        if self.maturity > MAX_MATURITY {
            return Err(BondSimError::invalid(
                "maturity",
                format!("Maturity must not exceed {MAX_MATURITY} periods."),
            ));
        }
        if self.required_rate <= Decimal::ZERO || self.required_rate > Decimal::ONE {
            return Err(BondSimError::invalid(
                "required_rate",
                "Required rate must be greater than 0 and at most 1.",
            ));
        }
        Ok(())
    }

    /// Coupon paid each period (face_value * coupon_rate).
    pub fn coupon(&self) -> BondSimResult<Money> {
        super::pricing::compute_coupon(self.face_value, self.coupon_rate)
    }

    /// Copy of this spec discounted at a different required rate.
    pub fn with_required_rate(&self, required_rate: Rate) -> Self {
        Self {
            required_rate,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_simulator_settings() {
        let spec = BondSpec::default();
        assert_eq!(spec.face_value, dec!(1000));
        assert_eq!(spec.coupon_rate, dec!(0.04875));
        assert_eq!(spec.maturity, 1);
        assert_eq!(spec.required_rate, dec!(0.05));
        assert_eq!(spec.credit_rating, CreditRating::InvestmentGrade);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_coupon_is_face_times_rate() {
        let spec = BondSpec::default();
        assert_eq!(spec.coupon().unwrap(), dec!(48.75));
    }

    #[test]
    fn test_rejects_non_positive_face_value() {
        let err = BondSpec::new(dec!(0), dec!(0.05), 5, dec!(0.05), CreditRating::default())
            .unwrap_err();
        match err {
            BondSimError::InvalidInput { field, .. } => assert_eq!(field, "face_value"),
            other => panic!("Expected InvalidInput for face_value, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_face_value_above_cap() {
        let err = BondSpec::new(
            dec!(1000000.01),
            dec!(0.05),
            5,
            dec!(0.05),
            CreditRating::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BondSimError::InvalidInput { ref field, .. } if field == "face_value"));
    }

    #[test]
    fn test_rejects_zero_maturity() {
        let err = BondSpec::new(dec!(1000), dec!(0.05), 0, dec!(0.05), CreditRating::default())
            .unwrap_err();
        assert!(matches!(err, BondSimError::InvalidInput { ref field, .. } if field == "maturity"));
    }

    #[test]
    fn test_rejects_zero_required_rate() {
        let err = BondSpec::new(dec!(1000), dec!(0.05), 5, dec!(0), CreditRating::default())
            .unwrap_err();
        assert!(
            matches!(err, BondSimError::InvalidInput { ref field, .. } if field == "required_rate")
        );
    }

    #[test]
    fn test_rating_accepts_display_labels() {
        let ig: CreditRating = serde_json::from_str("\"Investment Grade\"").unwrap();
        let hy: CreditRating = serde_json::from_str("\"high_yield\"").unwrap();
        assert_eq!(ig, CreditRating::InvestmentGrade);
        assert_eq!(hy, CreditRating::HighYield);
        assert_eq!(hy.to_string(), "High Yield");
    }

    #[test]
    fn test_rating_ranges() {
        let hy = CreditRating::HighYield;
        assert!(hy.credit_spread_range().contains(dec!(0.03)));
        assert!(!hy.credit_spread_range().contains(dec!(0.005)));
        assert!(CreditRating::InvestmentGrade
            .typical_coupon_range()
            .contains(dec!(0.04875)));
        assert_eq!(hy.default_credit_spread(), dec!(0.01));
    }
}
