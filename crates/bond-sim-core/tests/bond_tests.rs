use bond_sim_core::bond::{
    approximate_convexity_price_change, compute_coupon, compute_duration, compute_price,
    generate_sensitivity_curve, value_bond, BondSpec, CreditRating, PriceClassification,
    ValuationInput, YieldRange,
};
use bond_sim_core::BondSimError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn bond(coupon_rate: Decimal, maturity: u32, required_rate: Decimal) -> BondSpec {
    BondSpec::new(
        dec!(1000),
        coupon_rate,
        maturity,
        required_rate,
        CreditRating::InvestmentGrade,
    )
    .unwrap()
}

/// Basis points to a decimal rate.
fn bp(n: u32) -> Decimal {
    Decimal::from(n) / dec!(10000)
}

// ===========================================================================
// Price
// ===========================================================================

#[test]
fn test_par_bond_five_years() {
    let coupon = compute_coupon(dec!(1000), dec!(0.05)).unwrap();
    let price = compute_price(dec!(1000), dec!(0.05), coupon, 5).unwrap();
    assert_eq!(price.round_dp(2), dec!(1000.00));
}

#[test]
fn test_single_period_price() {
    // (50 + 1000) / 1.05 = 1000
    let price = compute_price(dec!(1000), dec!(0.05), dec!(50), 1).unwrap();
    assert_eq!(price.round_dp(2), dec!(1000.00));
}

#[test]
fn test_zero_rate_is_invalid_input_not_infinity() {
    let err = compute_price(dec!(1000), Decimal::ZERO, dec!(50), 5).unwrap_err();
    match err {
        BondSimError::InvalidInput { field, .. } => assert_eq!(field, "required_rate"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_simulator_default_bond() {
    // Face 1000, coupon 4.875%, one year at 5%: (48.75 + 1000) / 1.05
    let spec = BondSpec::default();
    let price = compute_price(spec.face_value, spec.required_rate, spec.coupon().unwrap(), spec.maturity)
        .unwrap();
    assert_eq!(price.round_dp(2), dec!(998.81));
}

// ===========================================================================
// Duration
// ===========================================================================

#[test]
fn test_zero_coupon_duration_equals_maturity() {
    for n in [1u32, 5, 10, 15] {
        let d = compute_duration(Decimal::ZERO, dec!(1000), dec!(0.05), n).unwrap();
        assert_eq!(d, Decimal::from(n));
    }
}

#[test]
fn test_extreme_inputs_are_errors_not_panics() {
    assert!(compute_coupon(Decimal::MAX, dec!(2)).is_err());
    assert!(compute_duration(dec!(50), dec!(1000), dec!(-0.99), 14).is_err());
    assert!(
        approximate_convexity_price_change(dec!(100), Decimal::MAX, dec!(1), dec!(-2)).is_err()
    );
}

#[test]
fn test_duration_rejects_zero_maturity() {
    let err = compute_duration(dec!(50), dec!(1000), dec!(0.05), 0).unwrap_err();
    assert!(matches!(err, BondSimError::InvalidInput { .. }));
}

// ===========================================================================
// Curve & convexity
// ===========================================================================

#[test]
fn test_curve_strictly_decreasing_over_default_range() {
    for n in [1u32, 3, 10, 15] {
        let spec = bond(dec!(0.04875), n, dec!(0.05));
        let points = generate_sensitivity_curve(&spec, &YieldRange::default())
            .unwrap()
            .points()
            .unwrap();
        assert!(!points.is_empty());
        assert!(points.windows(2).all(|w| w[1].price < w[0].price));
    }
}

#[test]
fn test_taylor_estimate_matches_reprice_sign() {
    let spec = bond(dec!(0.05), 10, dec!(0.05));
    let out = value_bond(&ValuationInput {
        bond: spec.clone(),
        yield_range: None,
    })
    .unwrap()
    .result;

    // Price-relative form of the Taylor formula
    let pct = approximate_convexity_price_change(
        Decimal::ZERO,
        out.modified_duration,
        out.convexity,
        dec!(0.01),
    )
    .unwrap();
    let estimated = out.price * (Decimal::ONE + pct);
    let exact = compute_price(spec.face_value, dec!(0.06), spec.coupon().unwrap(), spec.maturity).unwrap();
    assert!((estimated - exact).abs() < dec!(1), "estimate {estimated} vs exact {exact}");
}

#[test]
fn test_valuation_json_round_trip() {
    let input = ValuationInput {
        bond: bond(dec!(0.06), 7, dec!(0.04)),
        yield_range: Some(YieldRange::stepped(dec!(0.02), dec!(0.08), dec!(0.01)).unwrap()),
    };
    let json = serde_json::to_string(&input).unwrap();
    let back: ValuationInput = serde_json::from_str(&json).unwrap();
    pretty_assertions::assert_eq!(back.bond, input.bond);
    pretty_assertions::assert_eq!(back.yield_range, input.yield_range);

    let out = value_bond(&back).unwrap();
    assert_eq!(out.result.classification, PriceClassification::Premium);
    assert_eq!(out.result.curve.len(), 7);
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_discount_and_premium(
        coupon_bp in 0u32..1000,
        required_bp in 1u32..1500,
        maturity in 1u32..=15,
    ) {
        prop_assume!(coupon_bp != required_bp);
        let spec = bond(bp(coupon_bp), maturity, bp(required_bp));
        let price = compute_price(spec.face_value, spec.required_rate, spec.coupon().unwrap(), maturity).unwrap();
        prop_assert!(price > Decimal::ZERO);
        if required_bp > coupon_bp {
            prop_assert!(price < spec.face_value, "discount bond priced {}", price);
        } else {
            prop_assert!(price > spec.face_value, "premium bond priced {}", price);
        }
    }

    #[test]
    fn prop_duration_within_bounds(
        coupon_bp in 0u32..1000,
        required_bp in 1u32..1500,
        maturity in 1u32..=15,
    ) {
        let spec = bond(bp(coupon_bp), maturity, bp(required_bp));
        let d = compute_duration(spec.coupon().unwrap(), spec.face_value, spec.required_rate, maturity).unwrap();
        let n = Decimal::from(maturity);
        prop_assert!(d > Decimal::ZERO);
        prop_assert!(d <= n, "duration {} exceeds maturity {}", d, n);
        if coupon_bp == 0 {
            prop_assert_eq!(d, n);
        } else if maturity > 1 {
            prop_assert!(d < n, "coupon bond duration {} should be below {}", d, n);
        }
    }

    #[test]
    fn prop_curve_monotone(
        coupon_bp in 0u32..1000,
        maturity in 1u32..=15,
    ) {
        let spec = bond(bp(coupon_bp), maturity, dec!(0.05));
        let points = generate_sensitivity_curve(&spec, &YieldRange::default()).unwrap().points().unwrap();
        prop_assert_eq!(points.len(), 19);
        for w in points.windows(2) {
            prop_assert!(w[1].price < w[0].price);
        }
    }
}
