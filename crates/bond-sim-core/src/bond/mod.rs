//! Bond valuation engine: coupon, present value, Macaulay duration,
//! convexity and the price-vs-yield curve of a single level-coupon bond.
//!
//! Every function is pure. Inputs arrive as an immutable [`BondSpec`] (or as
//! the individual figures) and nothing is cached between calls.

pub mod convexity;
pub mod duration;
pub mod pricing;
pub mod sensitivity;
pub mod spec;
pub mod valuation;

pub use convexity::{approximate_convexity_price_change, estimate_price_change, PriceShockInput};
pub use duration::{compute_convexity, compute_duration, compute_modified_duration};
pub use pricing::{compute_coupon, compute_price, undiscounted_price, PriceClassification};
pub use sensitivity::{generate_sensitivity_curve, CurvePoint, SensitivityCurve, YieldRange};
pub use spec::{BondSpec, CreditRating, RateRange};
pub use valuation::{value_bond, ValuationInput, ValuationResult};
