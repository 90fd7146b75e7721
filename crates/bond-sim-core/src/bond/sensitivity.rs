//! Price-vs-yield curve for charting.
//!
//! A [`SensitivityCurve`] is a lazy iterator: each point is priced on demand
//! and independently of the others. Cloning it (or calling
//! [`SensitivityCurve::restart`]) replays the same points. Every yield in the
//! range produces exactly one item, so a point that cannot be priced shows up
//! as an `Err` rather than shortening the curve.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BondSimError;
use crate::types::{Money, Periods, Rate};
use crate::BondSimResult;

use super::pricing::price_at;
use super::spec::BondSpec;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAX_CURVE_POINTS: usize = 10_000;
const MAX_CURVE_YIELD: Rate = dec!(1);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One point on the price-vs-yield curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub yield_rate: Rate,
    pub price: Money,
}

/// Ordered set of candidate yields to price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YieldRange {
    /// `start`, `start + step`, ... up to and including `end` when it lands
    /// on the grid.
    Stepped { start: Rate, end: Rate, step: Rate },
    /// Explicit yields in strictly ascending order.
    Points { yields: Vec<Rate> },
}

impl Default for YieldRange {
    /// 1% to 10% in 50 bp steps.
    fn default() -> Self {
        YieldRange::Stepped {
            start: dec!(0.01),
            end: dec!(0.10),
            step: dec!(0.005),
        }
    }
}

impl YieldRange {
    pub fn stepped(start: Rate, end: Rate, step: Rate) -> BondSimResult<Self> {
        let range = YieldRange::Stepped { start, end, step };
        range.validate()?;
        Ok(range)
    }

    pub fn points(yields: Vec<Rate>) -> BondSimResult<Self> {
        let range = YieldRange::Points { yields };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> BondSimResult<()> {
        match self {
            YieldRange::Stepped { start, end, step } => {
                if *step <= Decimal::ZERO {
                    return Err(BondSimError::invalid("step", "Yield step must be positive."));
                }
                if end < start {
                    return Err(BondSimError::invalid(
                        "end",
                        "Yield range end must not be below its start.",
                    ));
                }
                check_yield_bounds(*start)?;
                check_yield_bounds(*end)?;
                let count = ((*end - *start) / *step).floor() + Decimal::ONE;
                if count > Decimal::from(MAX_CURVE_POINTS) {
                    return Err(BondSimError::invalid(
                        "step",
                        format!("Yield range produces more than {MAX_CURVE_POINTS} points."),
                    ));
                }
            }
            YieldRange::Points { yields } => {
                if yields.is_empty() {
                    return Err(BondSimError::InsufficientData(
                        "Yield range needs at least one yield".into(),
                    ));
                }
                if yields.len() > MAX_CURVE_POINTS {
                    return Err(BondSimError::invalid(
                        "yields",
                        format!("At most {MAX_CURVE_POINTS} yields may be priced."),
                    ));
                }
                for y in yields {
                    check_yield_bounds(*y)?;
                }
                if yields.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(BondSimError::invalid(
                        "yields",
                        "Yields must be strictly ascending.",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Number of yields in the range (assumes a validated range).
    pub fn len(&self) -> usize {
        match self {
            YieldRange::Stepped { start, end, step } => {
                if step.is_zero() || end < start {
                    return 0;
                }
                (((*end - *start) / *step).floor() + Decimal::ONE)
                    .to_usize()
                    .unwrap_or(0)
            }
            YieldRange::Points { yields } => yields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th yield, if within the range.
    pub fn yield_at(&self, index: usize) -> Option<Rate> {
        if index >= self.len() {
            return None;
        }
        match self {
            YieldRange::Stepped { start, step, .. } => {
                Some(*start + *step * Decimal::from(index as u64))
            }
            YieldRange::Points { yields } => yields.get(index).copied(),
        }
    }

    /// Lowest and highest yield in the range.
    pub fn bounds(&self) -> Option<(Rate, Rate)> {
        let last = self.len().checked_sub(1)?;
        Some((self.yield_at(0)?, self.yield_at(last)?))
    }
}

/// Lazy, restartable sequence of [`CurvePoint`]s for one bond.
#[derive(Debug, Clone)]
pub struct SensitivityCurve {
    face_value: Money,
    coupon: Money,
    maturity: Periods,
    range: YieldRange,
    next_index: usize,
    len: usize,
}

impl SensitivityCurve {
    /// Rewind to the first yield.
    pub fn restart(&mut self) {
        self.next_index = 0;
    }

    pub fn range(&self) -> &YieldRange {
        &self.range
    }

    /// Materialise every point without consuming this curve. Stops at the
    /// first point that cannot be priced.
    pub fn points(&self) -> BondSimResult<Vec<CurvePoint>> {
        let mut replay = self.clone();
        replay.restart();
        replay.collect()
    }
}

impl Iterator for SensitivityCurve {
    type Item = BondSimResult<CurvePoint>;

    fn next(&mut self) -> Option<Self::Item> {
        let yield_rate = self.range.yield_at(self.next_index)?;
        self.next_index += 1;
        let point = price_at(self.face_value, yield_rate, self.coupon, self.maturity)
            .map(|price| CurvePoint { yield_rate, price });
        if let Err(ref e) = point {
            warn!(%yield_rate, error = %e, "curve point could not be priced");
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SensitivityCurve {}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price `bond` at every yield in `yield_range`.
///
/// Both inputs are validated up front so that every point of the returned
/// curve can be priced: yields lie in [0, 1] and the bond's maturity is
/// capped, which keeps every compounding factor inside decimal range. A zero
/// yield uses the undiscounted limit.
pub fn generate_sensitivity_curve(
    bond: &BondSpec,
    yield_range: &YieldRange,
) -> BondSimResult<SensitivityCurve> {
    bond.validate()?;
    yield_range.validate()?;

    let len = yield_range.len();
    debug!(points = len, maturity = bond.maturity, "generating sensitivity curve");

    Ok(SensitivityCurve {
        face_value: bond.face_value,
        coupon: bond.coupon()?,
        maturity: bond.maturity,
        range: yield_range.clone(),
        next_index: 0,
        len,
    })
}

fn check_yield_bounds(y: Rate) -> BondSimResult<()> {
    if y < Decimal::ZERO || y > MAX_CURVE_YIELD {
        return Err(BondSimError::invalid(
            "yield",
            format!("Curve yields must lie between 0 and {MAX_CURVE_YIELD}, got {y}."),
        ));
    }
    Ok(())
}
