use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use bond_sim_core::bond::{
    self, BondSpec, CreditRating, PriceShockInput, ValuationInput, YieldRange,
};

use crate::input;

/// Credit rating bucket
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RatingArg {
    InvestmentGrade,
    HighYield,
}

impl From<RatingArg> for CreditRating {
    fn from(arg: RatingArg) -> Self {
        match arg {
            RatingArg::InvestmentGrade => CreditRating::InvestmentGrade,
            RatingArg::HighYield => CreditRating::HighYield,
        }
    }
}

/// Bond parameters shared by every bond command
#[derive(Args, Debug, Clone)]
#[command(allow_hyphen_values = true)]
pub struct BondArgs {
    /// Face value repaid at maturity
    #[arg(long, default_value = "1000")]
    pub face_value: Decimal,

    /// Coupon rate per period (e.g. 0.05 for 5%)
    #[arg(long, default_value = "0.04875")]
    pub coupon_rate: Decimal,

    /// Whole periods until maturity
    #[arg(long, default_value_t = 1)]
    pub maturity: u32,

    /// Required rate (yield) per period
    #[arg(long, default_value = "0.05")]
    pub required_rate: Decimal,

    /// Credit rating (informational)
    #[arg(long, value_enum, default_value = "investment-grade")]
    pub credit_rating: RatingArg,
}

impl BondArgs {
    fn to_spec(&self) -> Result<BondSpec, Box<dyn std::error::Error>> {
        Ok(BondSpec::new(
            self.face_value,
            self.coupon_rate,
            self.maturity,
            self.required_rate,
            self.credit_rating.into(),
        )?)
    }
}

/// Yield grid for the price-vs-yield curve
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Lowest yield on the curve
    #[arg(long, default_value = "0.01")]
    pub start: Decimal,

    /// Highest yield on the curve
    #[arg(long, default_value = "0.10")]
    pub end: Decimal,

    /// Spacing between yields
    #[arg(long, default_value = "0.005")]
    pub step: Decimal,
}

impl RangeArgs {
    fn to_range(&self) -> Result<YieldRange, Box<dyn std::error::Error>> {
        Ok(YieldRange::stepped(self.start, self.end, self.step)?)
    }
}

/// Arguments for the coupon calculation
#[derive(Args)]
pub struct CouponArgs {
    /// Face value
    #[arg(long, default_value = "1000")]
    pub face_value: Decimal,

    /// Coupon rate per period
    #[arg(long, default_value = "0.04875")]
    pub coupon_rate: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the closed-form price
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PriceArgs {
    /// Face value
    #[arg(long, default_value = "1000")]
    pub face_value: Decimal,

    /// Required rate per period
    #[arg(long, default_value = "0.05")]
    pub required_rate: Decimal,

    /// Coupon amount per period (overrides --coupon-rate)
    #[arg(long)]
    pub coupon: Option<Decimal>,

    /// Coupon rate per period, used when --coupon is absent
    #[arg(long, default_value = "0.04875")]
    pub coupon_rate: Decimal,

    /// Whole periods until maturity
    #[arg(long, default_value_t = 1)]
    pub maturity: u32,

    /// Price a zero required rate as the undiscounted sum of cash flows
    #[arg(long)]
    pub zero_rate_limit: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for duration & convexity
#[derive(Args)]
pub struct DurationArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    /// Path to JSON valuation input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the price-vs-yield curve
#[derive(Args)]
pub struct CurveArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Path to JSON valuation input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the literal Taylor approximation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ConvexityAdjustArgs {
    /// Price before the yield change
    #[arg(long)]
    pub initial_price: Option<Decimal>,

    /// Duration to apply
    #[arg(long)]
    pub duration: Option<Decimal>,

    /// Convexity to apply
    #[arg(long)]
    pub convexity: Option<Decimal>,

    /// Yield change as a decimal (0.01 = +100 bp)
    #[arg(long)]
    pub yield_change: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a yield shock estimate
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ShockArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    /// Yield change as a decimal (0.01 = +100 bp)
    #[arg(long)]
    pub yield_change: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the full valuation
#[derive(Args)]
pub struct ValueArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

// ---------------------------------------------------------------------------
// JSON request bodies for commands without a core input type
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub face_value: Decimal,
    pub coupon_rate: Decimal,
}

/// Either `coupon` or `coupon_rate` must be present; `coupon` wins.
#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub face_value: Decimal,
    pub required_rate: Decimal,
    #[serde(default)]
    pub coupon: Option<Decimal>,
    #[serde(default)]
    pub coupon_rate: Option<Decimal>,
    pub maturity: u32,
    #[serde(default)]
    pub zero_rate_limit: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConvexityAdjustRequest {
    pub initial_price: Decimal,
    pub duration: Decimal,
    pub convexity: Decimal,
    pub yield_change: Decimal,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn run_coupon(args: CouponArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CouponRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        CouponRequest {
            face_value: args.face_value,
            coupon_rate: args.coupon_rate,
        }
    };
    coupon_output(&request)
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PriceRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PriceRequest {
            face_value: args.face_value,
            required_rate: args.required_rate,
            coupon: args.coupon,
            coupon_rate: Some(args.coupon_rate),
            maturity: args.maturity,
            zero_rate_limit: args.zero_rate_limit,
        }
    };
    price_output(&request)
}

pub fn run_duration(args: DurationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec = if let Some(ref path) = args.input {
        input::file::read_json::<ValuationInput>(path)?.bond
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value::<ValuationInput>(data)?.bond
    } else {
        args.bond.to_spec()?
    };
    duration_output(&spec)
}

pub fn run_curve(args: CurveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let valuation: ValuationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ValuationInput {
            bond: args.bond.to_spec()?,
            yield_range: Some(args.range.to_range()?),
        }
    };
    curve_output(&valuation)
}

pub fn run_convexity_adjust(
    args: ConvexityAdjustArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ConvexityAdjustRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ConvexityAdjustRequest {
            initial_price: args
                .initial_price
                .ok_or("--initial-price is required (or provide --input)")?,
            duration: args
                .duration
                .ok_or("--duration is required (or provide --input)")?,
            convexity: args
                .convexity
                .ok_or("--convexity is required (or provide --input)")?,
            yield_change: args
                .yield_change
                .ok_or("--yield-change is required (or provide --input)")?,
        }
    };
    convexity_adjust_output(&request)
}

pub fn run_shock(args: ShockArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let shock_input: PriceShockInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PriceShockInput {
            bond: args.bond.to_spec()?,
            yield_change: args
                .yield_change
                .ok_or("--yield-change is required (or provide --input)")?,
        }
    };
    let result = bond::estimate_price_change(&shock_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_value(args: ValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let valuation_input: ValuationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ValuationInput {
            bond: args.bond.to_spec()?,
            yield_range: Some(args.range.to_range()?),
        }
    };
    let result = bond::value_bond(&valuation_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn coupon_output(request: &CouponRequest) -> Result<Value, Box<dyn std::error::Error>> {
    let coupon = bond::compute_coupon(request.face_value, request.coupon_rate)?;
    Ok(json!({
        "face_value": request.face_value,
        "coupon_rate": request.coupon_rate,
        "coupon": coupon,
    }))
}

fn price_output(request: &PriceRequest) -> Result<Value, Box<dyn std::error::Error>> {
    let coupon = match (request.coupon, request.coupon_rate) {
        (Some(coupon), _) => coupon,
        (None, Some(rate)) => bond::compute_coupon(request.face_value, rate)?,
        (None, None) => return Err("coupon or coupon_rate is required for price".into()),
    };

    let price = if request.zero_rate_limit && request.required_rate.is_zero() {
        if request.maturity == 0 {
            return Err("maturity must be at least 1".into());
        }
        bond::undiscounted_price(request.face_value, coupon, request.maturity)?
    } else {
        bond::compute_price(request.face_value, request.required_rate, coupon, request.maturity)?
    };

    Ok(json!({
        "price": price,
        "coupon": coupon,
        "classification": bond::pricing::classify(price, request.face_value),
    }))
}

fn duration_output(spec: &BondSpec) -> Result<Value, Box<dyn std::error::Error>> {
    spec.validate()?;
    let coupon = spec.coupon()?;
    let macaulay = bond::compute_duration(coupon, spec.face_value, spec.required_rate, spec.maturity)?;
    let modified = bond::compute_modified_duration(macaulay, spec.required_rate)?;
    let convexity =
        bond::compute_convexity(coupon, spec.face_value, spec.required_rate, spec.maturity)?;

    Ok(json!({
        "macaulay_duration": macaulay,
        "modified_duration": modified,
        "convexity": convexity,
        "maturity": spec.maturity,
    }))
}

fn curve_output(valuation: &ValuationInput) -> Result<Value, Box<dyn std::error::Error>> {
    let range = valuation.yield_range.clone().unwrap_or_default();
    let curve = bond::generate_sensitivity_curve(&valuation.bond, &range)?;
    Ok(serde_json::to_value(curve.points()?)?)
}

fn convexity_adjust_output(
    request: &ConvexityAdjustRequest,
) -> Result<Value, Box<dyn std::error::Error>> {
    let new_price = bond::approximate_convexity_price_change(
        request.initial_price,
        request.duration,
        request.convexity,
        request.yield_change,
    )?;
    let price_change = new_price
        .checked_sub(request.initial_price)
        .ok_or("price change overflows decimal range")?;
    Ok(json!({
        "new_price": new_price,
        "price_change": price_change,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bond_sim_core::bond::CurvePoint;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    const PAR_BOND: &str = r#"{"bond":{"face_value":"1000","coupon_rate":"0.05","maturity":5,"required_rate":"0.05"}}"#;

    fn write_input(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bondsim-{}-{name}.json", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    fn decimal(value: &Value) -> Decimal {
        serde_json::from_value(value.clone()).unwrap()
    }

    fn price_at_five_percent(points: &Value) -> Decimal {
        let points: Vec<CurvePoint> = serde_json::from_value(points.clone()).unwrap();
        points
            .iter()
            .find(|p| p.yield_rate == dec!(0.05))
            .map(|p| p.price)
            .unwrap()
    }

    #[test]
    fn test_curve_reads_valuation_json() {
        let valuation: ValuationInput = serde_json::from_str(PAR_BOND).unwrap();
        let points = curve_output(&valuation).unwrap();
        assert_eq!(points.as_array().unwrap().len(), 19);
        assert_eq!(price_at_five_percent(&points).round_dp(2), dec!(1000.00));
    }

    #[test]
    fn test_curve_input_file_overrides_flags() {
        let path = write_input("curve", PAR_BOND);
        let args = CurveArgs {
            bond: BondArgs {
                face_value: dec!(1000),
                coupon_rate: dec!(0.04875),
                maturity: 1,
                required_rate: dec!(0.05),
                credit_rating: RatingArg::InvestmentGrade,
            },
            range: RangeArgs {
                start: dec!(0.01),
                end: dec!(0.10),
                step: dec!(0.005),
            },
            input: Some(path.display().to_string()),
        };
        let points = run_curve(args).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(price_at_five_percent(&points).round_dp(2), dec!(1000.00));
    }

    #[test]
    fn test_duration_input_file() {
        let path = write_input("duration", PAR_BOND);
        let args = DurationArgs {
            bond: BondArgs {
                face_value: dec!(1000),
                coupon_rate: dec!(0.04875),
                maturity: 1,
                required_rate: dec!(0.05),
                credit_rating: RatingArg::InvestmentGrade,
            },
            input: Some(path.display().to_string()),
        };
        let out = run_duration(args).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(out["maturity"], json!(5));
    }

    #[test]
    fn test_price_request_from_json() {
        let request: PriceRequest = serde_json::from_value(json!({
            "face_value": "1000",
            "required_rate": "0",
            "coupon": "50",
            "maturity": 5,
            "zero_rate_limit": true,
        }))
        .unwrap();
        let out = price_output(&request).unwrap();
        assert_eq!(decimal(&out["price"]), dec!(1250));

        let missing: PriceRequest = serde_json::from_value(json!({
            "face_value": "1000",
            "required_rate": "0.05",
            "maturity": 5,
        }))
        .unwrap();
        assert!(price_output(&missing).is_err());
    }

    #[test]
    fn test_coupon_overflow_is_error() {
        let request = CouponRequest {
            face_value: Decimal::MAX,
            coupon_rate: dec!(2),
        };
        assert!(coupon_output(&request).is_err());
    }

    #[test]
    fn test_convexity_adjust_request() {
        let request: ConvexityAdjustRequest = serde_json::from_value(json!({
            "initial_price": "100",
            "duration": "7",
            "convexity": "50",
            "yield_change": "0.01",
        }))
        .unwrap();
        let out = convexity_adjust_output(&request).unwrap();
        assert_eq!(decimal(&out["new_price"]), dec!(99.9325));

        let overflow = ConvexityAdjustRequest {
            initial_price: dec!(100),
            duration: Decimal::MAX,
            convexity: dec!(1),
            yield_change: dec!(-2),
        };
        assert!(convexity_adjust_output(&overflow).is_err());
    }
}
