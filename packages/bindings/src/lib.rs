use napi::Result as NapiResult;
use napi_derive::napi;

use bond_sim_core::bond::{self, BondSpec, PriceShockInput, ValuationInput, YieldRange};
use bond_sim_core::credit::{self, RequiredRateInput};
use bond_sim_core::market::{self, QuoteInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Curve request: a bond plus an optional yield grid.
#[derive(serde::Deserialize)]
struct CurveRequest {
    bond: BondSpec,
    #[serde(default)]
    yield_range: Option<YieldRange>,
}

// ---------------------------------------------------------------------------
// Bond valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn value_bond(input_json: String) -> NapiResult<String> {
    let input: ValuationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bond::value_bond(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity_curve(input_json: String) -> NapiResult<String> {
    let input: CurveRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let range = input.yield_range.unwrap_or_default();
    let curve = bond::generate_sensitivity_curve(&input.bond, &range).map_err(to_napi_error)?;
    let points = curve.points().map_err(to_napi_error)?;
    serde_json::to_string(&points).map_err(to_napi_error)
}

#[napi]
pub fn shock_bond(input_json: String) -> NapiResult<String> {
    let input: PriceShockInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bond::estimate_price_change(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Credit
// ---------------------------------------------------------------------------

#[napi]
pub fn required_rate(input_json: String) -> NapiResult<String> {
    let input: RequiredRateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credit::compute_required_rate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[napi]
pub fn latest_quote(input_json: String) -> NapiResult<String> {
    let input: QuoteInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = market::summarize_quotes(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn directors_dealings(dealings_json: String) -> NapiResult<String> {
    let dealings = market::parse_dealings(&dealings_json).map_err(to_napi_error)?;
    let output = market::summarize_dealings(dealings).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
