use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_payment(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::mortgage::payment::PaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_finance_core::mortgage::payment::calculate_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::mortgage::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_finance_core::mortgage::schedule::generate_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_prepayment(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::mortgage::prepayment::PrepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_finance_core::mortgage::prepayment::analyze_prepayment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_refinance(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::mortgage::refinance::RefinanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_finance_core::mortgage::refinance::analyze_refinance(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn break_penalty(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::mortgage::penalty::BreakPenaltyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        rental_finance_core::mortgage::penalty::break_penalty(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[napi]
pub fn run_forecast(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::forecast::projection::ForecastInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_finance_core::forecast::projection::run_forecast(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn break_even_vacancy(input_json: String) -> NapiResult<String> {
    let input: rental_finance_core::forecast::breakeven::BreakEvenInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_finance_core::forecast::breakeven::break_even_vacancy(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
