pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Locate the first ledger-style array inside a result object: `lines` on a
/// schedule, `years` on a forecast, or `modified_schedule.lines` on a
/// prepayment scenario.
pub(crate) fn find_ledger<'a>(result: &'a Value) -> Option<(&'static str, &'a Vec<Value>)> {
    let map = result.as_object()?;
    if let Some(Value::Array(lines)) = map.get("lines") {
        return Some(("lines", lines));
    }
    if let Some(Value::Array(years)) = map.get("years") {
        return Some(("years", years));
    }
    if let Some(Value::Object(schedule)) = map.get("modified_schedule") {
        if let Some(Value::Array(lines)) = schedule.get("lines") {
            return Some(("modified_schedule.lines", lines));
        }
    }
    None
}
