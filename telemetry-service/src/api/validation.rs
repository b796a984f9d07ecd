//! Shape checks for ingest payloads.
//!
//! Only the request shape is checked here. Values outside their expected physical
//! range (negative output, battery above 100%) are accepted as-is.

use energy_client::NewEnergyReading;
use serde_json::{Map, Value};

use super::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Extracts the three measurements, reporting every bad field at once.
pub fn parse_reading(payload: &Value) -> Result<NewEnergyReading, FieldErrors> {
    let Some(obj) = payload.as_object() else {
        let msg = format!("Invalid data. Expected a dictionary, but got {}.", json_kind(payload));
        return Err(FieldErrors::from([(NON_FIELD_ERRORS.to_string(), vec![msg])]));
    };

    let mut errors = FieldErrors::new();
    let mut field = |name: &str| match number_field(obj, name) {
        Ok(v) => Some(v),
        Err(msg) => {
            errors.insert(name.to_string(), vec![msg.to_string()]);
            None
        }
    };

    let solar_output = field("solar_output");
    let battery_level = field("battery_level");
    let diesel_usage = field("diesel_usage");

    match (solar_output, battery_level, diesel_usage) {
        (Some(solar_output), Some(battery_level), Some(diesel_usage)) => Ok(NewEnergyReading {
            solar_output,
            battery_level,
            diesel_usage,
        }),
        _ => Err(errors),
    }
}

/// Accepts JSON numbers and numeric strings; the result is always finite.
fn number_field(obj: &Map<String, Value>, name: &str) -> Result<f64, &'static str> {
    let value = match obj.get(name) {
        None => return Err(REQUIRED),
        Some(Value::Null) => return Err(NOT_NULL),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    value.filter(|v| v.is_finite()).ok_or(INVALID_NUMBER)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
