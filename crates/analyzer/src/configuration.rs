//! Validated reads from the free-form service configuration map
//!
//! Missing or null keys fall back to the caller's default. Present keys of
//! the wrong shape are rejected with `InvalidInput`; nothing is coerced.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::str::FromStr;

use crate::error::{CostError, CostResult};
use crate::models::Configuration;

/// Parse a JSON number into a `Decimal` without going through binary floats
pub fn decimal_from_number(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parse a JSON number or numeric string into a `Decimal`
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => decimal_from_number(n),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

/// Read-only view over one service's configuration
pub struct ConfigReader<'a> {
    service: &'a str,
    config: &'a Configuration,
}

impl<'a> ConfigReader<'a> {
    pub fn new(service: &'a str, config: &'a Configuration) -> Self {
        Self { service, config }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    fn invalid(&self, key: &str, expected: &str, value: &Value) -> CostError {
        CostError::invalid_input(format!(
            "{}: configuration field '{}' must be {}, got {}",
            self.service, key, expected, value
        ))
    }

    /// Non-negative whole count, e.g. `instances`
    pub fn count(&self, key: &str, default: u64) -> CostResult<u64> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        let parsed = decimal_from_value(value)
            .filter(|d| !d.is_sign_negative() && d.fract().is_zero())
            .and_then(|d| d.to_u64());

        parsed.ok_or_else(|| self.invalid(key, "a non-negative integer", value))
    }

    /// Non-negative number, e.g. `memory` or `avg_duration_ms`
    pub fn number(&self, key: &str, default: Decimal) -> CostResult<Decimal> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        decimal_from_value(value)
            .filter(|d| !d.is_sign_negative())
            .ok_or_else(|| self.invalid(key, "a non-negative number", value))
    }

    /// Storage quantity in GB, from a number or a string such as `"100 GB"`
    pub fn quantity_gb(&self, key: &str, default: Decimal) -> CostResult<Decimal> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Number(n) => decimal_from_number(n),
            Value::String(s) => parse_quantity_gb(s),
            _ => None,
        };

        parsed
            .filter(|d| !d.is_sign_negative())
            .ok_or_else(|| self.invalid(key, "a storage quantity such as \"100 GB\"", value))
    }

    /// Boolean flag, accepting `true`/`false` and their string forms
    pub fn flag(&self, key: &str, default: bool) -> CostResult<bool> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(self.invalid(key, "a boolean", value)),
        }
    }

    /// Optional string field
    pub fn text(&self, key: &str) -> CostResult<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(value) => Err(self.invalid(key, "a string", value)),
        }
    }
}

/// Parse `"100 GB"`, `"1.5TB"`, `"512 MiB"` or a bare number into GB
fn parse_quantity_gb(input: &str) -> Option<Decimal> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let amount = Decimal::from_str(number).ok()?;

    let factor = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "gb" | "gib" => Decimal::ONE,
        "tb" | "tib" => Decimal::from(1024),
        "mb" | "mib" => Decimal::ONE / Decimal::from(1024),
        _ => return None,
    };
    amount.checked_mul(factor)
}
