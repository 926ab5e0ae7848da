use serde_json::Value;

pub const NOOP_ACTION: i64 = 0;

/// Result of reading a raw `step` action.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedAction {
    /// The value encodes a whole number.
    Accepted(i64),
    /// The value could not be read as a whole number and was replaced by the
    /// no-op action.
    Coerced { raw: Value },
}

impl NormalizedAction {
    pub fn action(&self) -> i64 {
        match self {
            Self::Accepted(action) => *action,
            Self::Coerced { .. } => NOOP_ACTION,
        }
    }

    pub fn is_coerced(&self) -> bool {
        matches!(self, Self::Coerced { .. })
    }
}

/// Accepts integers, whole floats and numeric strings such as `"2"` or
/// `"2.0"`. Anything else maps to the no-op action.
pub fn normalize_action(raw: &Value) -> NormalizedAction {
    let whole = match raw {
        Value::Number(number) => match number.as_i64() {
            Some(exact) => Some(exact),
            None => number.as_f64().and_then(whole_number),
        },
        Value::String(text) => text.trim().parse::<f64>().ok().and_then(whole_number),
        _ => None,
    };

    match whole {
        Some(action) => NormalizedAction::Accepted(action),
        None => NormalizedAction::Coerced { raw: raw.clone() },
    }
}

// i64::MAX is not representable as f64; the bound below is 2^63.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn whole_number(value: f64) -> Option<i64> {
    if !value.is_finite() || value != value.trunc() {
        return None;
    }
    if value < i64::MIN as f64 || value >= I64_UPPER_BOUND {
        return None;
    }
    Some(value as i64)
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
