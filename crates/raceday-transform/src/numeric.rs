use serde_json::Value;

/// Coerces a JSON value to a finite `f64`. Strings that parse to a finite
/// number are accepted; everything else (missing, non-numeric string,
/// `NaN`/`Infinity`) yields `None` per §4.2 "Numeric coercion".
pub fn coerce_number(v: Option<&Value>) -> Option<f64> {
    let v = v?;
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Converts a dollar amount to integer cents. Upstream money amounts are
/// assumed to be in dollars unless already integral cents (the money
/// tracker's `*_amount` fields are dollars; pool totals sometimes arrive as
/// already-integer cents, in which case callers should skip this call).
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_string_coerces() {
        assert_eq!(coerce_number(Some(&json!("12.5"))), Some(12.5));
    }

    #[test]
    fn non_numeric_string_is_none() {
        assert_eq!(coerce_number(Some(&json!("scratched"))), None);
    }

    #[test]
    fn missing_value_is_none() {
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn number_passes_through() {
        assert_eq!(coerce_number(Some(&json!(3.25))), Some(3.25));
    }

    #[test]
    fn dollars_convert_to_cents_with_rounding() {
        assert_eq!(dollars_to_cents(5.005), 501);
        assert_eq!(dollars_to_cents(5.0), 500);
    }
}
