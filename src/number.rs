//! Numeric collaborator: canonical number formatting and result-slot
//! stores. The rest of the language's Number built-in lives elsewhere.

use crate::types::Value;

/// §6.1.6.1.20 Number::toString — shortest round-trip representation.
pub fn to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(x).to_string()
}

/// Store a numeric value into a result slot.
pub fn set_number(slot: &mut Value, value: f64) {
    *slot = Value::Number(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_values() {
        assert_eq!(to_string(f64::NAN), "NaN");
        assert_eq!(to_string(0.0), "0");
        assert_eq!(to_string(-0.0), "0");
        assert_eq!(to_string(f64::INFINITY), "Infinity");
        assert_eq!(to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn integers_have_no_fraction() {
        assert_eq!(to_string(3.0), "3");
        assert_eq!(to_string(-17.0), "-17");
        assert_eq!(to_string(0.5), "0.5");
    }

    #[test]
    fn set_number_overwrites_slot() {
        let mut slot = Value::Undefined;
        set_number(&mut slot, 7.0);
        assert!(matches!(slot, Value::Number(n) if n == 7.0));
    }
}
