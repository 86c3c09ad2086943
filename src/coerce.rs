/// Convert currency- or number-like text to a float.
///
/// Currency symbols, percent signs, thousands separators and surrounding
/// whitespace are stripped; `(1.00)` reads as a negative. Anything missing,
/// blank or unparseable is `0.0`, never an error. Vendor exports leave blank
/// cells for zero activity, so a genuinely malformed value is indistinguishable
/// from zero here.
pub fn coerce(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '%' | '€' | '£') && !c.is_whitespace())
        .collect();
    if s.is_empty() {
        return 0.0;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -finite(inner);
    }
    finite(&s)
}

fn finite(s: &str) -> f64 {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_symbols_and_commas() {
        assert_eq!(coerce(Some("$1,234.50")), 1234.5);
        assert_eq!(coerce(Some(" 2,000 ")), 2000.0);
        assert_eq!(coerce(Some("")), 0.0);
        assert_eq!(coerce(None), 0.0);
        assert_eq!(coerce(Some("bad")), 0.0);
    }

    #[test]
    fn test_coerce_negatives_and_percent() {
        assert_eq!(coerce(Some("(500.00)")), -500.0);
        assert_eq!(coerce(Some("-$50.00")), -50.0);
        assert_eq!(coerce(Some("6%")), 6.0);
        assert_eq!(coerce(Some("\"2,400.00\"")), 2400.0);
    }

    #[test]
    fn test_coerce_rejects_non_finite() {
        assert_eq!(coerce(Some("NaN")), 0.0);
        assert_eq!(coerce(Some("inf")), 0.0);
        assert_eq!(coerce(Some("   ")), 0.0);
    }
}
