/// Parse a locale-formatted decimal string into a finite float.
///
/// A single comma decimal separator is accepted ("12,5" reads as 12.5).
/// Returns `None` for null, empty, unparseable or non-finite input; `None`
/// is the "missing" marker and is never conflated with zero.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::parse_number;

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_number(Some("12,5")), Some(12.5));
    }

    #[test]
    fn test_dot_decimal_and_whitespace() {
        assert_eq!(parse_number(Some(" 3.25 ")), Some(3.25));
        assert_eq!(parse_number(Some("-7")), Some(-7.0));
    }

    #[test]
    fn test_zero_is_not_missing() {
        assert_eq!(parse_number(Some("0")), Some(0.0));
        assert_eq!(parse_number(Some("0,0")), Some(0.0));
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(parse_number(None), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("   ")), None);
        assert_eq!(parse_number(Some("n/a")), None);
        assert_eq!(parse_number(Some("1,2,3")), None);
    }

    #[test]
    fn test_non_finite_is_missing() {
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("1e400")), None);
    }
}
