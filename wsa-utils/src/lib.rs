//! Shared utility functions for watershed-atlas crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_iso(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

}

/// Number label functions
pub mod numbers {
    /// Format a class boundary for display with one decimal place.
    ///
    /// Negative zero is printed as "0.0".
    pub fn format_break(value: f64) -> String {
        let rounded = (value * 10.0).round() / 10.0;
        if rounded == 0.0 {
            return "0.0".to_string();
        }
        format!("{:.1}", rounded)
    }

    /// Label for a closed class interval, e.g. "1.0 – 2.5".
    pub fn range_label(lower: f64, upper: f64) -> String {
        format!("{} – {}", format_break(lower), format_break(upper))
    }

    /// Format a metric value for hover labels; absent values read "N/A".
    pub fn format_value(value: Option<f64>, unit: &str) -> String {
        match value {
            Some(v) if unit.is_empty() => format!("{:.2}", v),
            Some(v) => format!("{:.2} {}", v, unit),
            None => "N/A".to_string(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_format_break() {
            assert_eq!(format_break(12.345), "12.3");
            assert_eq!(format_break(-0.01), "0.0");
            assert_eq!(format_break(100.0), "100.0");
        }

        #[test]
        fn test_range_label() {
            assert_eq!(range_label(1.0, 2.54), "1.0 – 2.5");
        }

        #[test]
        fn test_format_value() {
            assert_eq!(format_value(Some(3.14159), "mm/month"), "3.14 mm/month");
            assert_eq!(format_value(Some(2.0), ""), "2.00");
            assert_eq!(format_value(None, "mm/month"), "N/A");
        }
    }
}
