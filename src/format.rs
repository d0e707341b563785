//! Number formatting for axis labels, day totals, and the breakdown table.

/// Format a Y-axis value as a fixed 5-character string with K/M units.
///
/// The fixed width keeps every chart row's gutter aligned regardless of the
/// magnitude of the value printed in it.
pub fn format_axis_value(value: f64) -> String {
    if value >= 1_000_000.0 {
        let val_m = value / 1_000_000.0;
        if val_m >= 100.0 {
            format!("{:>3} M", val_m as u64)
        } else if val_m >= 10.0 {
            format!(" {:>2} M", val_m as u64)
        } else {
            format!("{:.1} M", val_m)
        }
    } else if value >= 1_000.0 {
        let val_k = value / 1_000.0;
        if val_k >= 100.0 {
            format!("{:>3} K", val_k as u64)
        } else if val_k >= 10.0 {
            format!(" {:>2} K", val_k as u64)
        } else {
            format!("{:.1} K", val_k)
        }
    } else {
        format!("{:>5}", value as u64)
    }
}

/// Format a day total with K/M/B units, variable width.
pub fn format_total_value(value: u64) -> String {
    if value >= 1_000_000_000 {
        scaled(value as f64 / 1_000_000_000.0, "B")
    } else if value >= 1_000_000 {
        scaled(value as f64 / 1_000_000.0, "M")
    } else if value >= 1_000 {
        scaled(value as f64 / 1_000.0, "K")
    } else {
        format!("{}", value)
    }
}

fn scaled(value: f64, suffix: &str) -> String {
    if value >= 100.0 {
        format!("{}{}", value as u64, suffix)
    } else if value >= 10.0 {
        format!("{:.1}{}", value, suffix)
    } else {
        format!("{:.2}{}", value, suffix)
    }
}

/// Format an integer with thousands separators for table output.
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_value_is_always_five_chars() {
        for value in [
            0.0,
            7.0,
            999.0,
            1_000.0,
            9_999.0,
            12_345.0,
            250_000.0,
            1_000_000.0,
            42_000_000.0,
            950_000_000.0,
        ] {
            assert_eq!(
                format_axis_value(value).chars().count(),
                5,
                "width of {:?} for input {}",
                format_axis_value(value),
                value
            );
        }
    }

    #[test]
    fn test_axis_value_tiers() {
        assert_eq!(format_axis_value(0.0), "    0");
        assert_eq!(format_axis_value(999.0), "  999");
        assert_eq!(format_axis_value(3_500.0), "3.5 K");
        assert_eq!(format_axis_value(42_000.0), " 42 K");
        assert_eq!(format_axis_value(250_000.0), "250 K");
        assert_eq!(format_axis_value(3_500_000.0), "3.5 M");
        assert_eq!(format_axis_value(42_000_000.0), " 42 M");
        assert_eq!(format_axis_value(250_000_000.0), "250 M");
    }

    #[test]
    fn test_total_value_tiers() {
        assert_eq!(format_total_value(999), "999");
        assert_eq!(format_total_value(12_345), "12.3K");
        assert_eq!(format_total_value(1_234_567), "1.23M");
        assert_eq!(format_total_value(123_456_789), "123M");
        assert_eq!(format_total_value(2_500_000_000), "2.50B");
        assert_eq!(format_total_value(45_000_000_000), "45.0B");
        assert_eq!(format_total_value(450_000_000_000), "450B");
    }

    #[test]
    fn test_number_separators() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
