//! Human-readable byte sizes.

const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// Format a byte count with base-1024 units.
///
/// The unit is chosen so the mantissa lies in `[1, 1024)`; the mantissa is
/// rounded to two decimals and trailing zeros are dropped.
///
/// ```ignore
/// humanize(0)    == "0 B"
/// humanize(1024) == "1 kB"
/// humanize(1536) == "1.5 kB"
/// ```
pub fn humanize(size: u64) -> String {
    if size == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// Two-decimal rendering without trailing zeros (`2.50` -> `2.5`, `2.00` -> `2`).
fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_reference_values() {
        assert_eq!(humanize(0), "0 B");
        assert_eq!(humanize(1), "1 B");
        assert_eq!(humanize(1023), "1023 B");
        assert_eq!(humanize(1024), "1 kB");
        assert_eq!(humanize(1536), "1.5 kB");
        assert_eq!(humanize(10 * 1024), "10 kB");
        assert_eq!(humanize(1024 * 1024), "1 MB");
        assert_eq!(humanize(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_humanize_rounds_to_two_decimals() {
        // 1234 / 1024 = 1.2050...
        assert_eq!(humanize(1234), "1.21 kB");
        // 1100 / 1024 = 1.0742...
        assert_eq!(humanize(1100), "1.07 kB");
    }

    #[test]
    fn test_humanize_caps_at_terabytes() {
        let pb = 1024u64.pow(5);
        assert_eq!(humanize(pb), "1024 TB");
    }

    #[test]
    fn test_mantissa_in_range() {
        for n in [1u64, 5, 999, 1024, 4096, 123_456, 9_999_999, 1 << 40] {
            let text = humanize(n);
            let mantissa: f64 = text.split(' ').next().unwrap().parse().unwrap();
            assert!((1.0..1024.0).contains(&mantissa) || text.ends_with("TB"), "{text}");
        }
    }
}
