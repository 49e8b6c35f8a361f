//! Number formatting for combat readouts.
//!
//! Everything the CLI prints about amounts, rates and durations goes through
//! here so the tables line up and round the same way.

/// Format an amount with K/M suffix for compact display.
///
/// - Values >= 1,000,000 are formatted as `X.XXM`
/// - Values >= 1,000 are formatted as `X.XXK`
/// - Values below 1,000 are formatted as-is
///
/// # Examples
/// ```
/// use limitbreak_types::formatting::format_compact;
/// assert_eq!(format_compact(500), "500");
/// assert_eq!(format_compact(1_500), "1.50K");
/// assert_eq!(format_compact(2_750_000), "2.75M");
/// ```
pub fn format_compact(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a per-second value (DPS/HPS) with K/M suffix.
///
/// Below 1,000 one decimal is kept, since low-rate windows are common early in a pull.
///
/// # Examples
/// ```
/// use limitbreak_types::formatting::format_per_second;
/// assert_eq!(format_per_second(812.46), "812.5");
/// assert_eq!(format_per_second(12_345.0), "12.35K");
/// ```
pub fn format_per_second(n: f64) -> String {
    let n_abs = n.abs();
    if n_abs >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n_abs >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.1}", n)
    }
}

/// Format an amount with thousands separators.
///
/// # Examples
/// ```
/// use limitbreak_types::formatting::format_thousands;
/// assert_eq!(format_thousands(0), "0");
/// assert_eq!(format_thousands(1_500_000), "1,500,000");
/// ```
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a percentage (already scaled to 0..=100) with 1 decimal place.
///
/// # Examples
/// ```
/// use limitbreak_types::formatting::format_rate;
/// assert_eq!(format_rate(33.333), "33.3%");
/// ```
pub fn format_rate(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Format elapsed seconds as `M:SS` (rounded).
///
/// # Examples
/// ```
/// use limitbreak_types::formatting::format_duration;
/// assert_eq!(format_duration(125.7), "2:06");
/// assert_eq!(format_duration(0.0), "0:00");
/// ```
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0), "0");
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(1_000), "1.00K");
        assert_eq!(format_compact(15_000), "15.00K");
        assert_eq!(format_compact(1_000_000), "1.00M");
    }

    #[test]
    fn test_format_per_second() {
        assert_eq!(format_per_second(0.0), "0.0");
        assert_eq!(format_per_second(1000.0 / 3.0), "333.3");
        assert_eq!(format_per_second(1_500.0), "1.50K");
        assert_eq!(format_per_second(2_000_000.0), "2.00M");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(7), "7");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(12_345), "12,345");
        assert_eq!(format_thousands(123_456_789), "123,456,789");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0.0%");
        assert_eq!(format_rate(25.0), "25.0%");
        assert_eq!(format_rate(100.0), "100.0%");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59.4), "0:59");
        assert_eq!(format_duration(60.0), "1:00");
        assert_eq!(format_duration(-3.0), "0:00");
    }
}
