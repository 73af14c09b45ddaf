//! Time formatting for console reports

/// Format seconds as `m:ss`; minutes are not wrapped into hours
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format seconds as `12.3s (0.2 min)`
pub fn format_span(seconds: f64) -> String {
    format!("{:.1}s ({:.1} min)", seconds, seconds / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(5.9), "0:05");
        assert_eq!(format_clock(65.0), "1:05");
        assert_eq!(format_clock(3725.4), "62:05");
        assert_eq!(format_clock(-3.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(90.0), "90.0s (1.5 min)");
        assert_eq!(format_span(900.0), "900.0s (15.0 min)");
    }
}
