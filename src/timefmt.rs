//! Time formatting helpers for timestamps and watch progress.

/// `HH:MM:SS` for a cue start given in milliseconds, rounded to the second.
pub fn format_timestamp_ms(ms: f64) -> String {
    let total = if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0).round() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// `h:mm:ss` when at least an hour remains, otherwise `m:ss`.
pub fn format_remaining_secs(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Parse `H:MM:SS` (or `MM:SS`, or `SS`) into seconds.
pub fn parse_clock(text: &str) -> Option<u64> {
    let parts: Vec<u64> = text
        .trim()
        .split(':')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<_>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    Some(parts.iter().fold(0, |acc, p| acc * 60 + p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp() {
        assert_eq!(format_timestamp_ms(0.0), "00:00:00");
        assert_eq!(format_timestamp_ms(1499.0), "00:00:01");
        assert_eq!(format_timestamp_ms(3_723_000.0), "01:02:03");
        assert_eq!(format_timestamp_ms(-5.0), "00:00:00");
    }

    #[test]
    fn test_remaining() {
        assert_eq!(format_remaining_secs(59.9), "0:59");
        assert_eq!(format_remaining_secs(754.0), "12:34");
        assert_eq!(format_remaining_secs(3_725.0), "1:02:05");
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("00:01:30"), Some(90));
        assert_eq!(parse_clock("1:02:03"), Some(3723));
        assert_eq!(parse_clock("45"), Some(45));
        assert_eq!(parse_clock("a:b"), None);
        assert_eq!(parse_clock("1:2:3:4"), None);
    }
}
