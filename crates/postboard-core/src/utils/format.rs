use chrono::{DateTime, NaiveDateTime};

/// Timestamp layouts the backend has been seen to send
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.naive_local()))
}

/// Format a backend timestamp as `YYYY-MM-DD HH:MM:SS`.
/// Unparseable input is returned unchanged; missing input becomes empty.
pub fn format_date(date: Option<&str>) -> String {
    match date {
        None => String::new(),
        Some(date) => parse_timestamp(date)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| date.to_string()),
    }
}

/// Same as `format_date` without seconds, used on detail pages
pub fn format_date_short(date: Option<&str>) -> String {
    match date {
        None => String::new(),
        Some(date) => parse_timestamp(date)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| date.to_string()),
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Drop control characters from server-supplied text before it reaches the
/// terminal. Newlines and tabs are kept.
pub fn sanitize_text(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-03-01T10:20:30")), "2024-03-01 10:20:30");
        assert_eq!(format_date(Some("2024-03-01T10:20:30.123456")), "2024-03-01 10:20:30");
        assert_eq!(format_date(Some("2024-03-01T10:20:30+00:00")), "2024-03-01 10:20:30");
        assert_eq!(format_date(Some("yesterday")), "yesterday");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_format_date_short() {
        assert_eq!(format_date_short(Some("2024-03-01T10:20:30")), "2024-03-01 10:20");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        // Multi-byte characters count once
        assert_eq!(truncate_string("안녕하세요 여러분", 5), "안녕...");
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("a\u{1b}[31mb\nc"), "a[31mb\nc");
    }
}
