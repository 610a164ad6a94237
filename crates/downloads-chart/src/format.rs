//! Label formatting for axes and legends.

use chrono::NaiveDate;

/// Compact number label: `1.2M`, `35K`, or the plain value below a thousand.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", (value / 100_000.0).round() / 10.0)
    } else if value >= 1000.0 {
        format!("{}K", (value / 1000.0).round())
    } else {
        format!("{value}")
    }
}

/// Short axis date label such as `Jan 7`.
#[must_use]
pub fn format_axis_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Escapes text for use inside SVG markup.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(33.3), "33.3");
        assert_eq!(format_number(1000.0), "1K");
        assert_eq!(format_number(12_500.0), "13K");
        assert_eq!(format_number(1_000_000.0), "1.0M");
        assert_eq!(format_number(2_345_678.0), "2.3M");
    }

    #[test]
    fn test_format_axis_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(format_axis_date(date), "Jan 7");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
        assert_eq!(escape_xml("@scope/pkg"), "@scope/pkg");
    }
}
