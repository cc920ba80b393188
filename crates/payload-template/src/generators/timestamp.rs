//! Wall-clock timestamp generator.

use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Output format for `{{@now|FORMAT}}`.
///
/// Named formats are matched case-insensitively; anything else is kept as a
/// strftime pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    /// `02 Jan 06 15:04 UTC`
    Rfc822,
    /// `02 Jan 06 15:04 +0000`
    Rfc822Z,
    /// `Monday, 02-Jan-06 15:04:05 UTC`
    Rfc850,
    /// `Mon, 02 Jan 2006 15:04:05 UTC`
    Rfc1123,
    /// `Mon, 02 Jan 2006 15:04:05 +0000`
    Rfc1123Z,
    /// `2006-01-02T15:04:05Z`
    Rfc3339,
    /// `2006-01-02T15:04:05.999999999Z` with trailing zeros trimmed
    Rfc3339Nano,
    Unix,
    UnixMilli,
    UnixNano,
    /// `Mon Jan  2 15:04:05 2006`
    Ansic,
    /// `Mon Jan  2 15:04:05 UTC 2006`
    UnixDate,
    /// `Mon Jan 02 15:04:05 +0000 2006`
    RubyDate,
    Custom(String),
}

impl TimeFormat {
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "RFC822" => TimeFormat::Rfc822,
            "RFC822Z" => TimeFormat::Rfc822Z,
            "RFC850" => TimeFormat::Rfc850,
            "RFC1123" => TimeFormat::Rfc1123,
            "RFC1123Z" => TimeFormat::Rfc1123Z,
            "RFC3339" => TimeFormat::Rfc3339,
            "RFC3339NANO" => TimeFormat::Rfc3339Nano,
            "UNIX" => TimeFormat::Unix,
            "UNIXMILLI" => TimeFormat::UnixMilli,
            "UNIXNANO" => TimeFormat::UnixNano,
            "ANSIC" => TimeFormat::Ansic,
            "UNIXDATE" => TimeFormat::UnixDate,
            "RUBYDATE" => TimeFormat::RubyDate,
            _ => TimeFormat::Custom(name.to_string()),
        }
    }

    /// Render `time` in this format.
    pub fn format(&self, time: &DateTime<Utc>) -> String {
        match self {
            TimeFormat::Rfc822 => time.format("%d %b %y %H:%M %Z").to_string(),
            TimeFormat::Rfc822Z => time.format("%d %b %y %H:%M %z").to_string(),
            TimeFormat::Rfc850 => time.format("%A, %d-%b-%y %H:%M:%S %Z").to_string(),
            TimeFormat::Rfc1123 => time.format("%a, %d %b %Y %H:%M:%S %Z").to_string(),
            TimeFormat::Rfc1123Z => time.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
            TimeFormat::Rfc3339 => time.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            TimeFormat::Rfc3339Nano => {
                let mut out = time.format("%Y-%m-%dT%H:%M:%S").to_string();
                let fraction = format!("{:09}", time.timestamp_subsec_nanos());
                let fraction = fraction.trim_end_matches('0');
                if !fraction.is_empty() {
                    out.push('.');
                    out.push_str(fraction);
                }
                out.push('Z');
                out
            }
            TimeFormat::Unix => time.timestamp().to_string(),
            TimeFormat::UnixMilli => time.timestamp_millis().to_string(),
            TimeFormat::UnixNano => {
                let nanos = i128::from(time.timestamp()) * 1_000_000_000
                    + i128::from(time.timestamp_subsec_nanos());
                nanos.to_string()
            }
            TimeFormat::Ansic => time.format("%a %b %e %H:%M:%S %Y").to_string(),
            TimeFormat::UnixDate => time.format("%a %b %e %H:%M:%S %Z %Y").to_string(),
            TimeFormat::RubyDate => time.format("%a %b %d %H:%M:%S %z %Y").to_string(),
            TimeFormat::Custom(pattern) => {
                // Invalid strftime patterns make the formatter fail; fall back to
                // the pattern text instead of panicking.
                let mut out = String::new();
                match write!(out, "{}", time.format(pattern)) {
                    Ok(()) => out,
                    Err(_) => pattern.clone(),
                }
            }
        }
    }
}

/// Format the current UTC time.
pub fn generate_now(format: &TimeFormat) -> String {
    format.format(&Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()
    }

    fn sample_with_nanos(nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(sample().timestamp(), nanos).unwrap()
    }

    #[test]
    fn test_named_formats() {
        let t = sample();
        let cases = [
            ("RFC822", "02 Jan 06 15:04 UTC"),
            ("RFC822Z", "02 Jan 06 15:04 +0000"),
            ("RFC850", "Monday, 02-Jan-06 15:04:05 UTC"),
            ("RFC1123", "Mon, 02 Jan 2006 15:04:05 UTC"),
            ("RFC1123Z", "Mon, 02 Jan 2006 15:04:05 +0000"),
            ("RFC3339", "2006-01-02T15:04:05Z"),
            ("RFC3339Nano", "2006-01-02T15:04:05Z"),
            ("Unix", "1136214245"),
            ("UnixMilli", "1136214245000"),
            ("UnixNano", "1136214245000000000"),
            ("ANSIC", "Mon Jan  2 15:04:05 2006"),
            ("UnixDate", "Mon Jan  2 15:04:05 UTC 2006"),
            ("RubyDate", "Mon Jan 02 15:04:05 +0000 2006"),
        ];

        for (name, expected) in cases {
            assert_eq!(TimeFormat::parse(name).format(&t), expected, "format {name}");
        }
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!(TimeFormat::parse("unixmilli"), TimeFormat::UnixMilli);
        assert_eq!(TimeFormat::parse("rfc3339nano"), TimeFormat::Rfc3339Nano);
    }

    #[test]
    fn test_rfc3339_nano_trims_zeros() {
        assert_eq!(
            TimeFormat::Rfc3339Nano.format(&sample_with_nanos(123_400_000)),
            "2006-01-02T15:04:05.1234Z"
        );
        assert_eq!(
            TimeFormat::Rfc3339Nano.format(&sample_with_nanos(999_999_999)),
            "2006-01-02T15:04:05.999999999Z"
        );
        assert_eq!(
            TimeFormat::UnixNano.format(&sample_with_nanos(5)),
            "1136214245000000005"
        );
    }

    #[test]
    fn test_custom_format() {
        let t = sample();
        assert_eq!(TimeFormat::parse("%Y/%m/%d").format(&t), "2006/01/02");
        // No specifiers: the text is emitted as-is.
        assert_eq!(TimeFormat::parse("today").format(&t), "today");
    }

    #[test]
    fn test_invalid_custom_format_does_not_panic() {
        let t = sample();
        assert_eq!(TimeFormat::parse("%Q%").format(&t), "%Q%");
    }

    #[test]
    fn test_generate_now_unix_milli() {
        let before = Utc::now().timestamp_millis();
        let value: i64 = generate_now(&TimeFormat::UnixMilli).parse().unwrap();
        let after = Utc::now().timestamp_millis();
        assert!(before <= value && value <= after);
    }
}
