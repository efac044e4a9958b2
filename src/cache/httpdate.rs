//! HTTP-date formatting and parsing
//!
//! `Last-Modified` is the cache's only freshness record, so parsing accepts
//! every form RFC 9110 requires recipients to understand, while formatting
//! always produces the preferred IMF-fixdate form.

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate: `Sun, 06 Nov 1994 08:49:37 GMT`
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 form: `Sunday, 06-Nov-94 08:49:37 GMT`
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C asctime() form: `Sun Nov  6 08:49:37 1994`
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a timestamp for `If-Modified-Since`. Sub-second precision is dropped.
pub fn format(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP-date in any of the three accepted forms.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    // asctime pads single-digit days with a space
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rfc_example() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
    }

    #[test]
    fn format_imf_fixdate() {
        assert_eq!(format(rfc_example()), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn format_drops_subseconds() {
        let time = rfc_example() + chrono::Duration::milliseconds(750);
        assert_eq!(format(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn parse_all_forms() {
        assert_eq!(parse("Sun, 06 Nov 1994 08:49:37 GMT"), Some(rfc_example()));
        assert_eq!(parse("Sunday, 06-Nov-94 08:49:37 GMT"), Some(rfc_example()));
        assert_eq!(parse("Sun Nov  6 08:49:37 1994"), Some(rfc_example()));
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        assert_eq!(parse("  Sun, 06 Nov 1994 08:49:37 GMT "), Some(rfc_example()));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("1994-11-06T08:49:37Z"), None);
    }

    #[test]
    fn format_then_parse_is_stable() {
        let time = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(parse(&format(time)), Some(time));
    }
}
