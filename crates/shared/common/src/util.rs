//! Request/response helpers and value formatting.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

// Byte position of the date/time separator in an ISO-8601 date-time string.
const DATE_TIME_DELIMITER_INDEX: usize = 10;

/// Parse an ISO-8601 string into a [`NaiveDateTime`] normalized to UTC.
///
/// Aims for maximum flexibility: the input may be a date-time, a bare date
/// (midnight is assumed), or a date-time with a zone offset. Two
/// PostgreSQL-style tolerances are applied before parsing: a space separating
/// date and time is converted to `T`, and a bare two-digit offset such as
/// `+05` is expanded to `+05:00`.
pub fn datetime_from_iso8601(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let mut value = input.trim().to_string();

    if value.len() > DATE_TIME_DELIMITER_INDEX
        && value.as_bytes()[DATE_TIME_DELIMITER_INDEX] == b' '
    {
        value.replace_range(DATE_TIME_DELIMITER_INDEX..=DATE_TIME_DELIMITER_INDEX, "T");
    }

    // Only a string with a time component can end in an offset; a bare date
    // also ends in sign-digit-digit ("-02") and must not be touched.
    if value.contains('T') && has_two_digit_offset(&value) {
        value.push_str(":00");
    }

    if let Ok(datetime) = value.parse::<NaiveDateTime>() {
        return Ok(datetime);
    }
    if let Ok(date) = value.parse::<NaiveDate>() {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    DateTime::parse_from_rfc3339(&value).map(|zoned| zoned.naive_utc())
}

fn has_two_digit_offset(value: &str) -> bool {
    let bytes = value.as_bytes();
    let len = bytes.len();
    len > 3
        && (bytes[len - 3] == b'+' || bytes[len - 3] == b'-')
        && bytes[len - 2].is_ascii_digit()
        && bytes[len - 1].is_ascii_digit()
}

/// Convert a point-in-time in milliseconds since the Unix epoch to a
/// [`NaiveDateTime`] in UTC. Returns `None` for out-of-range inputs.
pub fn datetime_from_millis(milliseconds: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(milliseconds).map(|instant| instant.naive_utc())
}

/// Determine if the request carries an `application/json` body.
/// Media-type parameters such as `charset` are ignored.
pub fn is_json_request(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| media_type(value).eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Determine if a JSON response should be used for this request. Returns
/// true when the Accept header lists `application/json` and does not list
/// `text/html`.
///
/// Accept-params such as the relative quality factor ("q") are not regarded.
pub fn prefers_json_response(headers: &HeaderMap) -> bool {
    let accept = match headers.get(header::ACCEPT).and_then(|value| value.to_str().ok()) {
        Some(accept) => accept,
        None => return false,
    };

    let mut accepts_json = false;
    let mut accepts_html = false;
    for item in accept.split(',') {
        let mt = media_type(item);
        accepts_json |= mt.eq_ignore_ascii_case("application/json");
        accepts_html |= mt.eq_ignore_ascii_case("text/html");
    }
    accepts_json && !accepts_html
}

fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or("").trim()
}

/// Pretty-print a serializable value, recursively rendering sequences and
/// maps with four-space indentation. Driven entirely by the value's serde
/// field descriptors; intended for debug logging of entities.
pub fn dump<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(value) => {
            let mut out = String::new();
            dump_value(&value, 0, &mut out);
            out
        }
        Err(_) => "ERR".to_string(),
    }
}

fn dump_value(value: &serde_json::Value, level: usize, out: &mut String) {
    use serde_json::Value;

    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                push_indent(level + 1, out);
                dump_value(item, level + 1, out);
                if index + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(level, out);
            out.push(']');
        }
        Value::Object(fields) => {
            if fields.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (index, (key, item)) in fields.iter().enumerate() {
                push_indent(level + 1, out);
                out.push_str(key);
                out.push_str(": ");
                dump_value(item, level + 1, out);
                if index + 1 < fields.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(level, out);
            out.push('}');
        }
    }
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parses_plain_date_time() {
        let parsed = datetime_from_iso8601("2024-01-02T03:04:05").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap()
        );
    }

    #[test]
    fn space_separator_is_tolerated() {
        let spaced = datetime_from_iso8601("2024-01-02 03:04:05").unwrap();
        let standard = datetime_from_iso8601("2024-01-02T03:04:05").unwrap();
        assert_eq!(spaced, standard);
    }

    #[test]
    fn two_digit_offset_matches_full_offset() {
        let short = datetime_from_iso8601("2024-01-02 03:04:05+05").unwrap();
        let full = datetime_from_iso8601("2024-01-02T03:04:05+05:00").unwrap();
        assert_eq!(short, full);
        // Normalized to UTC: 03:04:05 at +05:00 is 22:04:05 the previous day.
        assert_eq!(short.hour(), 22);
    }

    #[test]
    fn bare_date_parses_to_midnight() {
        let parsed = datetime_from_iso8601("2024-01-02").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(datetime_from_iso8601("not a date").is_err());
    }

    #[test]
    fn millis_round_to_utc() {
        let parsed = datetime_from_millis(0).unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert!(datetime_from_millis(i64::MAX).is_none());
    }

    #[test]
    fn json_request_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json_request(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json_request(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        assert!(!is_json_request(&headers));
    }

    #[test]
    fn json_response_requires_json_without_html() {
        let mut headers = HeaderMap::new();
        assert!(!prefers_json_response(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(prefers_json_response(&headers));

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html, application/json"),
        );
        assert!(!prefers_json_response(&headers));

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json;q=0.9, application/xml"),
        );
        assert!(prefers_json_response(&headers));
    }

    #[derive(Serialize)]
    struct Sample {
        id: i32,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn dump_renders_nested_structure() {
        let sample = Sample {
            id: 7,
            name: "Jane".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        };

        let rendered = dump(&sample);
        assert!(rendered.contains("id: 7"));
        assert!(rendered.contains("name: \"Jane\""));
        assert!(rendered.contains("    \"a\","));
        assert!(rendered.starts_with('{'));
        assert!(rendered.ends_with('}'));
    }

    #[test]
    fn dump_renders_empty_collections_inline() {
        let empty: Vec<i32> = Vec::new();
        assert_eq!(dump(&empty), "[]");
    }
}
