//! Conversion between stored text and typed setting values

use super::schema::Format;
use crate::contract::SettingValue;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

const EMAIL_PATTERN: &str =
    r"^[A-Z0-9_.%+\-']+@(?:[A-Z0-9\-]+\.)+(?:[A-Z]{2,4}|museum|travel)$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            RegexBuilder::new(EMAIL_PATTERN)
                .case_insensitive(true)
                .build()
                .ok()
        })
        .as_ref()
}

/// Typed value for a stored string.
///
/// Without a format the text is kept as is. Text that doesn't parse under the
/// format is kept as text too, so it fails validation on the next write.
pub fn coerce(stored: &str, format: Option<&Format>) -> SettingValue {
    match format {
        Some(Format::Integer) => stored
            .trim()
            .parse::<i64>()
            .map(SettingValue::Integer)
            .unwrap_or_else(|_| SettingValue::from(stored)),
        Some(Format::Float) => stored
            .trim()
            .parse::<f64>()
            .map(SettingValue::Float)
            .unwrap_or_else(|_| SettingValue::from(stored)),
        Some(Format::Boolean) => match stored {
            "true" | "t" => SettingValue::Boolean(true),
            "false" | "f" => SettingValue::Boolean(false),
            other => SettingValue::from(other),
        },
        _ => SettingValue::from(stored),
    }
}

/// Whether a typed value satisfies a format
pub fn conforms(value: &SettingValue, format: &Format) -> bool {
    match format {
        Format::String => matches!(value, SettingValue::Text(_)),
        Format::Integer => matches!(value, SettingValue::Integer(_)),
        Format::Float => matches!(value, SettingValue::Float(_) | SettingValue::Integer(_)),
        Format::Boolean => matches!(value, SettingValue::Boolean(_)),
        Format::Email => value.as_text().is_some_and(is_email),
        Format::Url => value.as_text().is_some_and(is_url),
        Format::Pattern(regex) => value.as_text().is_some_and(|s| regex.is_match(s)),
    }
}

pub fn is_email(value: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(value))
}

/// Absolute URL with a scheme
pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Short description of what a format expects, used in validation messages
pub fn describe(format: &Format) -> &'static str {
    match format {
        Format::String => "a String",
        Format::Integer => "an Integer",
        Format::Float => "a Float",
        Format::Boolean => "a Boolean",
        Format::Email => "an Email Address",
        Format::Url => "a URL",
        Format::Pattern(_) => "in the correct format",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce("25", Some(&Format::Integer)), SettingValue::Integer(25));
        assert_eq!(coerce(" -3 ", Some(&Format::Integer)), SettingValue::Integer(-3));
        assert_eq!(
            coerce("Ten", Some(&Format::Integer)),
            SettingValue::Text("Ten".to_string())
        );
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(coerce("10.0", Some(&Format::Float)), SettingValue::Float(10.0));
        assert_eq!(coerce("25", Some(&Format::Float)), SettingValue::Float(25.0));
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(coerce("true", Some(&Format::Boolean)), SettingValue::Boolean(true));
        assert_eq!(coerce("t", Some(&Format::Boolean)), SettingValue::Boolean(true));
        assert_eq!(coerce("false", Some(&Format::Boolean)), SettingValue::Boolean(false));
        assert_eq!(coerce("f", Some(&Format::Boolean)), SettingValue::Boolean(false));
        assert_eq!(
            coerce("yes", Some(&Format::Boolean)),
            SettingValue::Text("yes".to_string())
        );
    }

    #[test]
    fn test_coerce_without_format_keeps_text() {
        assert_eq!(coerce("25", None), SettingValue::Text("25".to_string()));
        assert_eq!(
            coerce("25", Some(&Format::String)),
            SettingValue::Text("25".to_string())
        );
    }

    #[test]
    fn test_storage_text_round_trips() {
        let cases = [
            (SettingValue::Integer(25), Format::Integer),
            (SettingValue::Float(10.0), Format::Float),
            (SettingValue::Float(0.25), Format::Float),
            (SettingValue::Boolean(false), Format::Boolean),
            (SettingValue::from("manual"), Format::String),
        ];

        for (value, format) in cases {
            let back = coerce(&value.to_storage(), Some(&format));
            assert_eq!(back, value, "format {}", format);
        }
    }

    #[test]
    fn test_conforms() {
        assert!(conforms(&SettingValue::from("x"), &Format::String));
        assert!(!conforms(&SettingValue::Integer(1), &Format::String));
        assert!(conforms(&SettingValue::Integer(1), &Format::Float));
        assert!(!conforms(&SettingValue::from("Ten Dollars"), &Format::Float));
        assert!(!conforms(&SettingValue::Float(1.5), &Format::Integer));
        assert!(!conforms(&SettingValue::from("yes"), &Format::Boolean));

        let sku = Format::Pattern(Regex::new(r"^[A-Z]{3}-\d+$").unwrap());
        assert!(conforms(&SettingValue::from("ABC-12"), &sku));
        assert!(!conforms(&SettingValue::from("abc"), &sku));
    }

    #[test]
    fn test_email_and_url() {
        assert!(is_email("someone@example.com"));
        assert!(is_email("First.Last+tag@mail.example.museum"));
        assert!(!is_email("someone@"));
        assert!(!is_email("not an email"));

        assert!(is_url("https://example.com/path?q=1"));
        assert!(is_url("ftp://files.example.com"));
        assert!(!is_url("example.com"));
        assert!(!is_url("not a url"));
    }
}
