//! Identifier generation and value checks shared by every builder.

use crate::error::{TypeError, TypeResult};

/// A fresh random UUID in hyphenated form.
pub fn uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A fresh random UUID prefixed with `_`, usable as an XML `ID`.
pub fn underscore_uuid() -> String {
    format!("_{}", uuid::Uuid::new_v4())
}

/// Whether every character is printable US-ASCII or ASCII whitespace.
pub fn is_printable_us_ascii(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
}

pub fn validate_printable_ascii(field: &'static str, value: &str) -> TypeResult<()> {
    if is_printable_us_ascii(value) {
        Ok(())
    } else {
        Err(TypeError::NotPrintableAscii {
            field,
            value: value.to_string(),
        })
    }
}

pub fn require_non_empty(field: &'static str, value: &str) -> TypeResult<()> {
    if value.is_empty() {
        Err(TypeError::EmptyValue { field })
    } else {
        Ok(())
    }
}

/// Both halves of a mutually dependent pair are given, or neither.
pub fn require_pair(
    first: (&'static str, Option<&str>),
    second: (&'static str, Option<&str>),
) -> TypeResult<()> {
    match (first.1, second.1) {
        (Some(_), None) => Err(TypeError::MissingPair {
            given: first.0,
            missing: second.0,
        }),
        (None, Some(_)) => Err(TypeError::MissingPair {
            given: second.0,
            missing: first.0,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn underscore_uuid_is_a_valid_xml_id() {
        let id = underscore_uuid();
        assert!(id.starts_with('_'));
        assert_eq!(id.len(), 37);
        assert_ne!(id, underscore_uuid());
    }

    #[test]
    fn printable_ascii_accepts_whitespace() {
        assert!(is_printable_us_ascii("abc DEF\t123\n~"));
        assert!(!is_printable_us_ascii("äöå"));
        assert!(!is_printable_us_ascii("bell\x07"));
    }

    #[test]
    fn non_printable_value_is_reported() {
        let err = validate_printable_ascii("package_id", "ö").unwrap_err();
        assert_eq!(
            err,
            TypeError::NotPrintableAscii {
                field: "package_id",
                value: "ö".into()
            }
        );
    }

    #[test]
    fn pair_must_be_complete() {
        assert!(require_pair(("pid", Some("x")), ("pid_type", Some("y"))).is_ok());
        assert!(require_pair(("pid", None), ("pid_type", None)).is_ok());
        assert_eq!(
            require_pair(("pid", None), ("pid_type", Some("URN"))).unwrap_err(),
            TypeError::MissingPair {
                given: "pid_type",
                missing: "pid"
            }
        );
    }

    #[test]
    fn empty_is_rejected() {
        assert!(require_non_empty("file_format", "").is_err());
        assert!(require_non_empty("file_format", "text/plain").is_ok());
    }

    proptest! {
        #[test]
        fn graphic_ascii_is_always_printable(s in "[ -~]*") {
            prop_assert!(is_printable_us_ascii(&s));
        }

        #[test]
        fn any_non_ascii_char_is_rejected(prefix in "[a-z]*", c in "[^\\x00-\\x7f]") {
            let value = format!("{prefix}{c}");
            prop_assert!(!is_printable_us_ascii(&value));
        }
    }
}
