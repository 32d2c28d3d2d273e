//! Pure text-to-value coercions
//!
//! Every function here is side-effect free. Failures are reported as
//! [`FieldError::Format`] so callers can decide whether a bad value
//! disqualifies a record or just leaves a field unset.

use regex::Regex;
use thiserror::Error;

/// Errors raised while coercing a raw field value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("'{value}' is not a valid {expected}")]
    Format {
        value: String,
        expected: &'static str,
    },
}

/// Result type for field coercions
pub type FieldResult<T> = Result<T, FieldError>;

/// Characters stripped from integer literals before parsing
const THOUSANDS_SEPARATORS: &[char] = &[','];

/// Strips leading and trailing whitespace
pub fn trim(text: &str) -> &str {
    text.trim()
}

/// Parses a base-10 integer, ignoring thousands separators
///
/// # Examples
///
/// ```
/// use listing_harvest::normalize::to_int;
///
/// assert_eq!(to_int("1,800").unwrap(), 1800);
/// assert!(to_int("12a").is_err());
/// ```
pub fn to_int(text: &str) -> FieldResult<i64> {
    let digits: String = text
        .chars()
        .filter(|c| !THOUSANDS_SEPARATORS.contains(c))
        .collect();

    digits.parse::<i64>().map_err(|_| FieldError::Format {
        value: text.to_string(),
        expected: "integer",
    })
}

/// Parses a double-precision float
pub fn to_float(text: &str) -> FieldResult<f64> {
    text.parse::<f64>().map_err(|_| FieldError::Format {
        value: text.to_string(),
        expected: "float",
    })
}

/// Returns the first capture group of the first match, if any
///
/// Patterns without a capture group fall back to the whole match.
pub fn extract_first<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    let captures = pattern.captures(text)?;
    captures.get(1).or_else(|| captures.get(0)).map(|m| m.as_str())
}

/// Keeps only the first of several collected values
///
/// When several DOM nodes yield a value for the same field, the first one in
/// document order wins and the rest are discarded without comparison.
pub fn take_first<T, I>(values: I) -> Option<T>
where
    I: IntoIterator<Item = T>,
{
    values.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim("  Hartford \n"), "Hartford");
        assert_eq!(trim(""), "");
    }

    #[test]
    fn test_to_int_with_separators() {
        assert_eq!(to_int("1,800"), Ok(1800));
        assert_eq!(to_int("10,500"), Ok(10500));
        assert_eq!(to_int("42"), Ok(42));
    }

    #[test]
    fn test_to_int_is_idempotent_on_rendered_value() {
        let first = to_int("1,234,567").unwrap();
        assert_eq!(to_int(&first.to_string()), Ok(first));
    }

    #[test]
    fn test_to_int_rejects_garbage() {
        assert!(matches!(
            to_int("abc"),
            Err(FieldError::Format {
                expected: "integer",
                ..
            })
        ));
        assert!(to_int("").is_err());
        assert!(to_int(",").is_err());
        assert!(to_int("2.5").is_err());
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float("41.76"), Ok(41.76));
        assert_eq!(to_float("-72.68"), Ok(-72.68));
        assert!(to_float("north").is_err());
    }

    #[test]
    fn test_extract_first_returns_capture() {
        let re = Regex::new(r"\$([\d,]+)").unwrap();
        assert_eq!(extract_first(&re, "$4,200/mo"), Some("4,200"));
        assert_eq!(extract_first(&re, "Contact for price"), None);
    }

    #[test]
    fn test_extract_first_only_first_match() {
        let re = Regex::new(r"(\d+)bd").unwrap();
        assert_eq!(extract_first(&re, "3bd or 4bd"), Some("3"));
    }

    #[test]
    fn test_take_first_discards_later_values() {
        assert_eq!(take_first(vec!["a", "b", "c"]), Some("a"));
        assert_eq!(take_first(Vec::<&str>::new()), None);
    }
}
