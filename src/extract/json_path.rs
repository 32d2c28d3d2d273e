//! Optional-chaining lookups into untyped JSON
//!
//! Every step yields `None` on a missing key, a non-object parent, or an
//! explicit `null`, so deep navigation never panics and never reads a value
//! of the wrong shape.

use serde_json::Value;

/// Follows `path` through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
        .filter(|found| !found.is_null())
}

/// Follows `path` and requires a string leaf
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)?.as_str()
}

/// Follows `path` and requires an array leaf
pub fn lookup_array<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    lookup(value, path)?.as_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let v = json!({"a": {"b": {"c": 1}}});
        assert_eq!(lookup(&v, &["a", "b", "c"]), Some(&json!(1)));
    }

    #[test]
    fn test_lookup_empty_path_is_root() {
        let v = json!({"a": 1});
        assert_eq!(lookup(&v, &[]), Some(&v));
    }

    #[test]
    fn test_missing_segment() {
        let v = json!({"a": {"b": {}}});
        assert_eq!(lookup(&v, &["a", "b", "c"]), None);
        assert_eq!(lookup(&v, &["x", "b"]), None);
    }

    #[test]
    fn test_null_is_absent() {
        let v = json!({"geo": null, "a": {"b": null}});
        assert_eq!(lookup(&v, &["geo"]), None);
        assert_eq!(lookup(&v, &["a", "b", "c"]), None);
    }

    #[test]
    fn test_wrong_shape_is_absent() {
        let v = json!({"a": [1, 2], "s": "text"});
        assert_eq!(lookup(&v, &["a", "0"]), None);
        assert_eq!(lookup(&v, &["s", "len"]), None);
        assert_eq!(lookup_str(&v, &["a"]), None);
        assert_eq!(lookup_array(&v, &["s"]), None);
    }

    #[test]
    fn test_typed_leaves() {
        let v = json!({"u": {"small": "https://img.test/1.jpg"}, "homes": []});
        assert_eq!(lookup_str(&v, &["u", "small"]), Some("https://img.test/1.jpg"));
        assert_eq!(lookup_array(&v, &["homes"]).map(|a| a.len()), Some(0));
    }
}
