//! Serde helpers for request bodies and query strings.
//!
//! Empty strings are treated as absent, which matches how both HTML forms
//! and query strings encode "not given".

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize a string that may be explicitly cleared.
///
/// Use with `#[serde(default)]` so a missing field stays `None`:
/// - missing: `None`
/// - `null` or `""`: `Some(None)`
/// - a value: `Some(Some(value))`
pub fn deserialize_patch_string<'de, D>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(s.filter(|s| !s.trim().is_empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
        #[serde(default, deserialize_with = "deserialize_patch_string")]
        patch_field: Option<Option<String>>,
    }

    #[test]
    fn test_deserialize_optional_string_empty() {
        let json = r#"{"string_field": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_whitespace() {
        let json = r#"{"string_field": "   "}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_value() {
        let json = r#"{"string_field": "hello"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, Some("hello".to_string()));
    }

    #[test]
    fn test_deserialize_patch_string_missing() {
        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.patch_field, None);
    }

    #[test]
    fn test_deserialize_patch_string_null_clears() {
        let result: TestStruct = serde_json::from_str(r#"{"patch_field": null}"#).unwrap();
        assert_eq!(result.patch_field, Some(None));

        let result: TestStruct = serde_json::from_str(r#"{"patch_field": ""}"#).unwrap();
        assert_eq!(result.patch_field, Some(None));
    }

    #[test]
    fn test_deserialize_patch_string_value() {
        let result: TestStruct = serde_json::from_str(r#"{"patch_field": "x"}"#).unwrap();
        assert_eq!(result.patch_field, Some(Some("x".to_string())));
    }
}
