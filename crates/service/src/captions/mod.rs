//! Caption domain: boundary schema for writes and caption normalization.

pub mod store;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::ServiceError;

pub use store::CaptionStore;

/// Longest caption kept, counted in characters after trimming.
pub const MAX_CAPTION_CHARS: usize = 2000;

pub const INVALID_KEY_MESSAGE: &str = "key must be a non-empty string";

/// Untyped request body; both fields accept any JSON so shape checks
/// happen in one place in [`SetCaption::from_json`].
#[derive(Debug, Deserialize)]
struct SetCaptionBody {
    #[serde(default)]
    key: Value,
    #[serde(default)]
    caption: Value,
}

/// A validated write: trimmed non-empty key, normalized caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCaption {
    pub key: String,
    pub caption: String,
}

impl SetCaption {
    /// Validate a raw JSON body.
    ///
    /// `key` must be a string that is non-empty once trimmed. `caption` is
    /// optional; anything that is not a string becomes `""`.
    pub fn from_json(body: Value) -> Result<Self, ServiceError> {
        if !body.is_object() {
            return Err(ServiceError::validation(INVALID_KEY_MESSAGE));
        }
        let body: SetCaptionBody = serde_json::from_value(body)
            .map_err(|_| ServiceError::validation(INVALID_KEY_MESSAGE))?;

        let key = match body.key {
            Value::String(s) => s.trim().to_string(),
            _ => String::new(),
        };
        if key.is_empty() {
            return Err(ServiceError::validation(INVALID_KEY_MESSAGE));
        }

        Ok(Self { key, caption: normalize_caption(&body.caption) })
    }
}

/// Trim and clamp a caption to [`MAX_CAPTION_CHARS`]; non-strings map to `""`.
pub fn normalize_caption(raw: &Value) -> String {
    match raw {
        Value::String(s) => truncate_chars(s.trim(), MAX_CAPTION_CHARS).to_string(),
        _ => String::new(),
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_and_caption_are_trimmed() {
        let input = SetCaption::from_json(json!({"key": "  IMG_01.jpg ", "caption": "  sunset  "})).unwrap();
        assert_eq!(input, SetCaption { key: "IMG_01.jpg".into(), caption: "sunset".into() });
    }

    #[test]
    fn invalid_keys_are_rejected() {
        for body in [
            json!({"key": "   "}),
            json!({"key": ""}),
            json!({"key": 123}),
            json!({"key": null, "caption": "x"}),
            json!({"caption": "x"}),
            json!({}),
            json!(["key"]),
            json!("key"),
        ] {
            let err = SetCaption::from_json(body.clone()).unwrap_err();
            assert!(err.is_validation(), "body {body}");
        }
    }

    #[test]
    fn non_string_caption_becomes_empty() {
        for caption in [json!(null), json!(5), json!(true), json!({"a": 1}), json!(["x"])] {
            let input = SetCaption::from_json(json!({"key": "k", "caption": caption})).unwrap();
            assert_eq!(input.caption, "");
        }
        let input = SetCaption::from_json(json!({"key": "k"})).unwrap();
        assert_eq!(input.caption, "");
    }

    #[test]
    fn long_caption_is_clamped_after_trimming() {
        let raw = format!("   {}{}", "a".repeat(1999), "b".repeat(501));
        let out = normalize_caption(&Value::String(raw));
        assert_eq!(out.chars().count(), MAX_CAPTION_CHARS);
        assert!(out.starts_with('a'));
        assert!(out.ends_with('b'));
    }

    #[test]
    fn clamp_counts_characters_not_bytes() {
        let raw = "é".repeat(2500);
        let out = normalize_caption(&Value::String(raw));
        assert_eq!(out.chars().count(), MAX_CAPTION_CHARS);
        assert_eq!(out.len(), MAX_CAPTION_CHARS * 2);

        let short = normalize_caption(&json!("ünïcödé"));
        assert_eq!(short, "ünïcödé");
    }
}
