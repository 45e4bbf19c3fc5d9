//! Recovers structured values from model responses that are supposed to be
//! JSON but may arrive wrapped in markdown fences or prose.

use crate::core::error::ResponseParseError;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Removes every fence marker, wherever it appears, and trims.
pub fn strip_code_blocks(s: &str) -> String {
    s.replace("```json", "").replace("```", "").trim().to_string()
}

/// First `{` through last `}` of the raw text.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn normalize_json(text: &str) -> Result<Value, ResponseParseError> {
    let cleaned = strip_code_blocks(text);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    debug!("Direct JSON parse failed, scanning for an embedded object");
    if let Some(block) = embedded_object(text) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            return Ok(value);
        }
    }

    Err(ResponseParseError::new(text))
}

/// Normalizes and then maps onto `T`. Missing fields are left to `T`'s serde
/// defaults; a shape mismatch is a parse failure.
pub fn parse_as<T: DeserializeOwned>(text: &str) -> Result<T, ResponseParseError> {
    let value = normalize_json(text)?;
    serde_json::from_value(value).map_err(|e| {
        debug!("Recovered JSON does not match expected shape: {}", e);
        ResponseParseError::new(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PARSE_FAILURE_MESSAGE;
    use serde_json::json;

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("json"), "json");
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  ```json  \n  {}  \n  ```  "), "{}");
    }

    #[test]
    fn test_fenced_equals_unwrapped() {
        let raw = r#"{"title": "كنز", "scenes": [{"title": "1"}, {"title": "2"}]}"#;
        let fenced = format!("```json\n{}\n```", raw);

        assert_eq!(normalize_json(&fenced).unwrap(), normalize_json(raw).unwrap());
        assert_eq!(normalize_json(raw).unwrap()["scenes"][1]["title"], "2");
    }

    #[test]
    fn test_embedded_object_in_prose() {
        let text = "Sure! Here is your story:\n{\"title\": \"Brave\", \"n\": 2}\nEnjoy reading.";
        assert_eq!(normalize_json(text).unwrap(), json!({"title": "Brave", "n": 2}));
    }

    #[test]
    fn test_no_object_fails_with_localized_message() {
        let err = normalize_json("I could not write that story, sorry.").unwrap_err();
        assert_eq!(err.message, PARSE_FAILURE_MESSAGE);
        assert!(err.to_string().starts_with(PARSE_FAILURE_MESSAGE));
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(normalize_json("prefix } then { never closed").is_err());
        assert!(normalize_json("{ \"a\": 1, ").is_err());
    }

    #[test]
    fn test_parse_as_shape_mismatch_is_parse_error() {
        #[derive(serde::Deserialize, Debug)]
        struct Shape {
            #[allow(dead_code)]
            scenes: Vec<String>,
        }
        assert!(parse_as::<Shape>(r#"{"scenes": 5}"#).is_err());
        assert!(parse_as::<Shape>(r#"{"scenes": ["a"]}"#).is_ok());
    }
}
