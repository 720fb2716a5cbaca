//! Output formats for command results.
//!
//! Text output is written by each command; JSON and YAML serialize the
//! command's data directly.

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

/// How a command prints its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl OutputMode {
    /// Returns true for the modes that serialize data instead of rendering text.
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Yaml)
    }
}

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Not a structured output mode")]
    NotStructured,
}

/// Serializes data to the specified structured format.
///
/// Returns an error if the output mode is not a structured mode.
pub fn serialize_structured<T: Serialize>(
    data: &T,
    mode: OutputMode,
) -> Result<String, SerializeError> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputMode::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputMode::Text => Err(SerializeError::NotStructured),
    }
}

/// Renders `data` in `mode`, using `text` for [`OutputMode::Text`].
pub fn render<T, F>(data: &T, mode: OutputMode, text: F) -> Result<String, SerializeError>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if mode.is_structured() {
        serialize_structured(data, mode)
    } else {
        Ok(text(data))
    }
}

/// Plain-text cell for a JSON value: strings unquoted, null blank.
pub fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_mode_is_not_structured() {
        assert!(!OutputMode::Text.is_structured());
        assert!(OutputMode::Json.is_structured());
        assert!(matches!(
            serialize_structured(&json!({}), OutputMode::Text),
            Err(SerializeError::NotStructured)
        ));
    }

    #[test]
    fn yaml_output() {
        let out = serialize_structured(&json!({"valid": true}), OutputMode::Yaml).unwrap();
        assert_eq!(out, "valid: true\n");
    }

    #[test]
    fn render_uses_text_closure_only_for_text() {
        let data = json!({"n": 1});
        assert_eq!(render(&data, OutputMode::Text, |_| "one".into()).unwrap(), "one");
        assert_eq!(
            render(&data, OutputMode::Json, |_| "one".into()).unwrap(),
            "{\n  \"n\": 1\n}"
        );
    }

    #[test]
    fn cells() {
        assert_eq!(cell(&json!("a")), "a");
        assert_eq!(cell(&json!(null)), "");
        assert_eq!(cell(&json!([1, 2])), "[1,2]");
    }
}
