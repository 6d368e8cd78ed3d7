//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::cache::{CallArgs, MAX_CALLEE_LENGTH};

/// Request body naming one memoized call (POST /keys, POST /invalidate)
///
/// # Fields
/// - `callee`: Identity of the wrapped operation
/// - `args`: Positional arguments, in call order
/// - `kwargs`: Keyword arguments
#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    pub callee: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl CallRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.callee.is_empty() {
            return Some("Callee cannot be empty".to_string());
        }
        if self.callee.len() > MAX_CALLEE_LENGTH {
            return Some(format!(
                "Callee exceeds maximum length of {} bytes",
                MAX_CALLEE_LENGTH
            ));
        }
        None
    }

    pub fn call_args(&self) -> CallArgs {
        CallArgs::from_values(self.args.clone(), self.kwargs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_request_defaults() {
        let req: CallRequest = serde_json::from_str(r#"{"callee": "get_forecast"}"#).unwrap();
        assert_eq!(req.callee, "get_forecast");
        assert!(req.args.is_empty());
        assert!(req.kwargs.is_empty());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_call_request_full() {
        let req: CallRequest = serde_json::from_str(
            r#"{"callee": "get_geo", "args": ["Moscow"], "kwargs": {"language": "ru-ru"}}"#,
        )
        .unwrap();
        let args = req.call_args();
        assert_eq!(args.args(), &[json!("Moscow")]);
        assert_eq!(args.kwargs().get("language"), Some(&json!("ru-ru")));
    }

    #[test]
    fn test_validate_empty_callee() {
        let req = CallRequest {
            callee: String::new(),
            args: vec![],
            kwargs: Map::new(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_callee() {
        let req = CallRequest {
            callee: "x".repeat(MAX_CALLEE_LENGTH + 1),
            args: vec![],
            kwargs: Map::new(),
        };
        assert!(req.validate().is_some());
    }
}
