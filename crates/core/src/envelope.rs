//! Uniform success/error envelope returned by mutating actions.

use serde::{Deserialize, Serialize};

/// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult<T = ()> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResult<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ActionResult<()> {
    /// Success with no payload.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ActionResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shape() {
        let json = serde_json::to_value(ActionResult::<()>::err("Invalid status")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Invalid status"}));
    }

    #[test]
    fn test_success_shape() {
        let json = serde_json::to_value(ActionResult::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 3}));
        let json = serde_json::to_value(ActionResult::done()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[test]
    fn test_from_result() {
        let r: Result<u8, String> = Err("Order not found".to_string());
        let envelope: ActionResult<u8> = r.into();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Order not found"));
    }
}
