//! Host ↔ nvp protocol definitions.
//!
//! Protocol version 1. The host writes one JSON `RequestFrame` per line on
//! the server's stdin and reads one `ResponseFrame` per line from its
//! stdout. One-shot commands run with `--json` print a single
//! `ResponseFrame` in the same shape.

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024; // session blobs ride along

// ── Methods ──────────────────────────────────────────────────────────────────

pub mod methods {
    pub const NEW_PROJECT: &str = "new-project";
    pub const OPEN_PROJECT: &str = "open-project";
    pub const GET_ROOT: &str = "get-root";
    pub const ADD_PATH: &str = "add-path";
    pub const REMOVE_PATH: &str = "remove-path";
    pub const LIST_PATHS: &str = "list-paths";
    pub const GENERATE_TAGS: &str = "generate-tags";
    pub const SEARCH: &str = "search";
    pub const VCS: &str = "vcs";
    pub const SAVE_SESSION: &str = "save-session";
    pub const RESTORE_SESSION: &str = "restore-session";
    pub const COMPLETE: &str = "complete";
    pub const VERSION: &str = "version";
}

// ── Error codes ──────────────────────────────────────────────────────────────

pub mod error_codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const DIRECTORY_NOT_FOUND: &str = "DIRECTORY_NOT_FOUND";
    pub const FORMAT_ERROR: &str = "FORMAT_ERROR";
    pub const NO_ACTIVE_PROJECT: &str = "NO_ACTIVE_PROJECT";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const TOOL_FAILED: &str = "TOOL_FAILED";
}

// ── Error shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
}

impl ErrorShape {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// Host → nvp request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFrame {
    #[serde(default)]
    pub id: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// nvp → host response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl ResponseFrame {
    pub fn ok(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn err(id: impl Into<String>, error: ErrorShape) -> Self {
        Self {
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(error),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn request_without_id_or_params() {
        let req: RequestFrame = serde_json::from_str(r#"{"method":"get-root"}"#).unwrap();
        assert_eq!(req.id, "");
        assert_eq!(req.method, methods::GET_ROOT);
        assert!(req.params.is_none());
    }

    #[test]
    fn ok_response_omits_error() {
        let frame = ResponseFrame::ok("7", json!({"root": "/tmp/proj"}));
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, json!({"id": "7", "ok": true, "payload": {"root": "/tmp/proj"}}));
    }

    #[test]
    fn err_response_carries_code() {
        let frame = ResponseFrame::err(
            "8",
            ErrorShape::new(error_codes::NO_ACTIVE_PROJECT, "no project is open"),
        );
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error"]["code"], json!("NO_ACTIVE_PROJECT"));
        assert!(value.get("payload").is_none());
    }
}
