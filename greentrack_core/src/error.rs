//! Error types for the greentrack_core library.

use std::collections::BTreeMap;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Resolved shape of a backend error body.
///
/// The backend returns errors in several shapes depending on the view that
/// produced them. The request client resolves the body into this union once
/// so callers never have to re-inspect raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// A single `detail` or `error` string
    Detail(String),
    /// Per-field validation messages, keyed by field name
    Fields(BTreeMap<String, Vec<String>>),
    /// Anything else (the raw body is kept for inspection)
    Unknown(serde_json::Value),
}

impl ErrorBody {
    /// Resolve a non-2xx JSON body into a display message and its shape.
    ///
    /// Extraction order:
    /// 1. a string-valued `detail` or `error` field
    /// 2. all array-of-string and string-valued fields, joined with `". "`
    /// 3. fallback `"HTTP <status>: <reason>"`
    pub fn resolve(status: u16, reason: &str, value: &serde_json::Value) -> (String, ErrorBody) {
        let detail = value
            .get("detail")
            .and_then(|v| v.as_str())
            .or_else(|| value.get("error").and_then(|v| v.as_str()));
        if let Some(detail) = detail {
            return (detail.to_string(), ErrorBody::Detail(detail.to_string()));
        }

        if let Some(map) = value.as_object() {
            let mut fields = BTreeMap::new();
            for (name, val) in map {
                match val {
                    serde_json::Value::String(msg) => {
                        fields.insert(name.clone(), vec![msg.clone()]);
                    }
                    serde_json::Value::Array(items) => {
                        let messages: Vec<String> = items
                            .iter()
                            .filter_map(|m| m.as_str().map(str::to_string))
                            .collect();
                        if !messages.is_empty() {
                            fields.insert(name.clone(), messages);
                        }
                    }
                    _ => {}
                }
            }
            if !fields.is_empty() {
                let message = fields
                    .values()
                    .flatten()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(". ");
                return (message, ErrorBody::Fields(fields));
            }
        }

        (
            format!("HTTP {}: {}", status, reason),
            ErrorBody::Unknown(value.clone()),
        )
    }
}

/// Core error type for greentrack_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend could not be reached or the response never arrived
    #[error("server unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with something other than JSON
    #[error("server unavailable: expected a JSON response but got {content_type:?}")]
    UnexpectedContentType { content_type: String },

    /// Non-2xx response with a structured body
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        body: ErrorBody,
    },

    /// Input rejected locally, before any request was sent
    #[error("{0}")]
    Validation(String),

    /// No stored session token for an operation that needs one
    #[error("not logged in (run `gtrack login` first)")]
    NotAuthenticated,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures of the transport itself rather than the application
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::UnexpectedContentType { .. }
        )
    }

    /// True when the backend rejected our stored token
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Error::Api { status: 401, .. })
    }
}
