//! Error model shared by every layer of the API.
//!
//! Two shapes exist:
//! - [`RawError`]: a typed failure as produced by whichever layer failed
//!   (storage, validation, id parsing, or an unexpected fault).
//! - [`OperationalError`]: a normalized, client-safe error carrying its own
//!   HTTP status code.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Status class of an error response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Client-side failure (4xx).
    #[serde(rename = "fail")]
    Fail,
    /// Server-side failure, or anything that is not 4xx.
    #[serde(rename = "Error")]
    Error,
}

impl Status {
    /// `Fail` for 4xx status codes, `Error` otherwise.
    pub fn for_code(status_code: u16) -> Self {
        if (400..500).contains(&status_code) {
            Status::Fail
        } else {
            Status::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Fail => "fail",
            Status::Error => "Error",
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expected, user-facing failure whose message is safe to show verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationalError {
    message: String,
    status_code: u16,
    status: Status,
    is_operational: bool,
}

impl OperationalError {
    /// Build an operational error. Any status code is accepted as-is.
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code,
            status: Status::for_code(status_code),
            is_operational: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, 404)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, 400)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_operational(&self) -> bool {
        self.is_operational
    }
}

/// A single per-field validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field the failure refers to (e.g. `name`).
    pub path: String,
    /// Validator that rejected the value (`required`, `maxlength`, `enum`, ...).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// The offending value, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A failure as surfaced by the layer that produced it.
///
/// Storage and validation collaborators emit the specific variants; anything
/// unexpected is a [`RawError::Fault`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RawError {
    /// A value could not be converted to the type a field or parameter expects.
    #[error("Cast to {kind} failed for value \"{value}\" at path \"{path}\"")]
    Cast {
        path: String,
        value: String,
        kind: String,
    },

    /// A storage driver failure, identified by its numeric code.
    #[error("{errmsg}")]
    Store { code: i64, errmsg: String },

    /// Schema validation rejected one or more fields, in field order.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// An error that has already been normalized.
    #[error(transparent)]
    Operational(OperationalError),

    /// Anything else: programming faults, parser rejections, poisoned state.
    #[error("{message}")]
    Fault {
        message: String,
        status_code: Option<u16>,
    },
}

impl RawError {
    pub fn cast(path: impl Into<String>, value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::Cast {
            path: path.into(),
            value: value.into(),
            kind: kind.into(),
        }
    }

    pub fn store(code: i64, errmsg: impl Into<String>) -> Self {
        Self::Store {
            code,
            errmsg: errmsg.into(),
        }
    }

    /// Validation failure for a named model, e.g. `Tour validation failed: ...`.
    pub fn validation(model: &str, errors: Vec<FieldError>) -> Self {
        let details = errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join(", ");
        Self::Validation {
            message: format!("{model} validation failed: {details}"),
            errors,
        }
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn fault_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Fault {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Discriminator name, as shown in development error bodies.
    pub fn name(&self) -> &'static str {
        match self {
            RawError::Cast { .. } => "CastError",
            RawError::Store { .. } => "MongoServerError",
            RawError::Validation { .. } => "ValidationError",
            RawError::Operational(_) | RawError::Fault { .. } => "Error",
        }
    }

    /// Status code carried by the error itself, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RawError::Operational(e) => Some(e.status_code()),
            RawError::Fault { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Status class carried by the error itself, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            RawError::Operational(e) => Some(e.status()),
            _ => None,
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, RawError::Operational(e) if e.is_operational())
    }

    /// Variant-specific attributes, serialized for development error bodies.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            RawError::Cast { path, value, kind } => json!({
                "stringValue": format!("\"{value}\""),
                "kind": kind,
                "value": value,
                "path": path,
            }),
            RawError::Store { code, errmsg } => json!({
                "code": code,
                "errmsg": errmsg,
            }),
            RawError::Validation { message, errors } => {
                let fields: Map<String, Value> = errors
                    .iter()
                    .map(|e| {
                        let mut field = json!({
                            "name": "ValidatorError",
                            "message": e.message,
                            "kind": e.kind,
                            "path": e.path,
                        });
                        if let (Some(v), Some(obj)) = (&e.value, field.as_object_mut()) {
                            obj.insert("value".into(), v.clone());
                        }
                        (e.path.clone(), field)
                    })
                    .collect();
                json!({
                    "errors": fields,
                    "_message": message.split(':').next().unwrap_or(message),
                })
            }
            RawError::Operational(e) => json!({ "isOperational": e.is_operational() }),
            RawError::Fault { .. } => json!({}),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl From<OperationalError> for RawError {
    fn from(value: OperationalError) -> Self {
        RawError::Operational(value)
    }
}
