//! Classification of raw failures into operational errors.
//!
//! Each rule maps a storage/validation failure onto a client-safe explanation
//! that does not leak schema or driver detail. Unrecognized failures are not
//! classified; the caller keeps the original error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FieldError, OperationalError, RawError};

/// Storage driver code for a uniqueness-constraint violation.
pub const DUPLICATE_KEY_CODE: i64 = 11000;

/// First quoted run in a driver message: double or single quotes, with
/// backslash escapes allowed inside.
static QUOTED_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"(?:\\.|[^\\"])*"|'(?:\\.|[^\\'])*'"#).expect("quoted value pattern is valid")
});

/// Map a raw failure onto an [`OperationalError`].
///
/// Returns `None` when no rule applies (including errors that are already
/// operational); the raw error is never modified.
pub fn classify(raw: &RawError) -> Option<OperationalError> {
    match raw {
        RawError::Cast { path, value, .. } => Some(cast_error(path, value)),
        RawError::Store { code, errmsg } if *code == DUPLICATE_KEY_CODE => {
            Some(duplicate_key_error(errmsg))
        }
        RawError::Validation { errors, .. } => Some(validation_error(errors)),
        RawError::Store { .. } | RawError::Operational(_) | RawError::Fault { .. } => None,
    }
}

fn cast_error(path: &str, value: &str) -> OperationalError {
    OperationalError::bad_request(format!("invalid {path}: {value}"))
}

fn duplicate_key_error(errmsg: &str) -> OperationalError {
    match QUOTED_VALUE.find(errmsg) {
        Some(m) => OperationalError::bad_request(format!(
            "Duplicate field value {}. Try different value!",
            m.as_str()
        )),
        None => OperationalError::bad_request("Duplicate field value. Try different value!"),
    }
}

fn validation_error(errors: &[FieldError]) -> OperationalError {
    if errors.is_empty() {
        return OperationalError::bad_request("Invalid input data!");
    }

    let joined = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(". ");
    OperationalError::bad_request(format!("Invalid input data! {joined}"))
}
