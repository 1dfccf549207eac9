//! Classification of failure bodies into [`ApiError`] shapes.

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{
    ApiError, RootCause, StringError, StructuredError, UnknownError, null_as_default,
};

/// Top-level envelope; `error` stays untyped until its shape is known.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    root_cause: Option<Vec<RootCause>>,
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    index_uuid: Option<String>,
}

/// Classify the body of a failure response.
///
/// A 405 always yields [`StringError`], and a 405 body that is not JSON is
/// reported as a decode error. For every other status the structured shape
/// is tried first, then the bare-string shape, and whatever is left becomes
/// [`UnknownError`] with the raw body kept. An empty body is always unknown.
pub fn classify(status: StatusCode, body: &[u8]) -> Result<ApiError, serde_json::Error> {
    let code = status.as_u16();
    if body.is_empty() {
        return Ok(UnknownError::empty(code).into());
    }

    if status == StatusCode::METHOD_NOT_ALLOWED {
        let envelope: Envelope = serde_json::from_slice(body)?;
        let message = match envelope.error {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(message)) => message,
            Some(Value::Object(details)) => match details.get("reason").and_then(Value::as_str) {
                Some(reason) => reason.to_string(),
                None => Value::Object(details).to_string(),
            },
            Some(other) => other.to_string(),
        };
        return Ok(StringError {
            status: status_or(envelope.status, code),
            message,
        }
        .into());
    }

    let Ok(envelope) = serde_json::from_slice::<Envelope>(body) else {
        return Ok(UnknownError::raw(code, body).into());
    };

    let error = match envelope.error {
        None | Some(Value::Null) => return Ok(UnknownError::raw(code, body).into()),
        Some(Value::String(message)) if message.is_empty() => {
            return Ok(UnknownError::raw(code, body).into());
        }
        Some(Value::Object(map)) if map.is_empty() => {
            return Ok(UnknownError::raw(code, body).into());
        }
        Some(error) => error,
    };

    if error.is_object()
        && let Ok(details) = serde_json::from_value::<ErrorDetails>(error.clone())
    {
        let kind = details.kind.unwrap_or_default();
        let reason = details.reason.unwrap_or_default();
        // Some 404s carry an object that is not an error report.
        if envelope.status == 0 && kind.is_empty() && reason.is_empty() {
            return Ok(UnknownError::raw(code, body).into());
        }
        return Ok(StructuredError {
            status: envelope.status,
            kind,
            reason,
            root_cause: details.root_cause.unwrap_or_default(),
            index: details.index,
            index_uuid: details.index_uuid,
        }
        .into());
    }

    let message = match error {
        Value::String(message) => message,
        other => other.to_string(),
    };
    Ok(StringError {
        status: status_or(envelope.status, code),
        message,
    }
    .into())
}

fn status_or(body_status: u16, http_status: u16) -> u16 {
    if body_status == 0 { http_status } else { body_status }
}
