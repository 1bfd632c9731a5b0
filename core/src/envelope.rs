//! The `{status, data, message}` wrapper every console endpoint answers with.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Envelope status. Anything other than `"success"`, including a missing
/// field, counts as a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Response envelope. `data` is only meaningful when `status` is `Success`;
/// otherwise `message` carries the error text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    #[serde(default)]
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data,
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }
}

impl Envelope<Value> {
    /// Decode a raw response body, leaving the payload untyped.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Turn the envelope into the payload or an application error.
    ///
    /// The payload is decoded as-is; a `null` or missing `data` decodes into
    /// `T` only when `T` accepts it (`Option<_>`, `Value`, `()`).
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self.status {
            EnvelopeStatus::Success => serde_json::from_value(self.data)
                .map_err(|e| ApiError::DeserializationError(e.to_string())),
            EnvelopeStatus::Error | EnvelopeStatus::Unknown => {
                Err(ApiError::application(self.message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DEFAULT_ERROR_MESSAGE;

    #[test]
    fn success_yields_data_unchanged() {
        let env = Envelope::decode(r#"{"status":"success","data":{"items":[],"total":0}}"#).unwrap();
        assert!(env.is_success());
        let data: Value = env.into_result().unwrap();
        assert_eq!(data, serde_json::json!({"items": [], "total": 0}));
    }

    #[test]
    fn error_uses_message() {
        let env = Envelope::decode(r#"{"status":"error","message":"Task not found"}"#).unwrap();
        let err = env.into_result::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Application { ref message } if message == "Task not found"));
    }

    #[test]
    fn error_without_message_uses_default_text() {
        let env = Envelope::decode(r#"{"status":"error"}"#).unwrap();
        let err = env.into_result::<Value>().unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn null_data_decodes_into_option() {
        let env = Envelope::decode(r#"{"status":"success","data":null}"#).unwrap();
        let data: Option<String> = env.into_result().unwrap();
        assert!(data.is_none());
    }

    #[test]
    fn missing_data_is_null() {
        let env = Envelope::decode(r#"{"status":"success"}"#).unwrap();
        assert_eq!(env.data, Value::Null);
    }

    #[test]
    fn payload_of_wrong_shape_is_deserialization_error() {
        let env = Envelope::decode(r#"{"status":"success","data":"text"}"#).unwrap();
        let err = env.into_result::<Vec<u32>>().unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn unknown_status_is_application_error() {
        let env = Envelope::decode(r#"{"status":"fail","message":"quota exceeded"}"#).unwrap();
        assert_eq!(env.status, EnvelopeStatus::Unknown);
        let err = env.into_result::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Application { ref message } if message == "quota exceeded"));
    }

    #[test]
    fn missing_status_is_application_error() {
        let env = Envelope::decode(r#"{"message":"x"}"#).unwrap();
        assert!(!env.is_success());
        let err = env.into_result::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Application { ref message } if message == "x"));
    }

    #[test]
    fn other_status_without_message_uses_default_text() {
        let env = Envelope::decode(r#"{"status":"ok","data":1}"#).unwrap();
        let err = env.into_result::<u32>().unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn success_envelope_serializes_without_message() {
        let json = serde_json::to_value(Envelope::success(true)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": true}));
    }
}
