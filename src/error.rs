//! Error types for the Docker client

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid API version: {0}")]
    InvalidVersion(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Container(Box<ContainerError>),

    #[error("Build failed: {0}")]
    Build(String),

    #[error("Daemon reported failure: {0}")]
    Progress(String),

    #[error("Stream parse error: {0}")]
    StreamParse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Resource ID was not provided")]
    NullResource,

    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Daemon answered 404 (includes missing images)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_not_found())
    }

    /// Daemon answered 404 because the referenced image is absent
    pub fn is_image_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.kind == ApiErrorKind::ImageNotFound)
    }

    /// Status code when the daemon rejected the request
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Api(e) => Some(e.status),
            _ => None,
        }
    }

    pub(crate) fn min_version(feature: &str, version: &str) -> Self {
        Error::InvalidVersion(format!(
            "{} is not available for API version < {}",
            feature, version
        ))
    }
}

impl From<ContainerError> for Error {
    fn from(e: ContainerError) -> Self {
        Error::Container(Box::new(e))
    }
}

/// Classification of a daemon error response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Other,
    NotFound,
    ImageNotFound,
}

/// Non-2xx response from the daemon
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub explanation: Option<String>,
    pub kind: ApiErrorKind,
}

impl ApiError {
    pub fn new(status: StatusCode, explanation: Option<String>) -> Self {
        let explanation = explanation
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let kind = if status == StatusCode::NOT_FOUND {
            match explanation.as_deref() {
                Some(text) if text.contains("No such image") => ApiErrorKind::ImageNotFound,
                _ => ApiErrorKind::NotFound,
            }
        } else {
            ApiErrorKind::Other
        };
        Self {
            status,
            explanation,
            kind,
        }
    }

    /// Build from a raw error body, preferring the JSON `message` field
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let explanation = match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| Some(String::from_utf8_lossy(body).into_owned())),
            Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
        };
        Self::new(status, explanation)
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ApiErrorKind::NotFound | ApiErrorKind::ImageNotFound)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = self.status.canonical_reason().unwrap_or("Unknown");
        if self.is_client_error() {
            write!(f, "{} Client Error: {}", self.status.as_u16(), reason)?;
        } else if self.is_server_error() {
            write!(f, "{} Server Error: {}", self.status.as_u16(), reason)?;
        } else {
            write!(f, "{} {}", self.status.as_u16(), reason)?;
        }
        if let Some(ref explanation) = self.explanation {
            write!(f, " (\"{}\")", explanation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// A container exited with a non-zero status under `run`
#[derive(Debug, Clone, Error)]
#[error("Command '{command}' in image '{image}' returned non-zero exit status {exit_status}: {stderr}")]
pub struct ContainerError {
    pub container_id: String,
    pub exit_status: i64,
    pub command: String,
    pub image: String,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_from_json_message() {
        let err = ApiError::from_body(StatusCode::CONFLICT, br#"{"message": "name in use"}"#);
        assert_eq!(err.explanation.as_deref(), Some("name in use"));
        assert_eq!(err.kind, ApiErrorKind::Other);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_explanation_from_raw_body() {
        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, b"boom\n");
        assert_eq!(err.explanation.as_deref(), Some("boom"));
        assert!(err.is_server_error());
        assert_eq!(err.to_string(), "500 Server Error: Internal Server Error (\"boom\")");
    }

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::from_body(
            StatusCode::NOT_FOUND,
            br#"{"message": "No such image: alpine:latest"}"#,
        );
        assert_eq!(err.kind, ApiErrorKind::ImageNotFound);

        let err: Error = ApiError::from_body(StatusCode::NOT_FOUND, b"No such container: x").into();
        assert!(err.is_not_found());
        assert!(!err.is_image_not_found());
        assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_container_error_message() {
        let err = ContainerError {
            container_id: "abc".into(),
            exit_status: 1,
            command: "cat /test".into(),
            image: "alpine".into(),
            stderr: "No such file or directory".into(),
        };
        let msg = Error::from(err).to_string();
        assert!(msg.contains("cat /test"));
        assert!(msg.contains("alpine"));
        assert!(msg.contains("exit status 1"));
    }
}
