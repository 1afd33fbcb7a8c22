//! Response envelope and error-to-status mapping.

use lifeboard_core::assistant::AssistantError;
use lifeboard_core::storage::StorageError;
use lifeboard_core::validation::FieldIssue;
use lifeboard_core::{DbError, RepoError, ServiceError, ValidationError};
use serde::Serialize;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const NOT_FOUND: u16 = 404;
pub const INTERNAL_ERROR: u16 = 500;

/// Stable envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::success(OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::success(CREATED, data)
    }

    fn success(status: u16, data: T) -> Self {
        Self {
            status,
            data: Some(data),
            error: None,
            issues: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T> From<ApiFailure> for ApiResponse<T> {
    fn from(failure: ApiFailure) -> Self {
        Self {
            status: failure.status,
            data: None,
            error: Some(failure.message),
            issues: failure.issues,
        }
    }
}

/// Error half of an endpoint result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
    pub issues: Vec<FieldIssue>,
}

impl ApiFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(UNAUTHORIZED, "authentication required")
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(NOT_FOUND, format!("{what} not found"))
    }

    pub fn bad_request(field: &str, message: &str) -> Self {
        Self::from(ValidationError::single(field, message))
    }
}

impl From<ValidationError> for ApiFailure {
    fn from(value: ValidationError) -> Self {
        Self {
            status: BAD_REQUEST,
            message: value.to_string(),
            issues: value.issues().to_vec(),
        }
    }
}

impl From<ServiceError> for ApiFailure {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::from(err),
            ServiceError::NotFound(_) => Self::new(NOT_FOUND, value.to_string()),
            ServiceError::Conflict(message) => Self::new(BAD_REQUEST, message),
            ServiceError::Repo(_) | ServiceError::InconsistentState(_) => {
                Self::new(INTERNAL_ERROR, value.to_string())
            }
        }
    }
}

impl From<RepoError> for ApiFailure {
    fn from(value: RepoError) -> Self {
        Self::from(ServiceError::from(value))
    }
}

impl From<DbError> for ApiFailure {
    fn from(value: DbError) -> Self {
        Self::new(INTERNAL_ERROR, value.to_string())
    }
}

impl From<StorageError> for ApiFailure {
    fn from(value: StorageError) -> Self {
        if value.is_validation() {
            Self::bad_request("file", &value.to_string())
        } else {
            Self::new(INTERNAL_ERROR, value.to_string())
        }
    }
}

impl From<AssistantError> for ApiFailure {
    fn from(value: AssistantError) -> Self {
        match value {
            AssistantError::InvalidRequest(message) => Self::bad_request("messages", &message),
            AssistantError::Upstream(_) => Self::new(INTERNAL_ERROR, value.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiFailure>;
