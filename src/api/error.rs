use crate::core::id::RecordId;

/// Broad category of an [`ApiError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Session,
    NotFound,
    Validation,
}

/// Every way an API call can be rejected. The `Display` text is meant to be
/// shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("You are not signed in")]
    NoSession,

    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials | Self::EmailTaken => ErrorKind::Auth,
            Self::NoSession => ErrorKind::Session,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Invalid(_) => ErrorKind::Validation,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
