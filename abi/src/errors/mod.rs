use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, error, warn};

pub type Result<T, E = Error> = std::result::Result<T, E>;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    // validation
    SelfRequest,
    BadRequest,
    BodyParsing,
    PathParsing,
    // conflict
    AlreadyFriends,
    DuplicateRequest,
    RequestNotPending,
    EmailTaken,
    NotFound,
    Forbidden,
    UnAuthorized,
    AccountOrPassword,
    // internal
    DbError,
    InternalServer,
    ConfigReadError,
    ConfigParseError,
    IOError,
    ParseError,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::SelfRequest
            | ErrorKind::BadRequest
            | ErrorKind::BodyParsing
            | ErrorKind::PathParsing => StatusCode::BAD_REQUEST,
            // conflicts are reported as 400 to keep the public contract stable
            ErrorKind::AlreadyFriends
            | ErrorKind::DuplicateRequest
            | ErrorKind::RequestNotPending
            | ErrorKind::EmailTaken => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::UnAuthorized | ErrorKind::AccountOrPassword => StatusCode::UNAUTHORIZED,
            ErrorKind::DbError
            | ErrorKind::InternalServer
            | ErrorKind::ConfigReadError
            | ErrorKind::ConfigParseError
            | ErrorKind::IOError
            | ErrorKind::ParseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorKind::AlreadyFriends
                | ErrorKind::DuplicateRequest
                | ErrorKind::RequestNotPending
                | ErrorKind::EmailTaken
        )
    }

    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    #[serde(rename = "message")]
    details: Option<String>,
    #[serde(skip)]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    #[inline]
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        source: impl StdError + 'static + Send + Sync,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn with_details(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            source: None,
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn internal(error: impl StdError + 'static + Send + Sync) -> Self {
        Self::new(ErrorKind::InternalServer, error.to_string(), error)
    }

    #[inline]
    pub fn internal_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::InternalServer, details)
    }

    #[inline]
    pub fn unauthorized(
        error: impl StdError + 'static + Send + Sync,
        details: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnAuthorized, details, error)
    }

    #[inline]
    pub fn unauthorized_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::UnAuthorized, details)
    }

    #[inline]
    pub fn account_or_pwd() -> Self {
        Self::with_details(ErrorKind::AccountOrPassword, "invalid email or password")
    }

    #[inline]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BadRequest, details)
    }

    #[inline]
    pub fn body_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BodyParsing, details)
    }

    #[inline]
    pub fn path_parsing(err: impl StdError + 'static + Send + Sync) -> Self {
        Self::new(ErrorKind::PathParsing, err.to_string(), err)
    }

    #[inline]
    pub fn not_found_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::NotFound, details)
    }

    #[inline]
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Forbidden, details)
    }

    #[inline]
    pub fn self_request() -> Self {
        Self::with_details(
            ErrorKind::SelfRequest,
            "you can't send a friend request to yourself",
        )
    }

    #[inline]
    pub fn already_friends() -> Self {
        Self::with_details(
            ErrorKind::AlreadyFriends,
            "you are already friends with this user",
        )
    }

    #[inline]
    pub fn duplicate_request() -> Self {
        Self::with_details(
            ErrorKind::DuplicateRequest,
            "a friend request already exists between you and this user",
        )
    }

    #[inline]
    pub fn request_not_pending(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::RequestNotPending, details)
    }

    #[inline]
    pub fn email_taken() -> Self {
        Self::with_details(
            ErrorKind::EmailTaken,
            "email already exists, please use a different one",
        )
    }

    /// message that is safe to hand back to a caller
    pub fn public_message(&self) -> String {
        if self.kind.is_internal() {
            return INTERNAL_MESSAGE.to_string();
        }
        match &self.details {
            Some(details) => details.clone(),
            None => format!("{:?}", self.kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.kind.status_code();

        if self.kind.is_internal() {
            error!(source = ?self.source, "request failed: {}", self);
        } else if matches!(self.kind, ErrorKind::UnAuthorized) {
            warn!("unauthorized request: {}", self);
        } else if self.kind.is_conflict() {
            debug!("request conflicts with stored state: {}", self);
        }

        let body = ErrorBody {
            kind: self.kind,
            message: self.public_message(),
        };
        (status_code, Json(body)).into_response()
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value.to_string(), value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ConfigParseError, value.to_string(), value)
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::new(ErrorKind::DbError, value.to_string(), value)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::new(ErrorKind::DbError, value.to_string(), value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorKind::ParseError, value.to_string(), value)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::new(ErrorKind::InternalServer, value.to_string(), value)
    }
}

/// password_hash::Error is not std::error::Error without its std feature, so keep only the text
impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::with_details(ErrorKind::InternalServer, value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_kinds_map_to_bad_request() {
        for err in [
            Error::already_friends(),
            Error::duplicate_request(),
            Error::request_not_pending("rejected"),
            Error::email_taken(),
        ] {
            assert!(err.kind().is_conflict());
            assert_eq!(err.kind().status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn taxonomy_status_codes() {
        assert_eq!(
            Error::self_request().kind().status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::not_found_with_details("gone").kind().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::forbidden("nope").kind().status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::unauthorized_with_details("no token").kind().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk on fire at /var/lib/pg",
        ));
        assert!(err.kind().is_internal());
        assert_eq!(err.public_message(), "internal server error");
        assert!(err.source().is_some());
    }

    #[test]
    fn display_includes_kind_and_details() {
        let err = Error::duplicate_request();
        assert!(err.to_string().starts_with("DuplicateRequest: "));
        assert_eq!(
            Error::not_found_with_details("user not found").public_message(),
            "user not found"
        );
    }

    #[tokio::test]
    async fn into_response_serializes_kind_and_message() {
        let resp = Error::forbidden("only the recipient can accept").into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "Forbidden");
        assert_eq!(body["message"], "only the recipient can accept");
    }
}
