use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use crate::{
    auth::password::PasswordError,
    db::interface::DatabaseError,
    i18n::{Language, Message},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Login failed")]
    LoginFailed,

    #[error("Login error: {0}")]
    LoginError(#[source] DatabaseError),

    #[error("Missing data from the form")]
    MissingFormData,

    #[error("Password mismatch")]
    PasswordMismatch,

    #[error("Email already in use")]
    EmailAlreadyInUse,

    #[error("Provider account already registered")]
    AccountAlreadyRegistered,

    #[error("Registration error: {0}")]
    RegistrationError(#[source] DatabaseError),

    #[error("Obligees search failed: {0}")]
    ObligeeSearchFailed(#[source] DatabaseError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Unknown obligee")]
    UnknownObligee,

    #[error("Invalid attachment")]
    InvalidAttachment,

    #[error("Action not allowed at this point")]
    ActionNotAllowed,

    #[error("Invalid date")]
    InvalidDate,

    #[error("Invalid deadline extension")]
    InvalidExtension,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        #[allow(clippy::enum_glob_use)]
        use ApiError::*;
        match self {
            NotFound => StatusCode::NOT_FOUND,
            NotLoggedIn | LoginFailed => StatusCode::UNAUTHORIZED,
            MissingFormData
            | PasswordMismatch
            | InvalidRequest(_)
            | UnknownObligee
            | InvalidAttachment
            | InvalidDate
            | InvalidExtension => StatusCode::BAD_REQUEST,
            EmailAlreadyInUse | AccountAlreadyRegistered | ActionNotAllowed => {
                StatusCode::CONFLICT
            }
            PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LoginError(_)
            | RegistrationError(_)
            | ObligeeSearchFailed(_)
            | Database(_)
            | Password(_)
            | Url(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> Message {
        #[allow(clippy::enum_glob_use)]
        use ApiError::*;
        match self {
            NotFound => Message::PageNotFound,
            NotLoggedIn => Message::NotLoggedIn,
            LoginFailed => Message::LoginFailed,
            LoginError(_) => Message::LoginError,
            MissingFormData => Message::MissingFormData,
            PasswordMismatch => Message::PasswordMismatch,
            EmailAlreadyInUse => Message::EmailAlreadyInUse,
            AccountAlreadyRegistered => Message::AccountAlreadyRegistered,
            InvalidRequest(_) => Message::InvalidRequest,
            PayloadTooLarge => Message::PayloadTooLarge,
            UnknownObligee => Message::UnknownObligee,
            InvalidAttachment => Message::InvalidAttachment,
            ActionNotAllowed => Message::ActionNotAllowed,
            InvalidDate => Message::InvalidDate,
            InvalidExtension => Message::InvalidExtension,
            RegistrationError(_) => Message::RegistrationError,
            ObligeeSearchFailed(_) => Message::ObligeeSearchFailed,
            Database(_) | Password(_) | Url(_) => Message::GenericError,
        }
    }

    /// Maps an extractor rejection by its status code.
    fn rejected(status: StatusCode, detail: String) -> Self {
        debug!(%status, "rejected request: {detail}");
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidRequest(detail)
        }
    }

    pub fn localized(self, language: Language) -> LocalizedError {
        LocalizedError {
            error: self,
            language,
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("unmatched path parameters: {}", rejection.body_text());
        ApiError::NotFound
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::rejected(error.status(), error.body_text())
    }
}

/// An [`ApiError`] together with the language its message is shown in.
#[derive(Debug)]
pub struct LocalizedError {
    pub error: ApiError,
    pub language: Language,
}

impl IntoResponse for LocalizedError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            error!("{}", self.error);
        }
        let message = self.error.message().text(self.language);
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.localized(Language::default()).into_response()
    }
}

/// Attaches the request language to errors.
pub trait Localize<T> {
    fn localize(self, language: Language) -> Result<T, LocalizedError>;
}

impl<T, E: Into<ApiError>> Localize<T> for Result<T, E> {
    fn localize(self, language: Language) -> Result<T, LocalizedError> {
        self.map_err(|e| e.into().localized(language))
    }
}
