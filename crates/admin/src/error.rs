use uam_directory::DirectoryError;
use uam_directory::Field;

/// Failures of administrative operations. Only duplicate, validation,
/// and conflict details reach the caller; store failures are logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already exists")]
    Duplicate(Field),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("The request could not be completed. Please try again.")]
    Unavailable,
}

impl AdminError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
    pub fn unavailable(context: &str, error: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", context, error);
        Self::Unavailable
    }
}

impl From<DirectoryError> for AdminError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Duplicate(field) => Self::Duplicate(field),
            DirectoryError::Reference => Self::invalid("Role does not exist"),
            DirectoryError::Unavailable(detail) => Self::unavailable("directory", detail),
        }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for AdminError {
        fn status_code(&self) -> StatusCode {
            match self {
                Self::NotFound(_) => StatusCode::NOT_FOUND,
                Self::Duplicate(_) | Self::Conflict(_) => StatusCode::CONFLICT,
                Self::Validation(_) => StatusCode::BAD_REQUEST,
                Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(self.status_code()).json(uam_auth::Message::fail(self.to_string()))
        }
    }
}
