use crate::api::v1::handler::ApiResponse;
use crate::application_port::AuthError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(code) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
        Ok(warp::reply::with_status(json, code.http_status()))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            ApiErrorCode::NotFound.to_string(),
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else {
        warn!("unhandled rejection: {:?}", err);
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::InternalError,
            ApiErrorCode::InternalError.to_string(),
        ));
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

/// One machine-readable code and one HTTP status per failure kind. Auth
/// failures are never collapsed into a generic error, and store failures are
/// never dressed up as one of them.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    #[error("Email or password is incorrect")]
    InvalidCredentials,
    #[error("Member not found")]
    MemberNotFound,
    #[error("Account is suspended")]
    MemberSuspended,
    #[error("Member already exists")]
    MemberAlreadyExists,
    #[error("Refresh token is not valid")]
    InvalidRefreshToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Token has been logged out")]
    BlacklistedToken,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Resource not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidRefreshToken
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::ExpiredToken
            | ApiErrorCode::BlacklistedToken
            | ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::MemberSuspended | ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::MemberNotFound | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MemberAlreadyExists => StatusCode::CONFLICT,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::MemberNotFound => ApiErrorCode::MemberNotFound,
            AuthError::MemberSuspended => ApiErrorCode::MemberSuspended,
            AuthError::MemberAlreadyExists => ApiErrorCode::MemberAlreadyExists,
            AuthError::InvalidRefreshToken => ApiErrorCode::InvalidRefreshToken,
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::TokenExpired => ApiErrorCode::ExpiredToken,
            AuthError::TokenBlacklisted => ApiErrorCode::BlacklistedToken,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}
