use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use client_server_messages::ErrorResponse;
use euchre::table::TableError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("game {0} not found")]
    UnknownGame(Uuid),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("game state is unavailable")]
    Poisoned,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::UnknownGame(_) => StatusCode::NOT_FOUND,
            ServiceError::BadRequest(_) | ServiceError::Table(_) => StatusCode::BAD_REQUEST,
            ServiceError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
