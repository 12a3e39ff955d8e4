use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use hmac::digest::InvalidLength as INVALID_KEY_LENGTH;
use reqwest::Error as REQWEST_ERROR;
use sqlx::error::Error as SQL_ERROR;
use std::{env::VarError, io::Error as IO_ERROR, num::ParseIntError};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("Invalid HMAC key: {0}")]
    InvalidKeyLength(#[from] INVALID_KEY_LENGTH),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Server end with error: {0}")]
    ServerError(String),

    #[error("Missing params: {0}")]
    MissingParams(String),

    #[error("Resource {0} does not advertise hub and self links")]
    Discovery(String),

    #[error("No subscription exists for topic {0}")]
    NoSubscription(String),

    #[error("Hub {hub} answered with status {status}")]
    HubRequest { status: u16, hub: String },

    #[error("Handshake rejected for topic {0}")]
    HandshakeRejected(String),

    #[error("Push rejected for topic {0}")]
    PushRejected(String),

    #[error("Content sink error: {0}")]
    SinkError(String),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // hub-facing negative verification
            Error::HandshakeRejected(_) | Error::PushRejected(_) => {
                StatusCode::NOT_FOUND
            },

            Error::MissingParams(_)
            | Error::INT(_)
            | Error::URL(_) => StatusCode::BAD_REQUEST,

            Error::Discovery(_) | Error::NoSubscription(_) => {
                StatusCode::NOT_FOUND
            },

            Error::HubRequest { .. } | Error::ReqwestError(_) => {
                StatusCode::BAD_GATEWAY
            },

            Error::Io(_)
            | Error::SQL(_)
            | Error::VAR(_)
            | Error::TokioJoinError(_)
            | Error::InvalidKeyLength(_)
            | Error::SetGlobalDefaultError(_)
            | Error::ConfigurationError(_)
            | Error::ServerError(_)
            | Error::SinkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // The hub only ever learns the outcome from the status line.
        if let Error::HandshakeRejected(_) | Error::PushRejected(_) = self {
            return HttpResponse::build(status)
                .content_type("text/plain")
                .finish();
        }

        let body = serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "message": self.to_string(),
            "status": status.as_u16(),
        });
        HttpResponse::build(status).json(body)
    }
}
