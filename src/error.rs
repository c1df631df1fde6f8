use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why an outbound image generation call did not produce an image URL.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("missing AI_API_KEY")]
    MissingApiKey,

    #[error("AI image generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI image generation failed: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid response format from AI service: {0}")]
    InvalidPayload(String),

    #[error("AI service returned an error: {0}")]
    Remote(String),

    #[error("AI service returned no message content")]
    MissingContent,

    #[error("Invalid image URL received from AI service: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Image not found")]
    NotFound,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
