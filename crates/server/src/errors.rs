use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartError;
use litlens::{PipelineError, PromptError};
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// Every variant renders as a flat `{"error": "..."}` body. Upstream detail is
/// logged here and never sent to the client.
#[derive(Debug)]
pub enum AppError {
    /// The request carried no `image` file part.
    MissingImage,
    /// The multipart body could not be read (malformed, or over the upload limit).
    Upload(MultipartError),
    /// A failure inside the extraction-verification pipeline.
    Pipeline(PipelineError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Upload(err) => {
                let status = err.status();
                warn!(%status, "Rejected multipart upload: {}", err.body_text());
                let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "Uploaded image is too large."
                } else {
                    "Could not read the uploaded form data."
                };
                (status, message)
            }
            AppError::MissingImage => {
                warn!("Request failed: No image file provided.");
                (
                    StatusCode::BAD_REQUEST,
                    "Please provide an image file to process.",
                )
            }
            AppError::Pipeline(err) => match err.prompt_error() {
                PromptError::MissingApiKey => {
                    error!("Missing API key. Cannot process request.");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is missing API key configuration.",
                    )
                }
                _ => {
                    error!("Error calling AI provider: {err}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process photo.")
                }
            },
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.",
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
