//! # Route Handlers
//!
//! The liveness routes and the `/api/processphoto` upload endpoint.

use crate::{errors::AppError, state::AppState, types::ProcessPhotoResponse};
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use litlens::{constants::DEFAULT_IMAGE_MIME_TYPE, PipelineRequest};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// The multipart field that carries the photo.
pub const IMAGE_FIELD: &str = "image";

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "LitLens Backend is running!"
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Accepts a bookshelf photo and returns the detected books as CSV.
///
/// The photo must be a file part named `image`. Nothing is sent to the model
/// until one has been read.
pub async fn process_photo_handler(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessPhotoResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("process_photo", %request_id);
    async move {
        info!("Received request for /api/processphoto");

        let request = read_image(multipart).await?.ok_or(AppError::MissingImage)?;

        info!("Processing photo...");
        let result = app_state.pipeline.run(request).await?;

        info!(stage = %result.stage, "Successfully processed photo.");
        Ok::<_, AppError>(Json(ProcessPhotoResponse { csv: result.csv }))
    }
    .instrument(span)
    .await
}

/// Reads the first `image` file part; other parts are skipped.
///
/// A part counts as a file only when it has a filename, so a plain text field
/// named `image` is treated as absent. Later `image` files are drained and
/// dropped.
async fn read_image(mut multipart: Multipart) -> Result<Option<PipelineRequest>, AppError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if name != IMAGE_FIELD {
            warn!("Ignoring multipart field: {}", name);
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            warn!("Ignoring '{}' field without a filename.", name);
            continue;
        };
        if image.is_some() {
            warn!(
                file_name = %file_name,
                "Ignoring extra '{}' file part; only the first upload is processed.",
                name
            );
            continue;
        }

        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_IMAGE_MIME_TYPE)
            .to_string();
        let bytes = field.bytes().await?;
        info!(
            file_name = %file_name,
            mime_type = %mime_type,
            size = bytes.len(),
            "Received image upload."
        );
        image = Some(PipelineRequest::new(bytes.to_vec(), mime_type));
    }
    Ok(image)
}
