use serde::{Deserialize, Serialize};

/// The body returned by `/api/processphoto` on success.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessPhotoResponse {
    pub csv: String,
}
