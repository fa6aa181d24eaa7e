//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the `litlens` workspace. Using these constants helps to avoid "magic strings" and
//! ensures consistency between the library, the server and their tests.

/// The model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Base URL of the Google Generative Language REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The exact header row of every book table.
pub const CSV_HEADER: &str = "title,author,coordinates";

/// Placeholder the model writes for a title or author it cannot read.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// MIME type assumed for an uploaded file part that declares none.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "application/octet-stream";

/// Builds the `generateContent` endpoint for a Gemini model.
pub fn gemini_generate_url(model_name: &str) -> String {
    format!("{GEMINI_API_BASE}/{model_name}:generateContent")
}
