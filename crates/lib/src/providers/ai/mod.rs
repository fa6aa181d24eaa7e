pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::{self, Debug};

/// An image attached to a generation request, sent inline with the prompt.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl InlineImage {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }
}

// Image payloads can be megabytes; keep them out of logs.
impl Debug for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A trait for interacting with a multimodal AI provider.
///
/// This is the gateway through which every call to the external inference
/// service passes. Implementations make exactly one outbound request per call:
/// no caching, no retries.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a text response from a prompt and an optional inline image.
    ///
    /// The response is returned as-is; no schema is enforced.
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// Rejects blank prompts before any network call is made.
pub(crate) fn ensure_prompt(prompt: &str) -> Result<(), PromptError> {
    if prompt.trim().is_empty() {
        return Err(PromptError::EmptyPrompt);
    }
    Ok(())
}
