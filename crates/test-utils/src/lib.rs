use async_trait::async_trait;
use litlens::errors::PromptError;
use litlens::providers::ai::{AiProvider, InlineImage};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

/// A call recorded by `MockAiProvider`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub image: Option<InlineImage>,
}

#[derive(Clone, Debug)]
enum Reply {
    Text(String),
    Fail(String),
    MissingKey,
}

/// A scripted gateway for pipeline and server tests.
///
/// Replies are keyed by a substring of the prompt and checked in the order they
/// were added. Clones share the same script and call log, so a test can keep a
/// handle after boxing the provider into a pipeline.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    replies: Arc<Mutex<Vec<(String, Reply)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for any prompt containing `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut replies = self.replies.lock().unwrap();
        replies.push((key.to_string(), Reply::Text(response.to_string())));
    }

    /// Makes any prompt containing `key` fail with `PromptError::AiApi(message)`.
    pub fn add_failure(&self, key: &str, message: &str) {
        let mut replies = self.replies.lock().unwrap();
        replies.push((key.to_string(), Reply::Fail(message.to_string())));
    }

    /// Makes any prompt containing `key` fail with `PromptError::MissingApiKey`.
    pub fn add_missing_key(&self, key: &str) {
        let mut replies = self.replies.lock().unwrap();
        replies.push((key.to_string(), Reply::MissingKey));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, PromptError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            image: image.cloned(),
        });

        let replies = self.replies.lock().unwrap();
        for (key, reply) in replies.iter() {
            if prompt.contains(key.as_str()) {
                return match reply {
                    Reply::Text(text) => Ok(text.clone()),
                    Reply::Fail(message) => Err(PromptError::AiApi(message.clone())),
                    Reply::MissingKey => Err(PromptError::MissingApiKey),
                };
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for prompt. Got: '{prompt}'"
        )))
    }
}

// --- Fixtures ---

/// A marker found only in the built-in extraction prompts.
pub const EXTRACTION_MARKER: &str = "Process the attached image";

/// A marker found only in the built-in verification prompt.
pub const VERIFICATION_MARKER: &str = "Here is the csv input:";

/// Stage-one output for a single, garbled spine.
pub const RAW_CATCHER_CSV: &str =
    "title,author,coordinates\n\"The Crtcher in the Tye\",\"J.D. Salnger\",\"[0.25,0.1,0.45,0.15]\"";

/// Stage-two output correcting `RAW_CATCHER_CSV`.
pub const VERIFIED_CATCHER_CSV: &str =
    "title,author,coordinates\n\"The Catcher in the Rye\",\"J.D. Salinger\",\"[0.25,0.1,0.45,0.15]\"";

/// A few bytes standing in for an uploaded JPEG.
pub fn fake_jpeg() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9]
}
