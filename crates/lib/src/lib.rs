//! # LitLens
//!
//! This crate turns a photo of a bookshelf into a CSV table of the books on it
//! (title, author, coordinates). It forwards the photo to a multimodal model with
//! an extraction prompt, then optionally sends the raw table back through a
//! verification prompt that corrects OCR-style mistakes.
//!
//! The model gateway is the [`providers::ai::AiProvider`] trait; the two-stage
//! flow is [`pipeline::ExtractionPipeline`].

pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::{CsvContractError, PipelineError, PromptError};
pub use pipeline::{ExtractionPipeline, ExtractionPipelineBuilder};
pub use prompts::ExtractionVariant;
pub use providers::ai::{AiProvider, InlineImage};
pub use types::{
    BookRecord, BookTable, PipelineRequest, PipelineResult, PipelineStage, VerificationPolicy,
};
