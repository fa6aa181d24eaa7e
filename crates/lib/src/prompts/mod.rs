//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the extraction-verification
//! pipeline. Each template is an opaque configuration asset with an embedded output
//! contract; the code validates the CSV shape the contract describes, never the
//! model's reasoning.

pub mod extraction;
pub mod verification;

pub use extraction::{
    ExtractionVariant, EXTRACTION_NORMALIZED_BOX_PROMPT, EXTRACTION_PIXEL_QUADRILATERAL_PROMPT,
};
pub use verification::{build_verification_prompt, VERIFICATION_PROMPT};
