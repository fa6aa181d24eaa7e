//! # Extraction-Verification Pipeline
//!
//! Two sequential calls to the model gateway. The first sends the bookshelf
//! photo with the extraction prompt and gets back a raw book table; the second
//! sends that table, appended to the verification prompt, and gets back the
//! corrected table.
//!
//! Text moves between stages and out to the caller unchanged. The CSV contract
//! is only checked to log diagnostics.

use crate::{
    errors::{PipelineError, PromptError},
    prompts::{build_verification_prompt, ExtractionVariant, VERIFICATION_PROMPT},
    providers::ai::AiProvider,
    types::{BookTable, PipelineRequest, PipelineResult, PipelineStage, VerificationPolicy},
};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Runs bookshelf photos through extraction and, by policy, verification.
///
/// Holds no per-request state, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct ExtractionPipeline {
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) extraction_prompt: String,
    pub(crate) verification_prompt: String,
    pub(crate) verification: VerificationPolicy,
    pub(crate) expected_coordinates: Option<usize>,
}

impl fmt::Debug for ExtractionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("ai_provider", &self.ai_provider)
            .field("extraction_prompt_len", &self.extraction_prompt.len())
            .field("verification_prompt_len", &self.verification_prompt.len())
            .field("verification", &self.verification)
            .finish()
    }
}

impl ExtractionPipeline {
    pub fn builder() -> ExtractionPipelineBuilder {
        ExtractionPipelineBuilder::new()
    }

    pub fn verification_policy(&self) -> VerificationPolicy {
        self.verification
    }

    /// Runs one photo through the pipeline.
    ///
    /// Any gateway failure ends the run; nothing produced before it is
    /// returned.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineResult, PipelineError> {
        let mut stage = PipelineStage::Received;
        info!(
            %stage,
            mime_type = %request.image.mime_type,
            image_bytes = request.image.bytes.len(),
            "[pipeline] Photo received."
        );

        // --- Received -> Extracted ---
        let raw_csv = self
            .ai_provider
            .generate(&self.extraction_prompt, Some(&request.image))
            .await
            .map_err(|e| self.fail(stage, PipelineError::Extraction(e)))?;
        stage = PipelineStage::Extracted;
        info!(%stage, csv_len = raw_csv.len(), "[pipeline] Extraction complete.");
        debug!("<-- Raw CSV from extraction:\n{raw_csv}");
        let extracted = self.inspect(stage, &raw_csv);

        if self.verification == VerificationPolicy::Disabled {
            info!(%stage, "[pipeline] Verification disabled; returning extraction output.");
            return Ok(PipelineResult {
                csv: raw_csv,
                stage,
            });
        }

        // --- Extracted -> Verified ---
        let prompt = build_verification_prompt(&self.verification_prompt, &raw_csv);
        let verified_csv = self
            .ai_provider
            .generate(&prompt, None)
            .await
            .map_err(|e| self.fail(stage, PipelineError::Verification(e)))?;
        stage = PipelineStage::Verified;
        info!(%stage, csv_len = verified_csv.len(), "[pipeline] Verification complete.");
        debug!("<-- Corrected CSV from verification:\n{verified_csv}");

        if let (Some(before), Some(after)) = (extracted, self.inspect(stage, &verified_csv)) {
            if before.coordinates() != after.coordinates() {
                warn!(
                    %stage,
                    extracted_rows = before.len(),
                    verified_rows = after.len(),
                    "[pipeline] Verification changed the coordinates column."
                );
            }
        }

        Ok(PipelineResult {
            csv: verified_csv,
            stage,
        })
    }

    fn fail(&self, from: PipelineStage, err: PipelineError) -> PipelineError {
        error!(
            from = %from,
            stage = %PipelineStage::Failed,
            "[pipeline] {err}"
        );
        err
    }

    /// Checks stage output against the CSV contract, logging any violation.
    fn inspect(&self, stage: PipelineStage, csv: &str) -> Option<BookTable> {
        match BookTable::parse(csv) {
            Ok(table) => {
                debug!(%stage, rows = table.len(), "[pipeline] Output matches the CSV contract.");
                if let Some(expected) = self.expected_coordinates {
                    let off = table
                        .records
                        .iter()
                        .filter(|r| r.coordinate_values().map(|v| v.len()) != Some(expected))
                        .count();
                    if off > 0 {
                        warn!(
                            %stage,
                            rows = off,
                            expected,
                            "[pipeline] Rows with an unexpected number of coordinates."
                        );
                    }
                }
                Some(table)
            }
            Err(e) => {
                warn!(%stage, "[pipeline] Output breaks the CSV contract: {e}");
                None
            }
        }
    }
}

/// A builder for `ExtractionPipeline`.
///
/// Only the AI provider is required. Prompts default to the built-in templates
/// for the chosen `ExtractionVariant`.
#[derive(Default)]
pub struct ExtractionPipelineBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    variant: ExtractionVariant,
    extraction_prompt: Option<String>,
    verification_prompt: Option<String>,
    verification: VerificationPolicy,
}

impl ExtractionPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Selects the built-in extraction template and its coordinate layout.
    pub fn extraction_variant(mut self, variant: ExtractionVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Replaces the extraction template text.
    pub fn extraction_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.extraction_prompt = Some(prompt.into());
        self
    }

    /// Replaces the verification template text.
    pub fn verification_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.verification_prompt = Some(prompt.into());
        self
    }

    pub fn verification(mut self, policy: VerificationPolicy) -> Self {
        self.verification = policy;
        self
    }

    pub fn build(self) -> Result<ExtractionPipeline, PromptError> {
        let ai_provider = self.ai_provider.ok_or(PromptError::MissingAiProvider)?;

        // A custom extraction prompt may describe any layout.
        let expected_coordinates = match self.extraction_prompt {
            Some(_) => None,
            None => Some(self.variant.coordinate_count()),
        };
        let extraction_prompt = self
            .extraction_prompt
            .unwrap_or_else(|| self.variant.default_prompt().to_string());
        let verification_prompt = self
            .verification_prompt
            .unwrap_or_else(|| VERIFICATION_PROMPT.to_string());

        if extraction_prompt.trim().is_empty() || verification_prompt.trim().is_empty() {
            return Err(PromptError::EmptyPrompt);
        }

        Ok(ExtractionPipeline {
            ai_provider,
            extraction_prompt,
            verification_prompt,
            verification: self.verification,
            expected_coordinates,
        })
    }
}
