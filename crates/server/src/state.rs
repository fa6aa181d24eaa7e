//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The state is immutable once built: the loaded
//! configuration and the extraction pipeline, both behind `Arc`.

use crate::config::AppConfig;
use litlens::{
    constants::gemini_generate_url,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    ExtractionPipeline,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<ExtractionPipeline>,
}

/// Instantiates the AI provider selected by the configuration.
pub fn build_ai_provider(config: &AppConfig) -> anyhow::Result<Box<dyn AiProvider>> {
    let provider: Box<dyn AiProvider> = match config.ai_provider.as_str() {
        "gemini" => {
            let api_key = config
                .gemini_api_key
                .clone()
                .ok_or_else(|| {
                    anyhow::anyhow!("GEMINI_API_KEY is required for the gemini provider")
                })?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = config
                .ai_api_url
                .clone()
                .unwrap_or_else(|| gemini_generate_url(&config.model_name));
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config
                .ai_api_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("AI_API_URL is required for the local provider"))?;
            Box::new(LocalAiProvider::new(
                api_url,
                config.ai_api_key.clone(),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(anyhow::anyhow!("Unsupported AI provider: {other}"));
        }
    };
    Ok(provider)
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = build_ai_provider(&config)?;
    build_app_state_with_provider(config, ai_provider)
}

/// Builds the state around an already constructed provider.
pub fn build_app_state_with_provider(
    config: AppConfig,
    ai_provider: Box<dyn AiProvider>,
) -> anyhow::Result<AppState> {
    let mut builder = ExtractionPipeline::builder()
        .ai_provider(ai_provider)
        .extraction_variant(config.extraction_variant)
        .verification(config.verification);
    if let Some(prompt) = &config.prompts.extraction {
        builder = builder.extraction_prompt(prompt.clone());
    }
    if let Some(prompt) = &config.prompts.verification {
        builder = builder.verification_prompt(prompt.clone());
    }
    let pipeline = builder.build()?;

    info!(
        provider = %config.ai_provider,
        model = %config.model_name,
        extraction_variant = ?config.extraction_variant,
        verification = ?config.verification,
        "Initialized extraction pipeline."
    );

    Ok(AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
    })
}
