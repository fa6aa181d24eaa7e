use thiserror::Error;

/// Errors raised by the model gateway.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("API key is missing")]
    MissingApiKey,
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("Pipeline is missing an AI provider")]
    MissingAiProvider,
}

/// A failure in one stage of the extraction-verification pipeline.
///
/// Each variant wraps the gateway error that ended the run. No partial result
/// survives a failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Extraction stage failed: {0}")]
    Extraction(#[source] PromptError),
    #[error("Verification stage failed: {0}")]
    Verification(#[source] PromptError),
}

impl PipelineError {
    /// The gateway error behind this failure.
    pub fn prompt_error(&self) -> &PromptError {
        match self {
            PipelineError::Extraction(e) | PipelineError::Verification(e) => e,
        }
    }
}

/// Ways a CSV text can break the `title,author,coordinates` contract.
#[derive(Error, Debug)]
pub enum CsvContractError {
    #[error("CSV is empty; expected header `title,author,coordinates`")]
    MissingHeader,
    #[error("Unexpected CSV header: `{0}`")]
    WrongHeader(String),
    #[error("Line {line}: expected 3 fields, found {found}")]
    WrongFieldCount { line: u64, found: usize },
    #[error("Line {line}: every field must be enclosed in double quotes")]
    UnquotedField { line: u64 },
    #[error("Line {line}: coordinates `{value}` are not a bracketed list of numbers")]
    MalformedCoordinates { line: u64, value: String },
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}
