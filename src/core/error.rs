use thiserror::Error;

/// Localized message shown when a response cannot be recovered as JSON.
pub const PARSE_FAILURE_MESSAGE: &str = "فشل في تحليل البيانات الذكية.";

/// The text response was not recoverable as JSON, neither directly nor from
/// an embedded `{...}` block.
#[derive(Debug, Error)]
#[error("{message} ({snippet})")]
pub struct ResponseParseError {
    pub message: String,
    pub snippet: String,
}

impl ResponseParseError {
    pub fn new(raw: &str) -> Self {
        Self {
            message: PARSE_FAILURE_MESSAGE.to_string(),
            snippet: raw.chars().take(120).collect(),
        }
    }
}

/// The remote call itself failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to generative service failed: {0}")]
    Transport(String),
    #[error("generative service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generative service returned error: {0}")]
    Api(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ContentGenerationError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    ResponseParse(#[from] ResponseParseError),
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("a generation run is already in progress")]
    Busy,
    #[error(transparent)]
    Generation(#[from] ContentGenerationError),
}
