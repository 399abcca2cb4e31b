use thiserror::Error;

/// Errors raised while talking to an AI provider.
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
    #[error("AI provider returned no choices")]
    EmptyResponse,
}

/// Errors raised by the keyword extractor.
///
/// An `Ok` result with zero keywords means the model genuinely found nothing;
/// these variants cover the cases where the extractor could not get an answer.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Keyword request to the AI provider failed: {0}")]
    Provider(#[from] PromptError),
    #[error("Model reply is not valid keyword JSON: {source}")]
    MalformedReply {
        #[source]
        source: serde_json::Error,
        /// The sanitised text that failed to parse.
        cleaned: String,
    },
}
