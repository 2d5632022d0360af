use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response from {0} is not valid JSON")]
    JsonParse(String, #[source] reqwest::Error),

    #[error("Please configure your {0} API token")]
    MissingApiToken(&'static str),

    #[error("Unknown weather provider '{0}'")]
    UnknownProvider(String),

    #[error("{provider} response does not have the expected shape")]
    UnexpectedPayload {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} returned an unreadable timestamp '{value}'")]
    InvalidTimestamp { provider: &'static str, value: String },
}
