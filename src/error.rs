use crate::analytics::error::AnalyticsError;
use crate::providers::error::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NimbusError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to read or fingerprint the dashboard configuration")]
    Config(#[from] serde_json::Error),
}
