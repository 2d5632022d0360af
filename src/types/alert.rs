use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A severe-weather warning issued by a provider for the requested location.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub sender_name: String,
    pub event: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
