use crate::types::alert::WeatherAlert;
use crate::types::time_point::TimePoint;
use serde::{Deserialize, Serialize};

/// A provider response brought into the common shape: chronological points
/// in °C, m/s, mm and %, plus any weather alerts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub data: Vec<TimePoint>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

/// The annotated, display-ready series returned by the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessedForecast {
    pub data: Vec<TimePoint>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}
