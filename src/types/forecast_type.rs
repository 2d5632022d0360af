//! Defines the sampling granularity of a forecast series.

use crate::analytics::error::AnalyticsError;
use crate::analytics::extrema::ExtremaConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The time granularity of a forecast series.
///
/// Granularity is the main input when tuning extrema detection: the same
/// index distance means one hour in an hourly series but three days in a
/// daily one. [`ForecastType::extrema_config`] returns the tuned defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForecastType {
    /// One point per hour.
    #[default]
    #[serde(rename = "hourly")]
    Hourly,
    /// One point every three hours.
    #[serde(rename = "3-hourly")]
    ThreeHourly,
    /// One point per day.
    #[serde(rename = "daily")]
    Daily,
}

impl ForecastType {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            ForecastType::Hourly => "hourly",
            ForecastType::ThreeHourly => "3-hourly",
            ForecastType::Daily => "daily",
        }
    }

    /// Nominal spacing between two consecutive points, in hours.
    pub fn step_hours(&self) -> f64 {
        match self {
            ForecastType::Hourly => 1.0,
            ForecastType::ThreeHourly => 3.0,
            ForecastType::Daily => 24.0,
        }
    }

    /// Extrema detection tunables for this granularity.
    ///
    /// Dense series get a longer decay and a wider separation so that the
    /// ordinary hour-to-hour wobble does not fire new labels.
    pub fn extrema_config(&self) -> ExtremaConfig {
        match self {
            ForecastType::Hourly => ExtremaConfig {
                window_size: 5,
                base_prominence: 3.0,
                decay_distance: 12.0,
                min_separation: 6,
                min_difference: 1.0,
            },
            ForecastType::ThreeHourly => ExtremaConfig {
                window_size: 5,
                base_prominence: 3.0,
                decay_distance: 6.0,
                min_separation: 3,
                min_difference: 1.0,
            },
            ForecastType::Daily => ExtremaConfig {
                window_size: 3,
                base_prominence: 2.0,
                decay_distance: 4.0,
                min_separation: 2,
                min_difference: 1.0,
            },
        }
    }
}

impl FromStr for ForecastType {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(ForecastType::Hourly),
            "3-hourly" => Ok(ForecastType::ThreeHourly),
            "daily" => Ok(ForecastType::Daily),
            other => Err(AnalyticsError::UnknownForecastType(other.to_string())),
        }
    }
}

/// Formats a `ForecastType` using its settings name.
///
/// ```
/// use nimbus::ForecastType;
///
/// assert_eq!(ForecastType::ThreeHourly.to_string(), "3-hourly");
/// assert_eq!(format!("{}", ForecastType::Daily), "daily");
/// ```
impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for ft in [ForecastType::Hourly, ForecastType::ThreeHourly, ForecastType::Daily] {
            assert_eq!(ft.to_string().parse::<ForecastType>().ok(), Some(ft));
        }
        assert!("weekly".parse::<ForecastType>().is_err());
    }

    #[test]
    fn test_denser_series_use_longer_decay() {
        let hourly = ForecastType::Hourly.extrema_config();
        let three_hourly = ForecastType::ThreeHourly.extrema_config();
        assert!(hourly.decay_distance > three_hourly.decay_distance);
        assert!(hourly.min_separation > three_hourly.min_separation);
    }

    #[test]
    fn test_serde_names_match_settings() {
        let json = serde_json::to_string(&ForecastType::ThreeHourly).unwrap();
        assert_eq!(json, "\"3-hourly\"");
    }
}
