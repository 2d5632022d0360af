//! Measurement units understood by the conversion helpers in [`crate::analytics::convert`].

use crate::analytics::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a temperature value is expressed in.
///
/// Providers hand the pipeline degrees Celsius; the other variants only matter
/// at the edges (provider payloads in Kelvin, display preferences in Fahrenheit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn name(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Kelvin => "kelvin",
        }
    }

    /// Short label used next to values in a chart axis.
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "celsius" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "kelvin" => Ok(TemperatureUnit::Kelvin),
            other => Err(AnalyticsError::InvalidUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unit a wind speed value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    /// Metres per second, the unit the pipeline works in.
    #[default]
    Ms,
    Kmh,
    Mph,
    Knots,
}

impl WindSpeedUnit {
    pub fn name(&self) -> &'static str {
        match self {
            WindSpeedUnit::Ms => "ms",
            WindSpeedUnit::Kmh => "kmh",
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Knots => "knots",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WindSpeedUnit::Ms => "m/s",
            WindSpeedUnit::Kmh => "km/h",
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Knots => "kn",
        }
    }
}

impl FromStr for WindSpeedUnit {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" => Ok(WindSpeedUnit::Ms),
            "kmh" => Ok(WindSpeedUnit::Kmh),
            "mph" => Ok(WindSpeedUnit::Mph),
            "knots" => Ok(WindSpeedUnit::Knots),
            other => Err(AnalyticsError::InvalidUnit(other.to_string())),
        }
    }
}

impl fmt::Display for WindSpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
