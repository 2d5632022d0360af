//! Names for the numeric channels of a [`TimePoint`].

use crate::analytics::error::AnalyticsError;
use crate::types::time_point::TimePoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A numeric channel of the forecast series, addressed by its dotted path.
///
/// Derived channels such as the apparent temperature bounds live under a nested
/// path (`apparentTemperature.min`), mirroring the JSON shape of [`TimePoint`].
///
/// ```
/// use nimbus::Channel;
///
/// let channel: Channel = "apparentTemperature.max".parse().unwrap();
/// assert_eq!(channel, Channel::ApparentTemperatureMax);
/// assert_eq!(Channel::WindGusts.to_string(), "windGusts");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Temperature,
    TempMin,
    TempMax,
    WindSpeed,
    WindGusts,
    WindDirection,
    Precipitation,
    PrecipitationProb,
    SunHours,
    Clouds,
    Humidity,
    ApparentTemperatureMin,
    ApparentTemperatureAvg,
    ApparentTemperatureMax,
}

impl Channel {
    pub const ALL: [Channel; 14] = [
        Channel::Temperature,
        Channel::TempMin,
        Channel::TempMax,
        Channel::WindSpeed,
        Channel::WindGusts,
        Channel::WindDirection,
        Channel::Precipitation,
        Channel::PrecipitationProb,
        Channel::SunHours,
        Channel::Clouds,
        Channel::Humidity,
        Channel::ApparentTemperatureMin,
        Channel::ApparentTemperatureAvg,
        Channel::ApparentTemperatureMax,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::TempMin => "tempMin",
            Channel::TempMax => "tempMax",
            Channel::WindSpeed => "windSpeed",
            Channel::WindGusts => "windGusts",
            Channel::WindDirection => "windDirection",
            Channel::Precipitation => "precipitation",
            Channel::PrecipitationProb => "precipitationProb",
            Channel::SunHours => "sunHours",
            Channel::Clouds => "clouds",
            Channel::Humidity => "humidity",
            Channel::ApparentTemperatureMin => "apparentTemperature.min",
            Channel::ApparentTemperatureAvg => "apparentTemperature.avg",
            Channel::ApparentTemperatureMax => "apparentTemperature.max",
        }
    }

    /// Reads this channel from a point. `None` when the provider left it out
    /// or the derived value was never computed.
    pub fn value(&self, point: &TimePoint) -> Option<f64> {
        match self {
            Channel::Temperature => point.temperature,
            Channel::TempMin => point.temp_min,
            Channel::TempMax => point.temp_max,
            Channel::WindSpeed => point.wind_speed,
            Channel::WindGusts => point.wind_gusts,
            Channel::WindDirection => point.wind_direction,
            Channel::Precipitation => point.precipitation,
            Channel::PrecipitationProb => point.precipitation_prob,
            Channel::SunHours => point.sun_hours,
            Channel::Clouds => point.clouds,
            Channel::Humidity => point.humidity,
            Channel::ApparentTemperatureMin => point.apparent_temperature.map(|a| a.min),
            Channel::ApparentTemperatureAvg => point.apparent_temperature.map(|a| a.avg),
            Channel::ApparentTemperatureMax => point.apparent_temperature.map(|a| a.max),
        }
    }
}

impl FromStr for Channel {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .find(|c| c.path() == s)
            .copied()
            .ok_or_else(|| AnalyticsError::UnknownChannel(s.to_string()))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        path.parse().map_err(serde::de::Error::custom)
    }
}
