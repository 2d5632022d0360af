//! Dashboard settings consumed by the pipeline and the client.

use crate::analytics::extrema::ExtremaConfig;
use crate::analytics::savitzky_golay::SavitzkyGolayOptions;
use crate::providers::ProviderKind;
use crate::types::channel::Channel;
use crate::types::forecast_type::ForecastType;
use crate::types::units::{TemperatureUnit, WindSpeedUnit};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// User settings of the dashboard.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
///
/// # Examples
///
/// ```
/// use nimbus::{DashboardConfig, ForecastType, ProviderKind, WindSpeedUnit};
///
/// let config = DashboardConfig::from_json(r#"{
///     "provider": "openweathermap",
///     "owmApiToken": "secret",
///     "windSpeedUnit": "knots",
///     "forecastType": "3-hourly"
/// }"#)?;
///
/// assert_eq!(config.provider, ProviderKind::OpenWeatherMap);
/// assert_eq!(config.wind_speed_unit, WindSpeedUnit::Knots);
/// assert_eq!(config.forecast_type, ForecastType::ThreeHourly);
/// assert_eq!(config.location_cache_minutes, 15);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    pub provider: ProviderKind,
    pub owm_api_token: Option<String>,
    pub dmi_api_token: Option<String>,
    /// Open-Meteo weather model, `auto` for the service's best match.
    pub open_meteo_model: String,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub forecast_type: ForecastType,
    pub show_apparent_temperature: bool,
    /// Channels scanned for local extrema.
    pub extrema_channels: Vec<Channel>,
    /// Replaces the per-granularity defaults of [`ForecastType::extrema_config`].
    pub extrema: Option<ExtremaConfig>,
    /// Smooths channels before extrema detection.
    pub smoothing: Option<SavitzkyGolayOptions>,
    /// Timezone of the local clock used for sun times.
    pub timezone: Tz,
    pub location_cache_minutes: u64,
    /// Relative humidity assumed where the provider reports none.
    pub default_humidity: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            owm_api_token: None,
            dmi_api_token: None,
            open_meteo_model: "auto".to_string(),
            temperature_unit: TemperatureUnit::default(),
            wind_speed_unit: WindSpeedUnit::default(),
            forecast_type: ForecastType::default(),
            show_apparent_temperature: true,
            extrema_channels: vec![
                Channel::Temperature,
                Channel::WindSpeed,
                Channel::WindGusts,
                Channel::ApparentTemperatureMin,
                Channel::ApparentTemperatureMax,
            ],
            extrema: None,
            smoothing: None,
            timezone: chrono_tz::Europe::Copenhagen,
            location_cache_minutes: 15,
            default_humidity: 50.0,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Extrema tunables for `forecast_type`, honouring an explicit override.
    pub fn extrema_config(&self, forecast_type: ForecastType) -> ExtremaConfig {
        self.extrema
            .unwrap_or_else(|| forecast_type.extrema_config())
    }

    /// The configured granularity, limited to what the provider serves.
    /// Only OpenWeatherMap offers anything but hourly data.
    pub fn effective_forecast_type(&self) -> ForecastType {
        match self.provider {
            ProviderKind::OpenWeatherMap => self.forecast_type,
            ProviderKind::OpenMeteo | ProviderKind::Dmi => ForecastType::Hourly,
        }
    }
}
