//! Weather data vendors.
//!
//! Each vendor fetches its own payload and normalizes it into a
//! [`NormalizedForecast`]. Nothing downstream of `normalize` knows which
//! vendor produced a series.

pub mod dmi;
pub mod error;
pub mod open_meteo;
pub mod open_weather_map;

use crate::config::DashboardConfig;
use crate::nimbus::LatLon;
use crate::providers::dmi::DmiProvider;
use crate::providers::error::ProviderError;
use crate::providers::open_meteo::OpenMeteoProvider;
use crate::providers::open_weather_map::OpenWeatherMapProvider;
use crate::types::forecast::NormalizedForecast;
use crate::types::forecast_type::ForecastType;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

pub const USER_AGENT: &str = "Nimbus weather/1.0";

/// A source of forecast data.
pub trait WeatherProvider {
    /// Human readable vendor name.
    fn name(&self) -> &'static str;

    /// Downloads the raw vendor payload for `location`.
    fn fetch(
        &self,
        location: LatLon,
        forecast_type: ForecastType,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;

    /// Brings a payload returned by [`WeatherProvider::fetch`] into the
    /// common series shape. `now` lets vendors drop points from the past.
    fn normalize(
        &self,
        payload: Value,
        forecast_type: ForecastType,
        now: DateTime<Utc>,
    ) -> Result<NormalizedForecast, ProviderError>;
}

/// The vendors a dashboard can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenMeteo,
    OpenWeatherMap,
    Dmi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenMeteo => "openmeteo",
            ProviderKind::OpenWeatherMap => "openweathermap",
            ProviderKind::Dmi => "dmi",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openmeteo" => Ok(ProviderKind::OpenMeteo),
            "openweathermap" => Ok(ProviderKind::OpenWeatherMap),
            "dmi" => Ok(ProviderKind::Dmi),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispatches to the configured vendor.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenMeteo(OpenMeteoProvider),
    OpenWeatherMap(OpenWeatherMapProvider),
    Dmi(DmiProvider),
}

impl Provider {
    /// Builds the provider selected in `config`, failing early when it needs
    /// an API token that is not configured.
    pub fn from_config(config: &DashboardConfig, client: Client) -> Result<Self, ProviderError> {
        let provider = match config.provider {
            ProviderKind::OpenMeteo => Provider::OpenMeteo(OpenMeteoProvider::new(
                client,
                &config.open_meteo_model,
            )),
            ProviderKind::OpenWeatherMap => {
                let token = non_empty(&config.owm_api_token)
                    .ok_or(ProviderError::MissingApiToken("OpenWeatherMap"))?;
                Provider::OpenWeatherMap(OpenWeatherMapProvider::new(client, token))
            }
            ProviderKind::Dmi => {
                let token =
                    non_empty(&config.dmi_api_token).ok_or(ProviderError::MissingApiToken("DMI"))?;
                Provider::Dmi(DmiProvider::new(client, token))
            }
        };
        debug!("Using weather provider {}", provider.name());
        Ok(provider)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenMeteo(_) => ProviderKind::OpenMeteo,
            Provider::OpenWeatherMap(_) => ProviderKind::OpenWeatherMap,
            Provider::Dmi(_) => ProviderKind::Dmi,
        }
    }
}

impl WeatherProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::OpenMeteo(p) => p.name(),
            Provider::OpenWeatherMap(p) => p.name(),
            Provider::Dmi(p) => p.name(),
        }
    }

    async fn fetch(
        &self,
        location: LatLon,
        forecast_type: ForecastType,
    ) -> Result<Value, ProviderError> {
        match self {
            Provider::OpenMeteo(p) => p.fetch(location, forecast_type).await,
            Provider::OpenWeatherMap(p) => p.fetch(location, forecast_type).await,
            Provider::Dmi(p) => p.fetch(location, forecast_type).await,
        }
    }

    fn normalize(
        &self,
        payload: Value,
        forecast_type: ForecastType,
        now: DateTime<Utc>,
    ) -> Result<NormalizedForecast, ProviderError> {
        match self {
            Provider::OpenMeteo(p) => p.normalize(payload, forecast_type, now),
            Provider::OpenWeatherMap(p) => p.normalize(payload, forecast_type, now),
            Provider::Dmi(p) => p.normalize(payload, forecast_type, now),
        }
    }
}

/// HTTP client shared by all providers.
pub fn default_client() -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(ProviderError::ClientBuild)
}

/// GETs `url` with `query` and decodes the JSON body.
///
/// `label` names the request in errors and logs; unlike the full URL it
/// never carries an API key.
pub(crate) async fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    label: &str,
) -> Result<Value, ProviderError> {
    debug!("Requesting {}", label);
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::NetworkRequest(label.to_string(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            warn!("HTTP error for {}: {:?}", label, e.status());
            return Err(if let Some(status) = e.status() {
                ProviderError::HttpStatus {
                    url: label.to_string(),
                    status,
                    source: e,
                }
            } else {
                ProviderError::NetworkRequest(label.to_string(), e)
            });
        }
    };

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::JsonParse(label.to_string(), e))
}

pub(crate) fn parse_payload<T: DeserializeOwned>(
    provider: &'static str,
    payload: Value,
) -> Result<T, ProviderError> {
    serde_json::from_value(payload)
        .map_err(|source| ProviderError::UnexpectedPayload { provider, source })
}

fn non_empty(token: &Option<String>) -> Option<&str> {
    token.as_deref().filter(|t| !t.trim().is_empty())
}
