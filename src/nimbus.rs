//! The main entry point: fetches a forecast from the configured provider and
//! runs it through the analytics pipeline, with caching per location.

use crate::analytics::assembler::SeriesAssembler;
use crate::cache::{CacheKey, ForecastCache, MemoryCache};
use crate::config::DashboardConfig;
use crate::error::NimbusError;
use crate::providers::{default_client, Provider, WeatherProvider};
use crate::types::forecast::ProcessedForecast;
use crate::types::forecast_type::ForecastType;
use bon::bon;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use nimbus::LatLon;
///
/// let copenhagen = LatLon(55.6761, 12.5683);
/// assert_eq!(copenhagen.0, 55.6761); // Latitude
/// assert_eq!(copenhagen.1, 12.5683); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// The client for fetching annotated forecasts.
///
/// Holds the dashboard settings, the provider they select and a cache of
/// processed forecasts. Create one with [`Nimbus::new()`] for an in-memory
/// cache or [`Nimbus::with_cache()`] to share a cache between clients.
///
/// # Examples
///
/// ```rust
/// # use nimbus::{DashboardConfig, LatLon, Nimbus, NimbusError};
/// # async fn run() -> Result<(), NimbusError> {
/// let client = Nimbus::new(DashboardConfig::default())?;
/// let forecast = client
///     .forecast()
///     .location(LatLon(55.68, 12.57))
///     .call()
///     .await?;
/// println!("{} points, {} alerts", forecast.data.len(), forecast.alerts.len());
/// # Ok(())
/// # }
/// ```
pub struct Nimbus {
    config: DashboardConfig,
    provider: Provider,
    cache: Arc<dyn ForecastCache>,
}

#[bon]
impl Nimbus {
    /// Creates a client for `config` with a fresh [`MemoryCache`].
    ///
    /// # Errors
    ///
    /// Returns [`NimbusError::Provider`] when the selected provider needs an
    /// API token that is not configured, or the HTTP client cannot be built.
    pub fn new(config: DashboardConfig) -> Result<Self, NimbusError> {
        Self::with_cache(config, Arc::new(MemoryCache::new()))
    }

    /// Creates a client for `config` that stores results in `cache`.
    pub fn with_cache(
        config: DashboardConfig,
        cache: Arc<dyn ForecastCache>,
    ) -> Result<Self, NimbusError> {
        let provider = Provider::from_config(&config, default_client()?)?;
        Ok(Self::with_provider(config, provider, cache))
    }

    /// Creates a client around an already built provider.
    pub fn with_provider(
        config: DashboardConfig,
        provider: Provider,
        cache: Arc<dyn ForecastCache>,
    ) -> Self {
        Self {
            config,
            provider,
            cache,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Fetches and annotates the forecast for a location.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** Where to forecast.
    /// * `.forecast_type(ForecastType)`: Optional. Granularity of the series.
    ///   Defaults to the configured granularity, limited to what the provider
    ///   serves.
    ///
    /// A cached result for the same provider, rounded location and settings
    /// is returned without a request while it is younger than
    /// `location_cache_minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`NimbusError::Provider`] for network, HTTP status and payload
    /// errors, and [`NimbusError::Analytics`] when the pipeline rejects its
    /// parameters.
    #[builder]
    pub async fn forecast(
        &self,
        location: LatLon,
        forecast_type: Option<ForecastType>,
    ) -> Result<ProcessedForecast, NimbusError> {
        let forecast_type = forecast_type.unwrap_or_else(|| self.config.effective_forecast_type());
        let key = CacheKey::new(&self.config, location, forecast_type)?;

        if let Some(cached) = self.cache.get(&key) {
            debug!(
                "Using cached {} forecast for {:.2},{:.2}",
                forecast_type, location.0, location.1
            );
            return Ok(cached);
        }

        let payload = self.provider.fetch(location, forecast_type).await?;
        let normalized = self
            .provider
            .normalize(payload, forecast_type, Utc::now())?;
        info!(
            "{} returned {} points for {:.2},{:.2}",
            self.provider.name(),
            normalized.data.len(),
            location.0,
            location.1
        );

        let processed =
            SeriesAssembler::new(&self.config, forecast_type).process(normalized, location)?;

        let ttl = Duration::from_secs(self.config.location_cache_minutes * 60);
        self.cache.insert(key, processed.clone(), ttl);
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::error::AnalyticsError;
    use crate::analytics::savitzky_golay::SavitzkyGolayOptions;
    use crate::providers::error::ProviderError;
    use crate::providers::open_meteo::OpenMeteoProvider;
    use crate::providers::ProviderKind;
    use crate::types::units::TemperatureUnit;
    use chrono::{DurationRound, TimeDelta};
    use reqwest::Client;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CPH: LatLon = LatLon(55.68, 12.57);

    /// 48 hourly Open-Meteo values starting at the next full hour, in UTC.
    fn open_meteo_payload() -> Value {
        let start = Utc::now().duration_trunc(TimeDelta::hours(1)).unwrap() + TimeDelta::hours(1);
        let hours: Vec<_> = (0..48).map(|h| start + TimeDelta::hours(h)).collect();
        json!({
            "utc_offset_seconds": 0,
            "hourly": {
                "time": hours.iter().map(|t| t.format("%Y-%m-%dT%H:%M").to_string()).collect::<Vec<_>>(),
                "temperature_2m": (0..48).map(|h| 12.0 + 6.0 * ((h as f64) / 24.0 * std::f64::consts::TAU).sin()).collect::<Vec<_>>(),
                "relative_humidity_2m": vec![70.0; 48],
                "precipitation": (0..48).map(|h| if h == 10 || h == 11 { 0.6 } else { 0.0 }).collect::<Vec<_>>(),
                "wind_speed_10m": vec![18.0; 48],
                "wind_gusts_10m": vec![30.0; 48],
                "cloud_cover": vec![40.0; 48],
            }
        })
    }

    fn client(server: &MockServer, config: DashboardConfig) -> Nimbus {
        let provider = Provider::OpenMeteo(
            OpenMeteoProvider::new(Client::new(), &config.open_meteo_model)
                .with_base_url(&server.uri()),
        );
        Nimbus::with_provider(config, provider, Arc::new(MemoryCache::new()))
    }

    #[tokio::test]
    async fn test_forecast_is_processed_and_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_payload()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let nimbus = client(&mock_server, DashboardConfig::default());
        let first = nimbus.forecast().location(CPH).call().await.unwrap();

        assert_eq!(first.data.len(), 48);
        assert!(first.data.iter().all(|p| p.apparent_temperature.is_some()));
        assert!(first.data.iter().any(|p| p.precipitation_group.is_some()));
        assert!(first.data.iter().any(|p| p.extrema.is_some()));

        // Served from the cache, the mock only allows one request.
        let second = nimbus
            .forecast()
            .location(LatLon(55.6801, 12.5699))
            .call()
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_display_units_from_config() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_payload()))
            .mount(&mock_server)
            .await;

        let config = DashboardConfig {
            temperature_unit: TemperatureUnit::Kelvin,
            ..Default::default()
        };
        let forecast = client(&mock_server, config)
            .forecast()
            .location(CPH)
            .forecast_type(ForecastType::Hourly)
            .call()
            .await
            .unwrap();

        assert!(forecast
            .data
            .iter()
            .all(|p| p.temperature.is_some_and(|t| t > 250.0)));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server, DashboardConfig::default())
            .forecast()
            .location(CPH)
            .call()
            .await;
        assert!(matches!(
            result,
            Err(NimbusError::Provider(ProviderError::HttpStatus { .. }))
        ));
    }

    #[tokio::test]
    async fn test_analytics_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_payload()))
            .mount(&mock_server)
            .await;

        let config = DashboardConfig {
            smoothing: Some(SavitzkyGolayOptions {
                window_size: 4,
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = client(&mock_server, config)
            .forecast()
            .location(CPH)
            .call()
            .await;
        assert!(matches!(
            result,
            Err(NimbusError::Analytics(AnalyticsError::InvalidFilterParameters(_)))
        ));
    }

    #[test]
    fn test_missing_token_fails_construction() {
        let config = DashboardConfig {
            provider: ProviderKind::OpenWeatherMap,
            ..Default::default()
        };
        assert!(matches!(
            Nimbus::new(config),
            Err(NimbusError::Provider(ProviderError::MissingApiToken(_)))
        ));
    }

    #[test]
    fn test_new_selects_configured_provider() {
        let config = DashboardConfig {
            provider: ProviderKind::Dmi,
            dmi_api_token: Some("key".to_string()),
            ..Default::default()
        };
        let nimbus = Nimbus::new(config).unwrap();
        assert_eq!(nimbus.provider().kind(), ProviderKind::Dmi);
        assert_eq!(nimbus.config().provider, ProviderKind::Dmi);
    }
}
