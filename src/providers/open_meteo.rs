use crate::nimbus::LatLon;
use crate::providers::error::ProviderError;
use crate::providers::{get_json, parse_payload, WeatherProvider};
use crate::types::forecast::NormalizedForecast;
use crate::types::forecast_type::ForecastType;
use crate::types::time_point::TimePoint;
use chrono::{DateTime, Duration, DurationRound, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const BASE_URL: &str = "https://api.open-meteo.com";
const NAME: &str = "Open-Meteo";
const HOURLY_VARIABLES: &str =
    "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,wind_gusts_10m,cloud_cover";

/// Open-Meteo forecast API. Free, no API key.
///
/// Only serves hourly data. Times come back on the location's local clock
/// (`timezone=auto`) and are shifted to UTC with the reported offset.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    utc_offset_seconds: i64,
    hourly: Hourly,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

impl OpenMeteoProvider {
    pub fn new(client: Client, model: &str) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl WeatherProvider for OpenMeteoProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(
        &self,
        location: LatLon,
        _forecast_type: ForecastType,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let mut query = vec![
            ("latitude", location.0.to_string()),
            ("longitude", location.1.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("timezone", "auto".to_string()),
        ];
        if self.model != "auto" {
            query.push(("models", self.model.clone()));
        }
        get_json(&self.client, &url, &query, &url).await
    }

    fn normalize(
        &self,
        payload: Value,
        _forecast_type: ForecastType,
        now: DateTime<Utc>,
    ) -> Result<NormalizedForecast, ProviderError> {
        let response: Response = parse_payload(NAME, payload)?;
        let hourly = response.hourly;
        let offset = Duration::seconds(response.utc_offset_seconds);
        // The current hour is still of interest.
        let cutoff = now.duration_trunc(Duration::hours(1)).unwrap_or(now);

        let mut data = Vec::with_capacity(hourly.time.len());
        for (i, local) in hourly.time.iter().enumerate() {
            let time = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M")
                .map_err(|_| ProviderError::InvalidTimestamp {
                    provider: NAME,
                    value: local.clone(),
                })?
                .and_utc()
                - offset;
            if time < cutoff {
                continue;
            }

            let clouds = at(&hourly.cloud_cover, i);
            let mut point = TimePoint::new(time);
            point.temperature = at(&hourly.temperature_2m, i);
            point.temp_min = point.temperature;
            point.temp_max = point.temperature;
            point.humidity = at(&hourly.relative_humidity_2m, i);
            point.precipitation = Some(at(&hourly.precipitation, i).unwrap_or(0.0));
            point.wind_speed = at(&hourly.wind_speed_10m, i).map(|kmh| kmh / 3.6);
            point.wind_gusts = at(&hourly.wind_gusts_10m, i).map(|kmh| kmh / 3.6);
            point.clouds = clouds;
            point.sun_hours = clouds.map(|c| (100.0 - c).max(0.0));
            data.push(point);
        }

        Ok(NormalizedForecast {
            data,
            alerts: Vec::new(),
        })
    }
}
