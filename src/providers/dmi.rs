use crate::analytics::convert::to_celsius;
use crate::nimbus::LatLon;
use crate::providers::error::ProviderError;
use crate::providers::{get_json, parse_payload, WeatherProvider};
use crate::types::forecast::NormalizedForecast;
use crate::types::forecast_type::ForecastType;
use crate::types::time_point::TimePoint;
use crate::types::units::TemperatureUnit;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const BASE_URL: &str = "https://dmigw.govcloud.dk";
const NAME: &str = "DMI";
const COLLECTION: &str = "harmonie_dini_sf";
const PARAMETERS: &str =
    "wind-speed,temperature-2m,wind-dir-10m,cloud-transmittance,total-precipitation";

/// Danish Meteorological Institute, HARMONIE model via the EDR API.
///
/// Needs an API key. Temperatures arrive in Kelvin and cloud cover as a
/// transmittance fraction.
#[derive(Debug, Clone)]
pub struct DmiProvider {
    client: Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Properties {
    step: DateTime<Utc>,
    #[serde(rename = "temperature-2m")]
    temperature_2m: Option<f64>,
    total_precipitation: Option<f64>,
    wind_speed: Option<f64>,
    #[serde(rename = "wind-dir-10m")]
    wind_dir_10m: Option<f64>,
    cloud_transmittance: Option<f64>,
}

impl DmiProvider {
    pub fn new(client: Client, api_token: &str) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_token: api_token.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl WeatherProvider for DmiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(
        &self,
        location: LatLon,
        _forecast_type: ForecastType,
    ) -> Result<Value, ProviderError> {
        let LatLon(lat, lon) = location;
        let url = format!(
            "{}/v1/forecastedr/collections/{}/position",
            self.base_url, COLLECTION
        );
        let query = [
            ("coords", format!("POINT({} {})", lon, lat)),
            ("crs", "crs84".to_string()),
            ("f", "GeoJSON".to_string()),
            ("parameter-name", PARAMETERS.to_string()),
            ("api-key", self.api_token.clone()),
        ];
        let label = format!("{} {} position", NAME, COLLECTION);
        get_json(&self.client, &url, &query, &label).await
    }

    fn normalize(
        &self,
        payload: Value,
        _forecast_type: ForecastType,
        _now: DateTime<Utc>,
    ) -> Result<NormalizedForecast, ProviderError> {
        let collection: FeatureCollection = parse_payload(NAME, payload)?;
        let data = collection
            .features
            .into_iter()
            .map(|feature| {
                let p = feature.properties;
                let mut point = TimePoint::new(p.step);
                point.temperature = p
                    .temperature_2m
                    .map(|k| to_celsius(k, TemperatureUnit::Kelvin));
                point.precipitation = p.total_precipitation;
                point.wind_speed = p.wind_speed;
                point.wind_direction = p.wind_dir_10m;
                point.clouds = p
                    .cloud_transmittance
                    .map(|t| 100.0 * (1.0 - t).max(0.0));
                point.sun_hours = p.cloud_transmittance.map(|t| 100.0 * t);
                point
            })
            .collect();

        Ok(NormalizedForecast {
            data,
            alerts: Vec::new(),
        })
    }
}
