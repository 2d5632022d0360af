use crate::nimbus::LatLon;
use crate::providers::error::ProviderError;
use crate::providers::{get_json, parse_payload, WeatherProvider};
use crate::types::alert::WeatherAlert;
use crate::types::forecast::NormalizedForecast;
use crate::types::forecast_type::ForecastType;
use crate::types::time_point::TimePoint;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const BASE_URL: &str = "https://api.openweathermap.org";
const NAME: &str = "OpenWeatherMap";

/// OpenWeatherMap. Needs an API key.
///
/// Hourly and daily series come from One Call 3.0, the 3-hourly series from
/// the 2.5 forecast endpoint. Requests ask for metric units, so values arrive
/// in °C and m/s already.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    client: Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct OneCall {
    #[serde(default)]
    hourly: Vec<HourlyItem>,
    #[serde(default)]
    daily: Vec<DailyItem>,
    #[serde(default)]
    alerts: Vec<AlertItem>,
}

#[derive(Debug, Deserialize)]
struct HourlyItem {
    dt: i64,
    temp: f64,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    wind_gust: Option<f64>,
    wind_deg: Option<f64>,
    clouds: Option<f64>,
    pop: Option<f64>,
    rain: Option<Rain>,
}

#[derive(Debug, Deserialize)]
struct DailyItem {
    dt: i64,
    temp: DailyTemp,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    wind_gust: Option<f64>,
    wind_deg: Option<f64>,
    clouds: Option<f64>,
    pop: Option<f64>,
    rain: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    day: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct Rain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AlertItem {
    start: i64,
    end: i64,
    sender_name: String,
    event: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ThreeHourly {
    list: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    dt: i64,
    main: Main,
    wind: Option<Wind>,
    clouds: Option<Clouds>,
    pop: Option<f64>,
    rain: Option<Rain>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: Option<f64>,
    gust: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Clouds {
    all: Option<f64>,
}

impl OpenWeatherMapProvider {
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

fn timestamp(dt: i64) -> Result<DateTime<Utc>, ProviderError> {
    DateTime::from_timestamp(dt, 0).ok_or_else(|| ProviderError::InvalidTimestamp {
        provider: NAME,
        value: dt.to_string(),
    })
}

fn probability_pct(pop: Option<f64>) -> Option<f64> {
    Some((pop.unwrap_or(0.0) * 100.0).round())
}

fn sun_from_clouds(clouds: Option<f64>) -> Option<f64> {
    clouds.map(|c| (100.0 - c).max(0.0))
}

impl WeatherProvider for OpenWeatherMapProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(
        &self,
        location: LatLon,
        forecast_type: ForecastType,
    ) -> Result<Value, ProviderError> {
        let mut query = vec![
            ("lat", location.0.to_string()),
            ("lon", location.1.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_token.clone()),
        ];
        let path = match forecast_type {
            ForecastType::Hourly => {
                query.push(("exclude", "daily,minutely,current".to_string()));
                "/data/3.0/onecall"
            }
            ForecastType::Daily => {
                query.push(("exclude", "current,minutely,hourly".to_string()));
                "/data/3.0/onecall"
            }
            ForecastType::ThreeHourly => "/data/2.5/forecast",
        };
        let url = format!("{}{}", self.base_url, path);
        let label = format!("{} {} forecast", NAME, forecast_type);
        get_json(&self.client, &url, &query, &label).await
    }

    fn normalize(
        &self,
        payload: Value,
        forecast_type: ForecastType,
        _now: DateTime<Utc>,
    ) -> Result<NormalizedForecast, ProviderError> {
        match forecast_type {
            ForecastType::ThreeHourly => {
                let response: ThreeHourly = parse_payload(NAME, payload)?;
                let data = response
                    .list
                    .into_iter()
                    .map(three_hourly_point)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(NormalizedForecast {
                    data,
                    alerts: Vec::new(),
                })
            }
            ForecastType::Hourly | ForecastType::Daily => {
                let response: OneCall = parse_payload(NAME, payload)?;
                let data = if forecast_type == ForecastType::Daily {
                    response
                        .daily
                        .into_iter()
                        .map(daily_point)
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    response
                        .hourly
                        .into_iter()
                        .map(hourly_point)
                        .collect::<Result<Vec<_>, _>>()?
                };
                let alerts = response
                    .alerts
                    .into_iter()
                    .map(|a| -> Result<WeatherAlert, ProviderError> {
                        Ok(WeatherAlert {
                            start: timestamp(a.start)?,
                            end: timestamp(a.end)?,
                            sender_name: a.sender_name,
                            event: a.event,
                            description: a.description,
                            tags: a.tags,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(NormalizedForecast { data, alerts })
            }
        }
    }
}

fn hourly_point(item: HourlyItem) -> Result<TimePoint, ProviderError> {
    let mut point = TimePoint::new(timestamp(item.dt)?);
    point.temperature = Some(item.temp);
    point.temp_min = Some(item.temp);
    point.temp_max = Some(item.temp);
    point.humidity = item.humidity;
    point.precipitation = Some(item.rain.and_then(|r| r.one_hour).unwrap_or(0.0));
    point.precipitation_prob = probability_pct(item.pop);
    point.wind_speed = item.wind_speed;
    point.wind_gusts = item.wind_gust;
    point.wind_direction = item.wind_deg;
    point.clouds = item.clouds;
    point.sun_hours = sun_from_clouds(item.clouds);
    Ok(point)
}

fn three_hourly_point(item: ListItem) -> Result<TimePoint, ProviderError> {
    let clouds = item.clouds.and_then(|c| c.all);
    let mut point = TimePoint::new(timestamp(item.dt)?);
    point.temperature = Some(item.main.temp);
    point.temp_min = Some(item.main.temp_min);
    point.temp_max = Some(item.main.temp_max);
    point.humidity = item.main.humidity;
    point.precipitation = Some(item.rain.and_then(|r| r.three_hours).unwrap_or(0.0));
    point.precipitation_prob = probability_pct(item.pop);
    if let Some(wind) = item.wind {
        point.wind_speed = wind.speed;
        point.wind_gusts = wind.gust;
        point.wind_direction = wind.deg;
    }
    point.clouds = clouds;
    point.sun_hours = sun_from_clouds(clouds);
    Ok(point)
}

fn daily_point(item: DailyItem) -> Result<TimePoint, ProviderError> {
    let mut point = TimePoint::new(timestamp(item.dt)?);
    point.temperature = Some(item.temp.day);
    point.temp_min = Some(item.temp.min);
    point.temp_max = Some(item.temp.max);
    point.humidity = item.humidity;
    point.precipitation = Some(item.rain.unwrap_or(0.0));
    point.precipitation_prob = probability_pct(item.pop);
    point.wind_speed = item.wind_speed;
    point.wind_gusts = item.wind_gust;
    point.wind_direction = item.wind_deg;
    point.clouds = item.clouds;
    point.sun_hours = sun_from_clouds(item.clouds);
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider() -> OpenWeatherMapProvider {
        OpenWeatherMapProvider::new(Client::new(), "test_token")
    }

    #[test]
    fn test_hourly_with_alerts() {
        let payload = json!({
            "hourly": [
                {"dt": 1718960400, "temp": 17.2, "humidity": 70, "wind_speed": 4.1,
                 "wind_gust": 7.9, "wind_deg": 240, "clouds": 75, "pop": 0.46,
                 "rain": {"1h": 0.8}},
                {"dt": 1718964000, "temp": 16.8, "clouds": 100}
            ],
            "alerts": [
                {"sender_name": "DMI", "event": "Thunderstorm", "start": 1718960400,
                 "end": 1718982000, "description": "Local thunderstorms", "tags": ["Thunderstorm"]}
            ]
        });
        let forecast = provider()
            .normalize(payload, ForecastType::Hourly, Utc::now())
            .unwrap();

        assert_eq!(forecast.data.len(), 2);
        let first = &forecast.data[0];
        assert_eq!(first.time, Utc.with_ymd_and_hms(2024, 6, 21, 9, 0, 0).unwrap());
        assert_eq!(first.precipitation, Some(0.8));
        assert_eq!(first.precipitation_prob, Some(46.0));
        assert_eq!(first.sun_hours, Some(25.0));
        assert_eq!(first.wind_direction, Some(240.0));

        let second = &forecast.data[1];
        assert_eq!(second.precipitation, Some(0.0));
        assert_eq!(second.precipitation_prob, Some(0.0));
        assert_eq!(second.wind_speed, None);

        assert_eq!(forecast.alerts.len(), 1);
        assert_eq!(forecast.alerts[0].event, "Thunderstorm");
        assert_eq!(forecast.alerts[0].sender_name, "DMI");
    }

    #[test]
    fn test_daily() {
        let payload = json!({
            "daily": [
                {"dt": 1718964000, "temp": {"day": 21.0, "min": 12.5, "max": 23.0},
                 "wind_speed": 5.5, "clouds": 40, "pop": 0.2, "rain": 1.7}
            ]
        });
        let forecast = provider()
            .normalize(payload, ForecastType::Daily, Utc::now())
            .unwrap();
        let day = &forecast.data[0];
        assert_eq!(day.temperature, Some(21.0));
        assert_eq!(day.temp_min, Some(12.5));
        assert_eq!(day.temp_max, Some(23.0));
        assert_eq!(day.precipitation, Some(1.7));
        assert!(forecast.alerts.is_empty());
    }

    #[test]
    fn test_three_hourly() {
        let payload = json!({
            "cod": "200",
            "list": [
                {"dt": 1718960400, "main": {"temp": 15.0, "temp_min": 14.0, "temp_max": 16.0, "humidity": 81},
                 "wind": {"speed": 3.0, "gust": 6.5, "deg": 200}, "clouds": {"all": 90},
                 "pop": 1.0, "rain": {"3h": 2.25}}
            ]
        });
        let forecast = provider()
            .normalize(payload, ForecastType::ThreeHourly, Utc::now())
            .unwrap();
        let point = &forecast.data[0];
        assert_eq!(point.precipitation, Some(2.25));
        assert_eq!(point.wind_gusts, Some(6.5));
        assert_eq!(point.clouds, Some(90.0));
        assert_eq!(point.precipitation_prob, Some(100.0));
        assert_eq!(point.humidity, Some(81.0));
    }

    #[tokio::test]
    async fn test_fetch_picks_endpoint_by_granularity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("appid", "test_token"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .and(query_param("exclude", "current,minutely,hourly"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"daily": []})))
            .mount(&mock_server)
            .await;

        let provider = provider().with_base_url(&mock_server.uri());
        let three_hourly = provider
            .fetch(LatLon(55.68, 12.57), ForecastType::ThreeHourly)
            .await
            .unwrap();
        assert!(three_hourly.get("list").is_some());

        let daily = provider
            .fetch(LatLon(55.68, 12.57), ForecastType::Daily)
            .await
            .unwrap();
        assert!(daily.get("daily").is_some());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = provider()
            .with_base_url(&mock_server.uri())
            .fetch(LatLon(55.68, 12.57), ForecastType::Hourly)
            .await;
        match result {
            Err(ProviderError::HttpStatus { url, status, .. }) => {
                assert_eq!(status.as_u16(), 401);
                assert!(!url.contains("test_token"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }
}
