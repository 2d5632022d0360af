//! Runs the analytics stages over a normalized series, in order.

use crate::analytics::apparent_temperature::calculate;
use crate::analytics::convert::convert_series_units;
use crate::analytics::daylight::correct_sun_hours;
use crate::analytics::error::AnalyticsError;
use crate::analytics::extrema::ExtremaDetector;
use crate::analytics::precipitation::group_precipitation;
use crate::config::DashboardConfig;
use crate::nimbus::LatLon;
use crate::types::channel::Channel;
use crate::types::forecast::{NormalizedForecast, ProcessedForecast};
use crate::types::forecast_type::ForecastType;
use crate::types::time_point::{ApparentTemperature, TimePoint, WindComparison};
use crate::types::units::{TemperatureUnit, WindSpeedUnit};
use chrono_tz::Tz;
use log::{debug, info};

/// The analytics pipeline, configured once and applied to any number of
/// series.
///
/// Stages run in this order:
///
/// 1. sun hours outside daylight are cleared,
/// 2. apparent temperature is computed (when enabled),
/// 3. extrema are marked on the configured channels,
/// 4. precipitation runs are grouped,
/// 5. temperatures and wind speeds are converted to the display units.
///
/// Apparent temperature has to exist before extrema detection can look at
/// its channels, and extrema thresholds are expressed in °C and m/s, so the
/// unit conversion comes last.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use nimbus::{DashboardConfig, ForecastType, LatLon, NormalizedForecast, SeriesAssembler, TimePoint};
///
/// let start = Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap();
/// let data = (0..24)
///     .map(|h| {
///         let mut p = TimePoint::new(start + Duration::hours(h));
///         p.temperature = Some(20.0 - (h as f64 - 13.0).abs() * 0.6);
///         p
///     })
///     .collect();
///
/// let assembler = SeriesAssembler::new(&DashboardConfig::default(), ForecastType::Hourly);
/// let processed = assembler.process(NormalizedForecast { data, alerts: vec![] }, LatLon(55.68, 12.57))?;
/// assert_eq!(processed.data.len(), 24);
/// assert!(processed.data[0].apparent_temperature.is_some());
/// # Ok::<(), nimbus::AnalyticsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SeriesAssembler {
    detector: ExtremaDetector,
    extrema_channels: Vec<Channel>,
    show_apparent_temperature: bool,
    default_humidity: f64,
    temperature_unit: TemperatureUnit,
    wind_speed_unit: WindSpeedUnit,
    timezone: Tz,
}

impl SeriesAssembler {
    pub fn new(config: &DashboardConfig, forecast_type: ForecastType) -> Self {
        let mut detector = ExtremaDetector::new(config.extrema_config(forecast_type));
        if let Some(smoothing) = config.smoothing {
            detector = detector.with_smoothing(smoothing);
        }
        Self {
            detector,
            extrema_channels: config.extrema_channels.clone(),
            show_apparent_temperature: config.show_apparent_temperature,
            default_humidity: config.default_humidity,
            temperature_unit: config.temperature_unit,
            wind_speed_unit: config.wind_speed_unit,
            timezone: config.timezone,
        }
    }

    /// Annotates `forecast` for `location`.
    ///
    /// Points are never dropped or reordered. Errors from any stage are
    /// returned as-is and no partial result is produced.
    pub fn process(
        &self,
        forecast: NormalizedForecast,
        location: LatLon,
    ) -> Result<ProcessedForecast, AnalyticsError> {
        let NormalizedForecast { mut data, alerts } = forecast;
        debug!(
            "Processing {} points for {:.2},{:.2}",
            data.len(),
            location.0,
            location.1
        );

        correct_sun_hours(&mut data, location, self.timezone);

        if self.show_apparent_temperature {
            self.add_apparent_temperature(&mut data, location);
        }

        self.detector.mark_extrema(&mut data, &self.extrema_channels)?;
        group_precipitation(&mut data);
        convert_series_units(&mut data, self.temperature_unit, self.wind_speed_unit);

        info!("Processed forecast with {} points and {} alerts", data.len(), alerts.len());
        Ok(ProcessedForecast { data, alerts })
    }

    fn add_apparent_temperature(&self, data: &mut [TimePoint], location: LatLon) {
        let LatLon(lat, lon) = location;
        for point in data.iter_mut() {
            let Some(temperature) = point.temperature else {
                continue;
            };
            let matrix = calculate(
                &point.time.with_timezone(&self.timezone),
                lat,
                lon,
                point.humidity.unwrap_or(self.default_humidity),
                point.clouds.unwrap_or(100.0),
                temperature,
                point.wind_speed.unwrap_or(0.0),
            );

            point.apparent_temperature = Some(ApparentTemperature {
                min: matrix.min.wind,
                avg: matrix.avg.wind,
                max: matrix.max.wind,
            });
            let comparison = WindComparison {
                no_wind: matrix.min.still,
                with_wind: matrix.min.wind,
            };
            point.patio_weather = Some(comparison);
            point.hiking_weather = Some(comparison);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::alert::WeatherAlert;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const CPH: LatLon = LatLon(55.68, 12.57);

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap()
    }

    /// Two summer days with a warm afternoon, a wind peak and a rain shower.
    fn forecast() -> NormalizedForecast {
        let data = (0..48)
            .map(|h| {
                let hour = (h % 24) as f64;
                let mut p = TimePoint::new(start() + Duration::hours(h));
                p.temperature = Some(15.0 + 7.0 * (-((hour - 13.0) / 5.0).powi(2)).exp());
                p.wind_speed = Some(if h == 20 { 12.0 } else { 3.0 });
                p.clouds = Some(30.0);
                p.sun_hours = Some(70.0);
                p.precipitation = Some(if (30..=32).contains(&h) { 1.5 } else { 0.0 });
                p
            })
            .collect();
        NormalizedForecast {
            data,
            alerts: vec![WeatherAlert {
                start: start(),
                end: start() + Duration::hours(6),
                sender_name: "DMI".to_string(),
                event: "Wind".to_string(),
                description: String::new(),
                tags: vec![],
            }],
        }
    }

    #[test]
    fn test_full_pipeline() {
        let assembler = SeriesAssembler::new(&DashboardConfig::default(), ForecastType::Hourly);
        let processed = assembler.process(forecast(), CPH).unwrap();

        assert_eq!(processed.data.len(), 48);
        assert_eq!(processed.alerts.len(), 1);

        // Midnight local time has no sun.
        assert_eq!(processed.data[22].sun_hours, Some(0.0));
        assert_eq!(processed.data[11].sun_hours, Some(70.0));

        assert!(processed.data.iter().all(|p| p.apparent_temperature.is_some()));
        assert_eq!(processed.data[5].patio_weather, processed.data[5].hiking_weather);

        assert!(processed.data[13].is_maximum_of(Channel::Temperature));
        assert!(processed.data[20].is_maximum_of(Channel::WindSpeed));

        let group = processed.data[31].precipitation_group.unwrap();
        assert_eq!((group.start, group.end), (30, 32));
        assert!((group.total - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_apparent_temperature_can_be_disabled() {
        let config = DashboardConfig {
            show_apparent_temperature: false,
            ..Default::default()
        };
        let processed = SeriesAssembler::new(&config, ForecastType::Hourly)
            .process(forecast(), CPH)
            .unwrap();

        assert!(processed.data.iter().all(|p| p.apparent_temperature.is_none()));
        assert!(!processed
            .data
            .iter()
            .any(|p| p.is_maximum_of(Channel::ApparentTemperatureMax)));
    }

    #[test]
    fn test_display_units_keep_extrema() {
        let celsius = SeriesAssembler::new(&DashboardConfig::default(), ForecastType::Hourly)
            .process(forecast(), CPH)
            .unwrap();
        let config = DashboardConfig {
            temperature_unit: TemperatureUnit::Fahrenheit,
            wind_speed_unit: WindSpeedUnit::Knots,
            ..Default::default()
        };
        let fahrenheit = SeriesAssembler::new(&config, ForecastType::Hourly)
            .process(forecast(), CPH)
            .unwrap();

        for (c, f) in celsius.data.iter().zip(&fahrenheit.data) {
            assert_eq!(c.extrema, f.extrema);
            let expected = c.temperature.unwrap() * 9.0 / 5.0 + 32.0;
            assert!((f.temperature.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_humidity_uses_default() {
        let mut with_default = forecast();
        let mut explicit = forecast();
        for p in explicit.data.iter_mut() {
            p.humidity = Some(50.0);
        }
        with_default.data.truncate(3);
        explicit.data.truncate(3);

        let assembler = SeriesAssembler::new(&DashboardConfig::default(), ForecastType::Hourly);
        let a = assembler.process(with_default, CPH).unwrap();
        let b = assembler.process(explicit, CPH).unwrap();
        for (x, y) in a.data.iter().zip(&b.data) {
            assert_eq!(x.apparent_temperature, y.apparent_temperature);
        }
    }

    #[test]
    fn test_empty_series() {
        let assembler = SeriesAssembler::new(&DashboardConfig::default(), ForecastType::Daily);
        let processed = assembler
            .process(NormalizedForecast::default(), CPH)
            .unwrap();
        assert!(processed.data.is_empty());
    }
}
