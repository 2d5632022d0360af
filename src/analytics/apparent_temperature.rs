//! Perceived ("feels like") temperature.
//!
//! Uses the Australian Bureau of Meteorology apparent temperature model,
//! which adds the effect of humidity, wind and absorbed solar radiation to
//! the dry-bulb temperature.

use crate::analytics::solar::{calculate_sun_times, solar_insolation, SunTimes};
use chrono::{DateTime, TimeZone};

/// Apparent temperature in °C, rounded to the nearest degree.
///
/// # Arguments
///
/// * `humidity_pct` - Relative humidity in percent.
/// * `temperature` - Dry-bulb temperature in °C.
/// * `wind_speed` - Wind speed at 10 m, in m/s.
/// * `net_radiation` - Radiation absorbed per unit area of body surface, W/m².
///
/// # Examples
///
/// ```
/// use nimbus::apparent_temperature;
///
/// assert_eq!(apparent_temperature(50.0, 20.0, 0.0, 0.0), 20.0);
/// assert_eq!(apparent_temperature(50.0, 20.0, 0.0, 400.0), 48.0);
/// ```
pub fn apparent_temperature(
    humidity_pct: f64,
    temperature: f64,
    wind_speed: f64,
    net_radiation: f64,
) -> f64 {
    let vapour_pressure = (humidity_pct / 100.0)
        * 6.105
        * ((17.27 * temperature) / (237.7 + temperature)).exp();

    let apparent = if net_radiation > 0.0 {
        temperature + 0.348 * vapour_pressure - 0.7 * wind_speed
            + (0.7 * (net_radiation / (wind_speed + 10.0)) - 4.25)
    } else {
        temperature + 0.33 * vapour_pressure - 0.7 * wind_speed - 4.0
    };

    apparent.round()
}

/// Apparent temperature in still air and at the actual wind speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindPair {
    pub still: f64,
    pub wind: f64,
}

/// Apparent temperature at three insolation levels, each with and without
/// wind.
///
/// * `min` - no sun at all.
/// * `avg` - the sun at its current angle behind the reported cloud cover.
/// * `max` - the sun at its current angle under a clear sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentTemperatureMatrix {
    pub min: WindPair,
    pub avg: WindPair,
    pub max: WindPair,
    /// The dry-bulb temperature the matrix was computed from.
    pub real: f64,
    pub sun: SunTimes,
    /// Insolation behind the reported clouds, W/m².
    pub insolation: f64,
}

/// Computes the full [`ApparentTemperatureMatrix`] for one sample.
///
/// The sun position is taken at `instant`; its timezone decides the local
/// clock of the sun times stored in the result.
pub fn calculate<Tz: TimeZone>(
    instant: &DateTime<Tz>,
    lat: f64,
    lon: f64,
    humidity_pct: f64,
    clouds_pct: f64,
    temperature: f64,
    wind_speed: f64,
) -> ApparentTemperatureMatrix {
    let sun = calculate_sun_times(lat, lon, instant);
    let insolation_max = solar_insolation(sun.zenith, 0.0);
    let insolation_avg = solar_insolation(sun.zenith, clouds_pct);

    let pair = |insolation: f64| WindPair {
        still: apparent_temperature(humidity_pct, temperature, 0.0, insolation),
        wind: apparent_temperature(humidity_pct, temperature, wind_speed, insolation),
    };

    ApparentTemperatureMatrix {
        min: pair(0.0),
        avg: pair(insolation_avg),
        max: pair(insolation_max),
        real: temperature,
        sun,
        insolation: insolation_avg,
    }
}
