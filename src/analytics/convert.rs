//! Unit conversions between the providers' units, the pipeline's SI units and
//! the user's display preferences.

use crate::types::into_utc_trait::IntoUtcDateTime;
use crate::types::time_point::TimePoint;
use crate::types::units::{TemperatureUnit, WindSpeedUnit};
use chrono::{DateTime, Utc};

pub fn to_celsius(value: f64, from: TemperatureUnit) -> f64 {
    match from {
        TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Kelvin => value - 273.15,
    }
}

/// Converts a temperature between any two units, going through Celsius.
///
/// ```
/// use nimbus::{to_temperature, TemperatureUnit};
///
/// let f = to_temperature(100.0, TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit);
/// assert!((f - 212.0).abs() < 1e-9);
/// ```
pub fn to_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    let celsius = to_celsius(value, from);
    match to {
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Kelvin => celsius + 273.15,
    }
}

pub fn to_kmh(value: f64, from: WindSpeedUnit) -> f64 {
    match from {
        WindSpeedUnit::Ms => value * 3.6,
        WindSpeedUnit::Kmh => value,
        WindSpeedUnit::Mph => value * 1.6093,
        WindSpeedUnit::Knots => value * 1.852,
    }
}

/// Converts a wind speed between any two units, going through km/h.
///
/// The mph and knot factors are rounded published constants, so a round trip
/// through them is exact only to about four significant digits.
pub fn to_wind_speed(value: f64, from: WindSpeedUnit, to: WindSpeedUnit) -> f64 {
    let kmh = to_kmh(value, from);
    match to {
        WindSpeedUnit::Ms => kmh / 3.6,
        WindSpeedUnit::Kmh => kmh,
        WindSpeedUnit::Mph => kmh * 0.6214,
        WindSpeedUnit::Knots => kmh * 0.5399,
    }
}

/// Pins an instant to UTC. The result's wall-clock fields are the input's UTC
/// wall-clock fields.
pub fn to_utc_time(instant: impl IntoUtcDateTime) -> DateTime<Utc> {
    instant.into_utc()
}

/// Converts the temperature and wind channels of a series from °C and m/s
/// into display units.
///
/// Apparent temperature and the patio/hiking comparisons are converted with
/// the temperatures. Channels in other units (precipitation, clouds,
/// humidity) are left alone.
pub fn convert_series_units(
    data: &mut [TimePoint],
    temperature_unit: TemperatureUnit,
    wind_speed_unit: WindSpeedUnit,
) {
    let temp = |v: f64| to_temperature(v, TemperatureUnit::Celsius, temperature_unit);
    let wind = |v: f64| to_wind_speed(v, WindSpeedUnit::Ms, wind_speed_unit);

    for point in data.iter_mut() {
        if temperature_unit != TemperatureUnit::Celsius {
            point.temperature = point.temperature.map(temp);
            point.temp_min = point.temp_min.map(temp);
            point.temp_max = point.temp_max.map(temp);
            if let Some(apparent) = point.apparent_temperature.as_mut() {
                apparent.min = temp(apparent.min);
                apparent.avg = temp(apparent.avg);
                apparent.max = temp(apparent.max);
            }
            for comparison in [&mut point.patio_weather, &mut point.hiking_weather]
                .into_iter()
                .flatten()
            {
                comparison.no_wind = temp(comparison.no_wind);
                comparison.with_wind = temp(comparison.with_wind);
            }
        }
        if wind_speed_unit != WindSpeedUnit::Ms {
            point.wind_speed = point.wind_speed.map(wind);
            point.wind_gusts = point.wind_gusts.map(wind);
        }
    }
}
