//! Sun position, sunrise/sunset and insolation.
//!
//! The sun position follows the NOAA general solar position approximation:
//! a fractional-year angle feeds Fourier series for the equation of time and
//! the solar declination, and the hour angle of sunrise/sunset is solved for
//! a zenith of 90.833° (horizon plus atmospheric refraction).
//!
//! Clock times are expressed in the timezone of the instant passed in. The
//! daylight-saving shift is detected by comparing the instant's UTC offset
//! with the offsets on 1 January and 1 July of the same year, and adds a flat
//! hour when they differ. That is a heuristic, not a timezone database lookup.

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike};
use std::f64::consts::PI;

// Fourier coefficients of the NOAA approximation.
const EQTIME_SCALE: f64 = 229.18;
const EQ0: f64 = 0.000075;
const EQ1: f64 = 0.001868;
const EQ2: f64 = -0.032077;
const EQ3: f64 = -0.014615;
const EQ4: f64 = -0.040849;
const DECL0: f64 = 0.006918;
const DECL1: f64 = -0.399912;
const DECL2: f64 = 0.070257;
const DECL3: f64 = -0.006758;
const DECL4: f64 = 0.000907;
const DECL5: f64 = -0.002697;
const DECL6: f64 = 0.00148;
/// Zenith at sunrise/sunset, including refraction at the horizon.
const SUNRISE_ZENITH_DEG: f64 = 90.833;

/// Upper bound of how much the sun can heat bare skin, in W/m². Far below the
/// solar constant (~1361 W/m²).
pub const SKIN_HEATING_LIMIT: f64 = 400.0;

/// Sun geometry for one location and instant.
///
/// Times are decimal hours on the local clock (6.5 is 06:30), rounded to two
/// decimals. At extreme latitudes the sun may not cross the horizon that day;
/// sunrise and sunset are then `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    /// Angle between the sun and the vertical, in whole degrees.
    pub zenith: f64,
    pub sunrise: f64,
    pub sunset: f64,
    pub noon: f64,
}

impl SunTimes {
    pub fn sunrise_clock(&self) -> String {
        float_to_time(self.sunrise)
    }

    pub fn sunset_clock(&self) -> String {
        float_to_time(self.sunset)
    }

    pub fn noon_clock(&self) -> String {
        float_to_time(self.noon)
    }

    /// Whether `hour` (local decimal hours) lies between sunrise and sunset,
    /// both inclusive. Always false when the sun times are undefined.
    pub fn is_daylight(&self, hour: f64) -> bool {
        hour >= self.sunrise && hour <= self.sunset
    }
}

/// Computes zenith, sunrise, sunset and solar noon for a location and instant.
///
/// # Arguments
///
/// * `lat`, `lon` - Decimal degrees, north and east positive.
/// * `instant` - The moment of interest. Its timezone decides the local clock
///   the returned times are expressed in, and the local calendar day used.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use chrono_tz::Europe::Copenhagen;
/// use nimbus::calculate_sun_times;
///
/// let midsummer = Copenhagen.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
/// let sun = calculate_sun_times(55.68, 12.57, &midsummer);
/// assert_eq!(&sun.sunrise_clock()[..2], "04");
/// assert_eq!(&sun.sunset_clock()[..2], "21");
/// ```
pub fn calculate_sun_times<Tz: TimeZone>(lat: f64, lon: f64, instant: &DateTime<Tz>) -> SunTimes {
    let day_of_year = instant.ordinal() as f64;
    let local_hour = local_decimal_hour(instant);
    let utc_offset_hours = instant.offset().fix().local_minus_utc() as f64 / 3600.0;

    let ga = 2.0 * PI * (day_of_year - 1.0 + (local_hour - 12.0) / 24.0) / 365.0;

    let eqtime = EQTIME_SCALE
        * (EQ0 + EQ1 * ga.cos() + EQ2 * ga.sin() + EQ3 * (2.0 * ga).cos() + EQ4 * (2.0 * ga).sin());

    let decl = DECL0
        + DECL1 * ga.cos()
        + DECL2 * ga.sin()
        + DECL3 * (2.0 * ga).cos()
        + DECL4 * (2.0 * ga).sin()
        + DECL5 * (3.0 * ga).cos()
        + DECL6 * (3.0 * ga).sin();

    let lat_rad = lat.to_radians();

    // True solar time in minutes, then the hour angle in degrees.
    let time_offset = eqtime + 4.0 * lon - 60.0 * utc_offset_hours;
    let true_solar_time = local_hour * 60.0 + time_offset;
    let hour_angle = true_solar_time / 4.0 - 180.0;

    let cos_zenith = lat_rad.sin() * decl.sin()
        + lat_rad.cos() * decl.cos() * hour_angle.to_radians().cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos().to_degrees().round();

    // NaN when the sun stays above or below the horizon all day.
    let sunrise_hour_angle = (SUNRISE_ZENITH_DEG.to_radians().cos() / (lat_rad.cos() * decl.cos())
        - lat_rad.tan() * decl.tan())
    .acos()
    .to_degrees();

    let clock_shift = clock_shift_hours(instant);
    let to_local = |utc_minutes: f64| round2(utc_minutes / 60.0 + clock_shift);

    SunTimes {
        zenith,
        sunrise: to_local(720.0 - 4.0 * (lon + sunrise_hour_angle) - eqtime),
        sunset: to_local(720.0 - 4.0 * (lon - sunrise_hour_angle) - eqtime),
        noon: to_local(720.0 - 4.0 * lon - eqtime),
    }
}

/// Hours between sunrise and sunset on the instant's local day.
pub fn daylight_duration<Tz: TimeZone>(lat: f64, lon: f64, instant: &DateTime<Tz>) -> f64 {
    let sun = calculate_sun_times(lat, lon, instant);
    round2(sun.sunset - sun.sunrise)
}

/// Solar power reaching the skin, in W/m².
///
/// Starts from [`SKIN_HEATING_LIMIT`], divides by the air-mass path length
/// `1/cos(zenith)` and scales linearly with the uncovered sky fraction.
/// Zero once the sun is at or below the horizon (`zenith >= 89`).
///
/// ```
/// use nimbus::solar_insolation;
///
/// assert_eq!(solar_insolation(90.0, 0.0), 0.0);
/// assert_eq!(solar_insolation(0.0, 100.0), 0.0);
/// assert_eq!(solar_insolation(60.0, 0.0), 200.0);
/// ```
pub fn solar_insolation(zenith_deg: f64, clouds_pct: f64) -> f64 {
    let air_mass = 1.0 / zenith_deg.to_radians().cos();
    let through_atmosphere = SKIN_HEATING_LIMIT / air_mass;
    let insolation = (through_atmosphere * (100.0 - clouds_pct) / 100.0).round();

    if insolation < 0.0 || zenith_deg >= 89.0 {
        0.0
    } else {
        insolation
    }
}

/// Formats decimal hours as `HH:MM`. Minutes that round up to 60 roll into
/// the next hour.
pub fn float_to_time(hours: f64) -> String {
    if !hours.is_finite() {
        return "--:--".to_string();
    }
    let whole = hours.floor();
    let minutes = ((hours - whole) * 60.0).round() as i64;
    let whole = whole as i64;
    if minutes >= 60 {
        format!("{:02}:00", whole + 1)
    } else {
        format!("{:02}:{:02}", whole, minutes)
    }
}

/// Parses `HH:MM` back into decimal hours.
pub fn time_string_to_decimal(time: &str) -> Option<f64> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: f64 = hours.trim().parse().ok()?;
    let minutes: f64 = minutes.trim().parse().ok()?;
    Some(hours + minutes / 60.0)
}

/// Local wall-clock time of `instant` as decimal hours, seconds ignored.
pub fn local_decimal_hour<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    instant.hour() as f64 + instant.minute() as f64 / 60.0
}

/// Whether the instant's UTC offset differs from the smaller of the offsets
/// on 1 January and 1 July of its year.
pub fn is_daylight_saving_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> bool {
    standard_offset_seconds(instant) != instant.offset().fix().local_minus_utc()
}

fn standard_offset_seconds<Tz: TimeZone>(instant: &DateTime<Tz>) -> i32 {
    let tz = instant.timezone();
    let current = instant.offset().fix().local_minus_utc();
    let offset_on = |month: u32| {
        tz.with_ymd_and_hms(instant.year(), month, 1, 0, 0, 0)
            .earliest()
            .map(|dt| dt.offset().fix().local_minus_utc())
            .unwrap_or(current)
    };
    offset_on(1).min(offset_on(7))
}

/// Hours to add to a UTC clock reading to get the local reading used for
/// sun times: the standard offset, plus one hour while DST is detected.
fn clock_shift_hours<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    let standard = standard_offset_seconds(instant) as f64 / 3600.0;
    if is_daylight_saving_time(instant) {
        standard + 1.0
    } else {
        standard
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Europe::Copenhagen;

    const CPH_LAT: f64 = 55.68;
    const CPH_LON: f64 = 12.57;

    #[test]
    fn test_copenhagen_midsummer() {
        let instant = Copenhagen.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let sun = calculate_sun_times(CPH_LAT, CPH_LON, &instant);

        assert!(is_daylight_saving_time(&instant));
        assert!(sun.sunrise > 4.2 && sun.sunrise < 4.7, "sunrise {}", sun.sunrise);
        assert!(sun.sunset > 21.7 && sun.sunset < 22.2, "sunset {}", sun.sunset);
        assert!(sun.noon > 13.0 && sun.noon < 13.4, "noon {}", sun.noon);
    }

    #[test]
    fn test_copenhagen_midwinter() {
        let instant = Copenhagen.with_ymd_and_hms(2024, 12, 21, 12, 0, 0).unwrap();
        let sun = calculate_sun_times(CPH_LAT, CPH_LON, &instant);

        assert!(!is_daylight_saving_time(&instant));
        assert!(sun.sunrise > 8.4 && sun.sunrise < 8.9, "sunrise {}", sun.sunrise);
        assert!(sun.sunset > 15.4 && sun.sunset < 15.9, "sunset {}", sun.sunset);
        assert!(daylight_duration(CPH_LAT, CPH_LON, &instant) < 7.5);
    }

    #[test]
    fn test_zenith_at_solar_noon() {
        // Solar noon in Copenhagen is around 11:11 UTC at midsummer.
        let instant = Utc.with_ymd_and_hms(2024, 6, 21, 11, 11, 0).unwrap();
        let sun = calculate_sun_times(CPH_LAT, CPH_LON, &instant);
        assert!((31.0..=33.0).contains(&sun.zenith), "zenith {}", sun.zenith);

        let midnight = Utc.with_ymd_and_hms(2024, 6, 21, 23, 11, 0).unwrap();
        let night = calculate_sun_times(CPH_LAT, CPH_LON, &midnight);
        assert!(night.zenith > 90.0);
    }

    #[test]
    fn test_same_instant_in_utc_and_local_clock() {
        let local = Copenhagen.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let utc = local.with_timezone(&Utc);
        let sun_local = calculate_sun_times(CPH_LAT, CPH_LON, &local);
        let sun_utc = calculate_sun_times(CPH_LAT, CPH_LON, &utc);

        assert_eq!(sun_local.zenith, sun_utc.zenith);
        assert!((sun_local.sunrise - 2.0 - sun_utc.sunrise).abs() < 0.02);
    }

    #[test]
    fn test_polar_day_does_not_panic() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let sun = calculate_sun_times(78.2, 15.6, &instant);
        assert!(sun.sunrise.is_nan());
        assert!(sun.zenith.is_finite());
        assert!(!sun.is_daylight(12.0));
        assert_eq!(sun.sunrise_clock(), "--:--");
    }

    #[test]
    fn test_insolation_bounds() {
        assert_eq!(solar_insolation(90.0, 0.0), 0.0);
        assert_eq!(solar_insolation(0.0, 100.0), 0.0);
        assert_eq!(solar_insolation(0.0, 0.0), 400.0);
        assert_eq!(solar_insolation(0.0, 50.0), 200.0);
        assert_eq!(solar_insolation(89.0, 0.0), 0.0);
        assert_eq!(solar_insolation(120.0, 0.0), 0.0);
    }

    #[test]
    fn test_clock_formatting() {
        assert_eq!(float_to_time(6.5), "06:30");
        assert_eq!(float_to_time(13.999), "14:00");
        assert_eq!(float_to_time(0.0), "00:00");
        assert_eq!(time_string_to_decimal("06:30"), Some(6.5));
        assert_eq!(time_string_to_decimal("21:45"), Some(21.75));
        assert_eq!(time_string_to_decimal("noon"), None);
    }
}
