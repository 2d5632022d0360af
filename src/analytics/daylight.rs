//! Clears reported sunshine outside the sunrise–sunset window.

use crate::analytics::solar::{calculate_sun_times, local_decimal_hour};
use crate::nimbus::LatLon;
use crate::types::time_point::TimePoint;
use chrono_tz::Tz;

/// Sets `sun_hours` to zero for every point that falls before sunrise or
/// after sunset, and clamps daytime values at zero.
///
/// Sun times are computed per point, on that point's own local day in `tz`,
/// so a multi-day series gets the right window for every date. Points
/// without `sun_hours` are left untouched. Applying the correction twice
/// gives the same result as applying it once.
pub fn correct_sun_hours(data: &mut [TimePoint], location: LatLon, tz: Tz) {
    let LatLon(lat, lon) = location;
    for point in data.iter_mut() {
        let Some(sun_hours) = point.sun_hours else {
            continue;
        };
        let local = point.time.with_timezone(&tz);
        let sun = calculate_sun_times(lat, lon, &local);
        let is_daylight = sun.is_daylight(local_decimal_hour(&local));

        point.sun_hours = Some(if is_daylight { sun_hours.max(0.0) } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Europe::Copenhagen;

    const CPH: LatLon = LatLon(55.68, 12.57);

    fn hourly_sunny_day() -> Vec<TimePoint> {
        let start = Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap();
        (0..48)
            .map(|h| {
                let mut p = TimePoint::new(start + Duration::hours(h));
                p.sun_hours = Some(if h % 5 == 0 { -1.0 } else { 60.0 });
                p
            })
            .collect()
    }

    #[test]
    fn test_night_is_cleared() {
        let mut data = hourly_sunny_day();
        correct_sun_hours(&mut data, CPH, Copenhagen);

        // 02:00 UTC is 03:00 CET, well before sunrise around the equinox.
        assert_eq!(data[2].sun_hours, Some(0.0));
        assert_eq!(data[26].sun_hours, Some(0.0));
        // 11:00 and 12:00 UTC are around solar noon.
        assert_eq!(data[11].sun_hours, Some(60.0));
        assert_eq!(data[36].sun_hours, Some(60.0));
    }

    #[test]
    fn test_negative_daytime_values_are_clamped() {
        let mut data = hourly_sunny_day();
        correct_sun_hours(&mut data, CPH, Copenhagen);
        // Index 10 is 10:00 UTC and was seeded with -1.
        assert_eq!(data[10].sun_hours, Some(0.0));
        assert!(data.iter().all(|p| p.sun_hours.unwrap() >= 0.0));
    }

    #[test]
    fn test_idempotent() {
        let mut once = hourly_sunny_day();
        correct_sun_hours(&mut once, CPH, Copenhagen);
        let mut twice = once.clone();
        correct_sun_hours(&mut twice, CPH, Copenhagen);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_sun_hours_untouched() {
        let mut data = vec![TimePoint::new(
            Utc.with_ymd_and_hms(2024, 3, 20, 2, 0, 0).unwrap(),
        )];
        correct_sun_hours(&mut data, CPH, Copenhagen);
        assert_eq!(data[0].sun_hours, None);
    }
}
