//! Groups runs of wet periods into single annotated totals.

use crate::types::time_point::{PrecipitationGroup, TimePoint};
use log::debug;

/// Marks the middle point of every precipitation run with the run's total.
///
/// A run opens on the first point with `precipitation > 0`. One dry point
/// (zero or missing precipitation) is bridged when the point right after it
/// is wet again; a dry point followed by another dry point closes the run.
/// The run ends at its last wet point, and its [`PrecipitationGroup`] is
/// stored on the point at `(start + end) / 2`. A run still open at the end
/// of the series is closed there. Existing group annotations are replaced.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use nimbus::{group_precipitation, TimePoint};
///
/// let start = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
/// let mut data: Vec<TimePoint> = [0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 5.0]
///     .iter()
///     .enumerate()
///     .map(|(i, mm)| {
///         let mut p = TimePoint::new(start + Duration::hours(i as i64));
///         p.precipitation = Some(*mm);
///         p
///     })
///     .collect();
///
/// group_precipitation(&mut data);
/// let group = data[2].precipitation_group.unwrap();
/// assert_eq!((group.total, group.start, group.end), (5.0, 1, 3));
/// ```
pub fn group_precipitation(data: &mut [TimePoint]) {
    for point in data.iter_mut() {
        point.precipitation_group = None;
    }

    let amounts: Vec<f64> = data
        .iter()
        .map(|p| p.precipitation.unwrap_or(0.0))
        .collect();
    let is_wet = |i: usize| amounts.get(i).is_some_and(|mm| *mm > 0.0);

    let mut groups = Vec::new();
    let mut in_group = false;
    let mut start = 0;
    let mut total = 0.0;
    let mut dry_count = 0;

    for (i, &mm) in amounts.iter().enumerate() {
        if is_wet(i) && !in_group {
            in_group = true;
            start = i;
            total = mm;
            dry_count = 0;
        } else if is_wet(i) {
            total += mm;
            dry_count = 0;
        } else if in_group {
            dry_count += 1;
            if dry_count >= 2 || !is_wet(i + 1) {
                groups.push(PrecipitationGroup {
                    total,
                    start,
                    end: i - dry_count,
                });
                in_group = false;
                dry_count = 0;
            }
        }
    }

    if in_group {
        groups.push(PrecipitationGroup {
            total,
            start,
            end: amounts.len() - 1 - dry_count,
        });
    }

    debug!("Found {} precipitation groups", groups.len());
    for group in groups {
        data[(group.start + group.end) / 2].precipitation_group = Some(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(amounts: &[f64]) -> Vec<TimePoint> {
        let start = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        amounts
            .iter()
            .enumerate()
            .map(|(i, mm)| {
                let mut p = TimePoint::new(start + Duration::hours(i as i64));
                p.precipitation = Some(*mm);
                p
            })
            .collect()
    }

    fn groups(data: &[TimePoint]) -> Vec<(usize, PrecipitationGroup)> {
        data.iter()
            .enumerate()
            .filter_map(|(i, p)| p.precipitation_group.map(|g| (i, g)))
            .collect()
    }

    #[test]
    fn test_single_dry_gap_is_bridged() {
        let mut data = series(&[0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 5.0]);
        group_precipitation(&mut data);

        assert_eq!(
            groups(&data),
            vec![
                (2, PrecipitationGroup { total: 5.0, start: 1, end: 3 }),
                (6, PrecipitationGroup { total: 5.0, start: 6, end: 6 }),
            ]
        );
    }

    #[test]
    fn test_two_dry_points_split_runs() {
        let mut data = series(&[1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0]);
        group_precipitation(&mut data);

        assert_eq!(
            groups(&data),
            vec![
                (0, PrecipitationGroup { total: 2.0, start: 0, end: 1 }),
                (5, PrecipitationGroup { total: 3.0, start: 4, end: 6 }),
            ]
        );
    }

    #[test]
    fn test_dry_series_has_no_groups() {
        let mut data = series(&[0.0; 10]);
        group_precipitation(&mut data);
        assert!(groups(&data).is_empty());

        let mut empty: Vec<TimePoint> = Vec::new();
        group_precipitation(&mut empty);
    }

    #[test]
    fn test_missing_values_count_as_dry() {
        let mut data = series(&[0.5, 0.0, 0.5, 0.0, 0.0]);
        data[1].precipitation = None;
        group_precipitation(&mut data);
        assert_eq!(
            groups(&data),
            vec![(1, PrecipitationGroup { total: 1.0, start: 0, end: 2 })]
        );
    }

    #[test]
    fn test_totals_are_conserved() {
        let amounts: Vec<f64> = (0..200)
            .map(|i: u32| {
                let pseudo = (i.wrapping_mul(2_654_435_761) >> 7) % 10;
                if pseudo < 4 {
                    (pseudo as f64) * 0.5 + 0.1
                } else {
                    0.0
                }
            })
            .collect();
        let mut data = series(&amounts);
        group_precipitation(&mut data);
        let found = groups(&data);

        let mut covered = vec![0; amounts.len()];
        for (index, g) in &found {
            assert_eq!(*index, (g.start + g.end) / 2);
            let sum: f64 = amounts[g.start..=g.end].iter().sum();
            assert!((sum - g.total).abs() < 1e-9);
            for c in &mut covered[g.start..=g.end] {
                *c += 1;
            }
        }
        for (i, mm) in amounts.iter().enumerate() {
            if *mm > 0.0 {
                assert_eq!(covered[i], 1, "wet point {i} not in exactly one group");
            }
        }
        let grouped: f64 = found.iter().map(|(_, g)| g.total).sum();
        let all: f64 = amounts.iter().sum();
        assert!((grouped - all).abs() < 1e-9);
    }

    #[test]
    fn test_regrouping_replaces_annotations() {
        let mut data = series(&[1.0, 1.0, 1.0]);
        group_precipitation(&mut data);
        data[1].precipitation = Some(0.0);
        data[2].precipitation = Some(0.0);
        group_precipitation(&mut data);
        assert_eq!(
            groups(&data),
            vec![(0, PrecipitationGroup { total: 1.0, start: 0, end: 0 })]
        );
    }
}
