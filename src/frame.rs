//! Tabular export of an annotated series.

use crate::types::into_utc_trait::IntoUtcDateTime;
use crate::types::time_point::TimePoint;
use polars::prelude::{col, lit, Column, DataFrame, DataType, LazyFrame, PolarsResult, TimeUnit};

fn float_column(name: &str, data: &[TimePoint], value: impl Fn(&TimePoint) -> Option<f64>) -> Column {
    Column::new(name.into(), data.iter().map(value).collect::<Vec<Option<f64>>>())
}

fn channel_list(names: Option<&Vec<crate::types::channel::Channel>>) -> Option<String> {
    let names = names.filter(|n| !n.is_empty())?;
    Some(
        names
            .iter()
            .map(|c| c.path())
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Builds a `DataFrame` with one row per point.
///
/// Columns: `datetime` (UTC, milliseconds), the numeric channels, the
/// apparent temperature bounds, the precipitation group of the point it is
/// stored on, and the comma-separated channel paths for which the point is
/// a minimum or maximum.
pub fn to_frame(data: &[TimePoint]) -> PolarsResult<DataFrame> {
    let datetime = Column::new(
        "datetime".into(),
        data.iter()
            .map(|p| p.time.timestamp_millis())
            .collect::<Vec<i64>>(),
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let group = |p: &TimePoint| p.precipitation_group;
    let columns = vec![
        datetime,
        float_column("temperature", data, |p| p.temperature),
        float_column("temp_min", data, |p| p.temp_min),
        float_column("temp_max", data, |p| p.temp_max),
        float_column("wind_speed", data, |p| p.wind_speed),
        float_column("wind_gusts", data, |p| p.wind_gusts),
        float_column("wind_direction", data, |p| p.wind_direction),
        float_column("precipitation", data, |p| p.precipitation),
        float_column("precipitation_prob", data, |p| p.precipitation_prob),
        float_column("sun_hours", data, |p| p.sun_hours),
        float_column("clouds", data, |p| p.clouds),
        float_column("humidity", data, |p| p.humidity),
        float_column("apparent_min", data, |p| p.apparent_temperature.map(|a| a.min)),
        float_column("apparent_avg", data, |p| p.apparent_temperature.map(|a| a.avg)),
        float_column("apparent_max", data, |p| p.apparent_temperature.map(|a| a.max)),
        float_column("precipitation_group_total", data, |p| group(p).map(|g| g.total)),
        Column::new(
            "precipitation_group_start".into(),
            data.iter()
                .map(|p| group(p).map(|g| g.start as i64))
                .collect::<Vec<Option<i64>>>(),
        ),
        Column::new(
            "precipitation_group_end".into(),
            data.iter()
                .map(|p| group(p).map(|g| g.end as i64))
                .collect::<Vec<Option<i64>>>(),
        ),
        Column::new(
            "minima".into(),
            data.iter()
                .map(|p| channel_list(p.extrema.as_ref().map(|e| &e.is_minima)))
                .collect::<Vec<Option<String>>>(),
        ),
        Column::new(
            "maxima".into(),
            data.iter()
                .map(|p| channel_list(p.extrema.as_ref().map(|e| &e.is_maxima)))
                .collect::<Vec<Option<String>>>(),
        ),
    ];

    DataFrame::new(columns)
}

pub trait ForecastFrameExt {
    /// Keeps the rows whose `datetime` lies in `[start, end]`.
    fn filter_range(self, start: impl IntoUtcDateTime, end: impl IntoUtcDateTime) -> LazyFrame;

    /// Keeps only the rows that carry a precipitation group, with the group
    /// columns.
    fn precipitation_groups(self) -> LazyFrame;
}

impl ForecastFrameExt for LazyFrame {
    fn filter_range(self, start: impl IntoUtcDateTime, end: impl IntoUtcDateTime) -> LazyFrame {
        let start_naive = start.into_utc().naive_utc();
        let end_naive = end.into_utc().naive_utc();

        self.filter(
            col("datetime")
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .gt_eq(lit(start_naive))
                .and(
                    col("datetime")
                        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                        .lt_eq(lit(end_naive)),
                ),
        )
    }

    fn precipitation_groups(self) -> LazyFrame {
        self.filter(col("precipitation_group_total").is_not_null())
            .select([
                col("datetime"),
                col("precipitation_group_total"),
                col("precipitation_group_start"),
                col("precipitation_group_end"),
            ])
    }
}
