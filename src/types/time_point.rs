//! The sample type flowing through the analytics pipeline.

use crate::types::channel::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample of a forecast series.
///
/// Providers fill in the primary channels (temperature in °C, wind in m/s,
/// precipitation in mm, clouds and humidity in %). Every channel is optional:
/// vendors routinely omit fields and the pipeline skips what is missing.
/// The remaining fields are derived annotations written by the pipeline stages.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePoint {
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gusts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_prob: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_temperature: Option<ApparentTemperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patio_weather: Option<WindComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiking_weather: Option<WindComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extrema: Option<Extrema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_group: Option<PrecipitationGroup>,
}

impl TimePoint {
    /// A point at `time` with every channel empty.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            temperature: None,
            temp_min: None,
            temp_max: None,
            wind_speed: None,
            wind_gusts: None,
            wind_direction: None,
            precipitation: None,
            precipitation_prob: None,
            sun_hours: None,
            clouds: None,
            humidity: None,
            apparent_temperature: None,
            patio_weather: None,
            hiking_weather: None,
            extrema: None,
            precipitation_group: None,
        }
    }

    pub fn is_minimum_of(&self, channel: Channel) -> bool {
        self.extrema
            .as_ref()
            .is_some_and(|e| e.is_minima.contains(&channel))
    }

    pub fn is_maximum_of(&self, channel: Channel) -> bool {
        self.extrema
            .as_ref()
            .is_some_and(|e| e.is_maxima.contains(&channel))
    }
}

/// Perceived temperature at the no-sun, cloud-adjusted and clear-sky
/// insolation bounds, each evaluated at the actual wind speed.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ApparentTemperature {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Perceived temperature in still air next to the value at the actual wind.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindComparison {
    pub no_wind: f64,
    pub with_wind: f64,
}

/// Channels for which a point is a local minimum or maximum.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extrema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_minima: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_maxima: Vec<Channel>,
}

/// Summary of one run of wet periods, stored on the run's middle point.
///
/// `start` and `end` are inclusive indices into the series.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct PrecipitationGroup {
    pub total: f64,
    pub start: usize,
    pub end: usize,
}
