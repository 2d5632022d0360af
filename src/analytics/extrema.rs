//! Local minimum/maximum detection with an adaptive, decaying prominence
//! threshold.
//!
//! Every sample is compared with the mean of up to `window_size` neighbours
//! on each side. A maximum must rise above both means, stand at least as
//! high as its immediate neighbours, and have a prominence (the smaller of
//! its heights above the lowest value of each side) that clears a threshold.
//! Right after an accepted maximum that threshold is `base_prominence`; it
//! then decays exponentially with the distance from that maximum, never
//! below `min_difference`. A single dominant peak therefore cannot mask the
//! smaller peaks that follow it a while later. Minima mirror the rule.
//!
//! Points whose window has fewer than two neighbours on one side (the ends
//! of the series, or gaps of missing values) are held to the undecayed
//! `base_prominence`.
//!
//! Finally a candidate must be far enough, in index or in value, from the
//! last accepted extremum of the opposite kind. The disjunction keeps a
//! sharp overnight dip right after an afternoon peak, but drops the
//! near-equal wiggles around a flat top.

use crate::analytics::error::AnalyticsError;
use crate::analytics::savitzky_golay::{savitzky_golay, SavitzkyGolayOptions, XSpacing};
use crate::types::channel::Channel;
use crate::types::time_point::{Extrema, TimePoint};
use log::debug;
use serde::{Deserialize, Serialize};

/// Neighbours required on each side before the decayed threshold applies.
const MIN_SIDE_NEIGHBORS: usize = 2;

/// Tunables of the detector, in the channel's own units and in samples.
///
/// Sampling density is the main thing they depend on; see
/// [`ForecastType::extrema_config`](crate::ForecastType::extrema_config).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtremaConfig {
    /// Neighbours considered on each side.
    pub window_size: usize,
    /// Prominence required right after an extremum of the same kind, and at
    /// the boundaries.
    pub base_prominence: f64,
    /// Samples over which the threshold decays by a factor e.
    pub decay_distance: f64,
    /// Samples from the last opposite extremum that always suffice.
    pub min_separation: usize,
    /// Value difference from the last opposite extremum that always
    /// suffices. Also the floor of the decayed threshold.
    pub min_difference: f64,
}

impl Default for ExtremaConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            base_prominence: 3.0,
            decay_distance: 6.0,
            min_separation: 3,
            min_difference: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtremumKind {
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ExtremumCandidate {
    index: usize,
    value: f64,
    kind: ExtremumKind,
}

/// Marks local extrema on a series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtremaDetector {
    config: ExtremaConfig,
    smoothing: Option<SavitzkyGolayOptions>,
}

impl ExtremaDetector {
    pub fn new(config: ExtremaConfig) -> Self {
        Self {
            config,
            smoothing: None,
        }
    }

    /// Smooths every channel with a Savitzky–Golay filter before detection.
    ///
    /// Only the values used to find extrema are smoothed; the series keeps
    /// its original values. Channels with gaps, or shorter than the filter
    /// window, are scanned unsmoothed.
    pub fn with_smoothing(mut self, options: SavitzkyGolayOptions) -> Self {
        self.smoothing = Some(options);
        self
    }

    pub fn config(&self) -> &ExtremaConfig {
        &self.config
    }

    /// Appends each channel to the `is_minima`/`is_maxima` list of the points
    /// where it has a local extremum.
    ///
    /// Channels with fewer than three values present are left untouched. The only error is an invalid
    /// smoothing configuration.
    pub fn mark_extrema(
        &self,
        data: &mut [TimePoint],
        channels: &[Channel],
    ) -> Result<(), AnalyticsError> {
        if let Some(options) = self.smoothing {
            options.validate_shape()?;
        }

        for &channel in channels {
            let values: Vec<Option<f64>> = data.iter().map(|p| channel.value(p)).collect();
            if values.iter().flatten().count() < 3 {
                debug!("Skipping extrema for {channel}: no usable values");
                continue;
            }

            let values = self.smoothed(values)?;
            let found = self.find_extrema(&values);
            debug!("Found {} extrema for {channel}", found.len());

            for candidate in found {
                let extrema = data[candidate.index]
                    .extrema
                    .get_or_insert_with(Extrema::default);
                let list = match candidate.kind {
                    ExtremumKind::Minimum => &mut extrema.is_minima,
                    ExtremumKind::Maximum => &mut extrema.is_maxima,
                };
                if !list.contains(&channel) {
                    list.push(channel);
                }
            }
        }
        Ok(())
    }

    fn smoothed(&self, values: Vec<Option<f64>>) -> Result<Vec<Option<f64>>, AnalyticsError> {
        let Some(options) = self.smoothing else {
            return Ok(values);
        };
        if values.len() < options.window_size {
            return Ok(values);
        }
        let Some(dense) = values.iter().copied().collect::<Option<Vec<f64>>>() else {
            return Ok(values);
        };
        let smooth = savitzky_golay(&dense, XSpacing::Uniform(1.0), options)?;
        Ok(smooth.into_iter().map(Some).collect())
    }

    fn find_extrema(&self, values: &[Option<f64>]) -> Vec<ExtremumCandidate> {
        let n = values.len();
        let w = self.config.window_size;
        let mut found = Vec::new();
        let mut last_max: Option<ExtremumCandidate> = None;
        let mut last_min: Option<ExtremumCandidate> = None;

        for (i, value) in values.iter().enumerate() {
            let Some(v) = *value else {
                continue;
            };
            let left: Vec<f64> = values[i.saturating_sub(w)..i].iter().flatten().copied().collect();
            let right: Vec<f64> = values[(i + 1).min(n)..(i + w + 1).min(n)]
                .iter()
                .flatten()
                .copied()
                .collect();
            if left.is_empty() && right.is_empty() {
                continue;
            }

            let window = Window {
                index: i,
                value: v,
                sides: [left, right],
                prev: i.checked_sub(1).and_then(|j| values[j]),
                next: values.get(i + 1).copied().flatten(),
            };

            if self.accepts(&window, ExtremumKind::Maximum, last_max, last_min) {
                let candidate = window.candidate(ExtremumKind::Maximum);
                last_max = Some(candidate);
                found.push(candidate);
            } else if self.accepts(&window, ExtremumKind::Minimum, last_min, last_max) {
                let candidate = window.candidate(ExtremumKind::Minimum);
                last_min = Some(candidate);
                found.push(candidate);
            }
        }
        found
    }

    fn accepts(
        &self,
        window: &Window,
        kind: ExtremumKind,
        last_same: Option<ExtremumCandidate>,
        last_opposite: Option<ExtremumCandidate>,
    ) -> bool {
        let v = window.value;
        // Heights above (or depths below) everything, oriented so that
        // bigger always means more extreme.
        let sign = match kind {
            ExtremumKind::Maximum => 1.0,
            ExtremumKind::Minimum => -1.0,
        };

        let sides: Vec<&Vec<f64>> = window.sides.iter().filter(|s| !s.is_empty()).collect();
        let beats_means = sides
            .iter()
            .all(|s| sign * (v - s.iter().sum::<f64>() / s.len() as f64) > 0.0);
        if !beats_means {
            return false;
        }

        let prominence = sides
            .iter()
            .map(|s| {
                s.iter()
                    .map(|x| sign * (v - x))
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .fold(f64::INFINITY, f64::min);
        if prominence < self.threshold(window, last_same) {
            return false;
        }

        let not_exceeded = |neighbor: Option<f64>| neighbor.map_or(true, |x| sign * (v - x) >= 0.0);
        if !not_exceeded(window.prev) || !not_exceeded(window.next) {
            return false;
        }

        // Second sample of a flat top or bottom.
        if last_same.is_some_and(|c| c.index + 1 == window.index && c.value == v) {
            return false;
        }

        last_opposite.map_or(true, |c| {
            window.index - c.index >= self.config.min_separation
                || (v - c.value).abs() >= self.config.min_difference
        })
    }

    fn threshold(&self, window: &Window, last_same: Option<ExtremumCandidate>) -> f64 {
        let base = self.config.base_prominence;
        if window.is_boundary() {
            return base;
        }
        match last_same {
            Some(c) => {
                let distance = (window.index - c.index) as f64;
                // Never below the amplitude rule of `accepts`.
                (base * (-distance / self.config.decay_distance).exp()).max(self.config.min_difference)
            }
            None => base,
        }
    }
}

struct Window {
    index: usize,
    value: f64,
    sides: [Vec<f64>; 2],
    prev: Option<f64>,
    next: Option<f64>,
}

impl Window {
    fn is_boundary(&self) -> bool {
        self.sides.iter().any(|s| s.len() < MIN_SIDE_NEIGHBORS)
    }

    fn candidate(&self, kind: ExtremumKind) -> ExtremumCandidate {
        ExtremumCandidate {
            index: self.index,
            value: self.value,
            kind,
        }
    }
}
