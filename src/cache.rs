//! Caching of processed forecasts per location and configuration.

use crate::config::DashboardConfig;
use crate::nimbus::LatLon;
use crate::providers::ProviderKind;
use crate::types::forecast::ProcessedForecast;
use crate::types::forecast_type::ForecastType;
use log::debug;
use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

/// Identifies one cached forecast.
///
/// Coordinates are rounded to two decimals (roughly a kilometre), so small
/// jitter in the reported location still hits the cache. The fingerprint
/// changes whenever any setting or the granularity changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: ProviderKind,
    pub lat: OrderedFloat<f64>,
    pub lon: OrderedFloat<f64>,
    pub fingerprint: u64,
}

fn round2(value: f64) -> OrderedFloat<f64> {
    OrderedFloat((value * 100.0).round() / 100.0)
}

impl CacheKey {
    pub fn new(
        config: &DashboardConfig,
        location: LatLon,
        forecast_type: ForecastType,
    ) -> Result<Self, serde_json::Error> {
        let serialized = serde_json::to_string(config)?;
        let mut hasher = DefaultHasher::new();
        serialized.hash(&mut hasher);
        forecast_type.hash(&mut hasher);

        Ok(Self {
            provider: config.provider,
            lat: round2(location.0),
            lon: round2(location.1),
            fingerprint: hasher.finish(),
        })
    }
}

/// Storage for processed forecasts, shared by all requests of a client.
pub trait ForecastCache: Send + Sync {
    /// Returns the entry for `key` unless it is missing or expired.
    fn get(&self, key: &CacheKey) -> Option<ProcessedForecast>;

    /// Stores `value`, valid for `ttl` from now.
    fn insert(&self, key: CacheKey, value: ProcessedForecast, ttl: Duration);
}

#[derive(Debug)]
struct Entry {
    value: ProcessedForecast,
    expires_at: Instant,
}

/// In-process [`ForecastCache`]. Expired entries are dropped when read or
/// when [`MemoryCache::purge_expired`] runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

impl ForecastCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<ProcessedForecast> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                debug!("Cache entry for {:?},{:?} expired", key.lat, key.lon);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert(&self, key: CacheKey, value: ProcessedForecast, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.lock().insert(key, Entry { value, expires_at });
    }
}
