mod analytics;
mod cache;
mod config;
mod error;
mod frame;
mod nimbus;
mod providers;
mod types;

pub use error::NimbusError;
pub use nimbus::*;

pub use config::DashboardConfig;
pub use cache::{CacheKey, ForecastCache, MemoryCache};
pub use frame::{to_frame, ForecastFrameExt};

pub use analytics::apparent_temperature::{
    apparent_temperature, calculate as calculate_apparent_temperature, ApparentTemperatureMatrix,
    WindPair,
};
pub use analytics::assembler::SeriesAssembler;
pub use analytics::convert::*;
pub use analytics::daylight::correct_sun_hours;
pub use analytics::error::{AnalyticsError, FilterParameterError};
pub use analytics::extrema::{ExtremaConfig, ExtremaDetector};
pub use analytics::precipitation::group_precipitation;
pub use analytics::savitzky_golay::{savitzky_golay, SavitzkyGolayOptions, XSpacing};
pub use analytics::solar::*;

pub use providers::dmi::DmiProvider;
pub use providers::error::ProviderError;
pub use providers::open_meteo::OpenMeteoProvider;
pub use providers::open_weather_map::OpenWeatherMapProvider;
pub use providers::{default_client, Provider, ProviderKind, WeatherProvider, USER_AGENT};

pub use types::alert::WeatherAlert;
pub use types::channel::Channel;
pub use types::forecast::{NormalizedForecast, ProcessedForecast};
pub use types::forecast_type::ForecastType;
pub use types::into_utc_trait::IntoUtcDateTime;
pub use types::time_point::*;
pub use types::units::{TemperatureUnit, WindSpeedUnit};
