pub mod alert;
pub mod channel;
pub mod forecast;
pub mod forecast_type;
pub mod into_utc_trait;
pub mod time_point;
pub mod units;
