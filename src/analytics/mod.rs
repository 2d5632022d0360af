pub mod apparent_temperature;
pub mod assembler;
pub mod convert;
pub mod daylight;
pub mod error;
pub mod extrema;
pub mod precipitation;
pub mod savitzky_golay;
pub mod solar;
