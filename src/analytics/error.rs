use thiserror::Error;

/// Caller errors raised by the analytics pipeline.
///
/// Short or sparse series are not errors: stages hand them back unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Unknown channel path '{0}'")]
    UnknownChannel(String),

    #[error("Unknown forecast type '{0}'")]
    UnknownForecastType(String),

    #[error("Invalid filter parameters: {0}")]
    InvalidFilterParameters(#[from] FilterParameterError),
}

/// Precondition failures of the Savitzky–Golay filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParameterError {
    #[error("window size {0} must be an odd number of at least 5")]
    WindowSize(usize),

    #[error("window size is higher than the data length {window}>{len}")]
    WindowLargerThanSeries { window: usize, len: usize },

    #[error("polynomial degree {0} must be at least 1")]
    PolynomialDegree(usize),

    #[error("polynomial degree {degree} needs a window larger than {window}")]
    DegreeNotBelowWindow { degree: usize, window: usize },

    #[error("x values ({xs}) and y values ({ys}) differ in length")]
    SpacingLengthMismatch { xs: usize, ys: usize },
}
