pub mod core;
pub mod sample;

pub use core::{Day, DayParseError, Density, DensityParseError, Hour, HourParseError};
pub use sample::{FEATURE_NAMES, Sample, SampleError};
