use std::str::FromStr;
use thiserror::Error;

use crate::core::{
    Day, DayParseError, Density, DensityParseError, Hour, HourParseError,
};

pub const FEATURE_NAMES: [&str; 2] = ["jam", "hari"];

#[inline]
pub fn features(hour: Hour, day: Day) -> [f64; 2] {
    [hour.index() as f64, day.index() as f64]
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Sample {
    pub hour: Hour,
    pub day: Day,
    pub density: Density,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error(transparent)]
    Hour(#[from] HourParseError),
    #[error(transparent)]
    Day(#[from] DayParseError),
    #[error(transparent)]
    Density(#[from] DensityParseError),
}

impl Sample {
    #[inline]
    pub fn new(hour: Hour, day: Day, density: Density) -> Self {
        Self { hour, day, density }
    }

    /// Builds a sample from an untyped `(jam, hari, kepadatan)` row.
    pub fn from_raw(hour: i64, day: i64, label: &str) -> Result<Self, SampleError> {
        Ok(Self {
            hour: Hour::try_from(hour)?,
            day: Day::try_from(day)?,
            density: Density::from_str(label)?,
        })
    }

    #[inline]
    pub fn features(&self) -> [f64; 2] {
        features(self.hour, self.day)
    }

    #[inline]
    pub fn class(&self) -> usize {
        self.density.index()
    }
}
