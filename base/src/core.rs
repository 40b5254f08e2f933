use derive_more::{Display, Into};
use std::{fmt, hint, str::FromStr};
use thiserror::Error;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Display, Into)]
pub struct Hour(u8);

impl Hour {
    pub const COUNT: usize = 24;

    #[inline]
    pub const fn from_index(val: usize) -> Hour {
        assert!(val < Self::COUNT, "hour must be between 0 and 23");
        Hour(val as u8)
    }

    #[inline]
    pub const fn try_from_index(val: usize) -> Option<Hour> {
        if val < Self::COUNT {
            Some(Hour(val as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..Self::COUNT as u8).map(Hour)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HourParseError {
    #[error("bad hour {0:?}")]
    BadNumber(String),
    #[error("hour {0} is out of range 0..=23")]
    OutOfRange(i64),
}

impl TryFrom<i64> for Hour {
    type Error = HourParseError;

    fn try_from(val: i64) -> Result<Self, Self::Error> {
        usize::try_from(val)
            .ok()
            .and_then(Hour::try_from_index)
            .ok_or(HourParseError::OutOfRange(val))
    }
}

impl FromStr for Hour {
    type Err = HourParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val: i64 = s
            .parse()
            .map_err(|_| HourParseError::BadNumber(s.to_string()))?;
        Hour::try_from(val)
    }
}

/// Day of week, numbered the way PostgreSQL `EXTRACT(DOW ...)` does: 0 is Sunday.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Display, Into)]
pub struct Day(u8);

impl Day {
    pub const COUNT: usize = 7;

    const NAMES: [&'static str; Self::COUNT] = [
        "Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu",
    ];

    #[inline]
    pub const fn from_index(val: usize) -> Day {
        assert!(val < Self::COUNT, "day must be between 0 and 6");
        Day(val as u8)
    }

    #[inline]
    pub const fn try_from_index(val: usize) -> Option<Day> {
        if val < Self::COUNT {
            Some(Day(val as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.0 as usize]
    }

    #[inline]
    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..Self::COUNT as u8).map(Day)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DayParseError {
    #[error("bad day {0:?}")]
    BadNumber(String),
    #[error("day {0} is out of range 0..=6")]
    OutOfRange(i64),
}

impl TryFrom<i64> for Day {
    type Error = DayParseError;

    fn try_from(val: i64) -> Result<Self, Self::Error> {
        usize::try_from(val)
            .ok()
            .and_then(Day::try_from_index)
            .ok_or(DayParseError::OutOfRange(val))
    }
}

impl FromStr for Day {
    type Err = DayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val: i64 = s
            .parse()
            .map_err(|_| DayParseError::BadNumber(s.to_string()))?;
        Day::try_from(val)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Density {
    Kosong = 0,
    Ramai = 1,
    Penuh = 2,
}

impl Density {
    pub const COUNT: usize = 3;

    /// Label for each class id.
    pub const LABELS: [&'static str; Self::COUNT] = ["kosong", "ramai", "penuh"];

    #[inline]
    pub const fn index(self) -> usize {
        self as u8 as usize
    }

    #[inline]
    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Self::Kosong,
            1 => Self::Ramai,
            2 => Self::Penuh,
            _ => unsafe { hint::unreachable_unchecked() },
        }
    }

    #[inline]
    pub const fn from_index(val: usize) -> Option<Self> {
        if val < Self::COUNT {
            Some(unsafe { Self::from_index_unchecked(val) })
        } else {
            None
        }
    }

    #[inline]
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        Self::LABELS[self as usize]
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DensityParseError {
    #[error("unknown density label {0:?}")]
    UnknownLabel(String),
}

impl FromStr for Density {
    type Err = DensityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LABELS
            .iter()
            .position(|&label| label == s)
            .and_then(Density::from_index)
            .ok_or_else(|| DensityParseError::UnknownLabel(s.to_string()))
    }
}
