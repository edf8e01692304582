use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Validator};

/// A same-day, half-open wall-clock interval `[start, end)` on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, Error> {
        let slot = Self { date, start, end };
        slot.validate()?;
        Ok(slot)
    }

    /// Touching endpoints do not overlap: `[9, 11)` and `[11, 12)` are disjoint.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

impl Validator for TimeSlot {
    fn validate(&self) -> Result<(), Error> {
        if self.start >= self.end {
            return Err(Error::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}
