//! Recurring execution windows of time-windowed devices.
//!
//! Windows are declared in UTC with hour granularity. The wire format follows
//! Braket device documents:
//!
//! ```json
//! { "executionDay": "Weekdays", "windowStartHour": "09:00:00", "windowEndHour": "17:00:00" }
//! ```

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HalError, HalResult};

/// Day class a window recurs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionDay {
    Everyday,
    #[serde(alias = "Weekdays")]
    Weekday,
    #[serde(alias = "Weekends")]
    Weekend,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl ExecutionDay {
    /// Whether a window of this class applies on `day`.
    ///
    /// Monday to Friday only match `Weekday`, Saturday and Sunday only match
    /// `Weekend`; any day matches `Everyday` and its own name.
    pub fn applies_on(self, day: Weekday) -> bool {
        let is_weekend = matches!(day, Weekday::Sat | Weekday::Sun);
        match self {
            ExecutionDay::Everyday => true,
            ExecutionDay::Weekday => !is_weekend,
            ExecutionDay::Weekend => is_weekend,
            named => named.weekday() == Some(day),
        }
    }

    fn weekday(self) -> Option<Weekday> {
        match self {
            ExecutionDay::Monday => Some(Weekday::Mon),
            ExecutionDay::Tuesday => Some(Weekday::Tue),
            ExecutionDay::Wednesday => Some(Weekday::Wed),
            ExecutionDay::Thursday => Some(Weekday::Thu),
            ExecutionDay::Friday => Some(Weekday::Fri),
            ExecutionDay::Saturday => Some(Weekday::Sat),
            ExecutionDay::Sunday => Some(Weekday::Sun),
            ExecutionDay::Everyday | ExecutionDay::Weekday | ExecutionDay::Weekend => None,
        }
    }
}

/// A recurring window `[start_hour, end_hour)` on a day class.
///
/// `end_hour < start_hour` denotes a window running past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionWindow {
    #[serde(rename = "executionDay")]
    pub day: ExecutionDay,
    #[serde(rename = "windowStartHour", with = "hour_of_day")]
    pub start_hour: u32,
    #[serde(rename = "windowEndHour", with = "hour_of_day")]
    pub end_hour: u32,
}

impl ExecutionWindow {
    /// Create a window, rejecting hours outside `0..24`.
    pub fn new(day: ExecutionDay, start_hour: u32, end_hour: u32) -> HalResult<Self> {
        if start_hour > 23 || end_hour > 23 {
            return Err(HalError::InvalidWindow(format!(
                "hours must be within 0..24, got {start_hour}..{end_hour}"
            )));
        }
        Ok(Self {
            day,
            start_hour,
            end_hour,
        })
    }

    /// Whether the window runs past midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.end_hour < self.start_hour
    }
}

mod hour_of_day {
    use super::*;

    pub fn serialize<S: Serializer>(hour: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{hour:02}:00:00"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map(|t| t.hour())
            .map_err(|e| serde::de::Error::custom(format!("invalid hour '{raw}': {e}")))
    }
}
