use crate::error::InputError;
use chrono::{NaiveTime, Timelike};
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

const MINUTES_PER_DAY: u32 = 24 * 60;

pub const DEFAULT_OPENS: TimeSlot = TimeSlot(9 * 60);
pub const DEFAULT_CLOSES: TimeSlot = TimeSlot(18 * 60);
pub const DEFAULT_STEP_MINUTES: u32 = 30;

/// Formats tried in order when reading a time of day.
/// `%.f` also accepts a missing fraction, so `09:00:00` matches the first one.
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// A bookable time of day, truncated to hour:minute.
/// Stored as minutes since midnight, always below 24:00.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Construct a new Time Slot
    ///
    /// # Examples
    /// ```
    /// use roombook_libs::time::TimeSlot;
    ///
    /// let slot = TimeSlot::new(9, 30).unwrap();
    /// assert_eq!(slot.hour(), 9);
    /// assert_eq!(slot.minute(), 30);
    ///
    /// assert!(TimeSlot::new(24, 0).is_err());
    /// ```
    pub fn new(hour: u32, minute: u32) -> Result<TimeSlot, InputError> {
        if hour < 24 && minute < 60 {
            Ok(TimeSlot((hour * 60 + minute) as u16))
        } else {
            Err(InputError::InvalidTime {
                value: format!("{:02}:{:02}", hour, minute),
            })
        }
    }

    /// Slot starting `minutes` after midnight, if that is still within the day.
    pub fn from_minutes(minutes: u32) -> Option<TimeSlot> {
        if minutes < MINUTES_PER_DAY {
            Some(TimeSlot(minutes as u16))
        } else {
            None
        }
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.0)
    }

    /// The `HH:MM:SS` form the reservation endpoint stores.
    ///
    /// # Examples
    /// ```
    /// use roombook_libs::time::TimeSlot;
    ///
    /// assert_eq!(TimeSlot::new(9, 0).unwrap().to_wire(), "09:00:00");
    /// ```
    pub fn to_wire(self) -> String {
        format!("{}:00", self)
    }
}

impl From<NaiveTime> for TimeSlot {
    /// Truncates to hour:minute, discarding seconds and anything finer
    fn from(time: NaiveTime) -> Self {
        TimeSlot((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = InputError;

    /// # Examples
    /// ```
    /// use roombook_libs::time::TimeSlot;
    ///
    /// let with_seconds: TimeSlot = "09:00:00".parse().unwrap();
    /// let without: TimeSlot = "09:00".parse().unwrap();
    /// assert_eq!(with_seconds, without);
    ///
    /// assert!("nine".parse::<TimeSlot>().is_err());
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_time(value).map(TimeSlot::from)
    }
}

/// Reads a time of day at whatever precision it was written with.
/// Accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.fraction`.
pub fn parse_time(value: &str) -> Result<NaiveTime, InputError> {
    let trimmed = value.trim();

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| InputError::InvalidTime {
            value: value.to_string(),
        })
}

/// Truncates a time of day to the slot it falls on the boundary of.
pub fn normalize_time(time: NaiveTime) -> TimeSlot {
    TimeSlot::from(time)
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// The ordered list of bookable slots. Fixed once built; the same for every
/// room and date.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlotCatalog {
    slots: Vec<TimeSlot>,
}

impl SlotCatalog {
    /// Every `step_minutes` from `opens` up to and including `closes`
    ///
    /// # Examples
    /// ```
    /// use roombook_libs::time::{SlotCatalog, TimeSlot};
    ///
    /// let catalog = SlotCatalog::stepped(
    ///     TimeSlot::new(9, 0).unwrap(),
    ///     TimeSlot::new(10, 0).unwrap(),
    ///     30,
    /// )
    /// .unwrap();
    ///
    /// let slots: Vec<String> = catalog.iter().map(|s| s.to_string()).collect();
    /// assert_eq!(slots, vec!["09:00", "09:30", "10:00"]);
    /// ```
    pub fn stepped(
        opens: TimeSlot,
        closes: TimeSlot,
        step_minutes: u32,
    ) -> Result<SlotCatalog, InputError> {
        if step_minutes == 0 || MINUTES_PER_DAY % step_minutes != 0 {
            return Err(InputError::InvalidStep {
                minutes: step_minutes,
            });
        }

        if opens > closes {
            return Err(InputError::EmptyCatalog {
                opens: opens.to_string(),
                closes: closes.to_string(),
            });
        }

        Ok(SlotCatalog {
            slots: steps(opens, closes, step_minutes),
        })
    }

    /// Catalog in the given order. Repeated slots keep their first position.
    pub fn from_slots<I>(slots: I) -> SlotCatalog
    where
        I: IntoIterator<Item = TimeSlot>,
    {
        SlotCatalog {
            slots: slots.into_iter().unique().collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSlot> {
        self.slots.iter()
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.slots.contains(&slot)
    }
}

impl Default for SlotCatalog {
    /// 09:00 through 18:00, every half hour
    fn default() -> Self {
        SlotCatalog {
            slots: steps(DEFAULT_OPENS, DEFAULT_CLOSES, DEFAULT_STEP_MINUTES),
        }
    }
}

/// Expects a nonzero step and `opens <= closes`
fn steps(opens: TimeSlot, closes: TimeSlot, step_minutes: u32) -> Vec<TimeSlot> {
    (opens.minutes_since_midnight()..=closes.minutes_since_midnight())
        .step_by(step_minutes as usize)
        .filter_map(TimeSlot::from_minutes)
        .collect()
}

impl<'a> IntoIterator for &'a SlotCatalog {
    type Item = &'a TimeSlot;
    type IntoIter = std::slice::Iter<'a, TimeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_seconds_and_fractions() {
        let precise = parse_time("09:00:59.250").unwrap();
        assert_eq!(normalize_time(precise), TimeSlot::new(9, 0).unwrap());

        let plain = parse_time("18:30").unwrap();
        assert_eq!(normalize_time(plain).to_string(), "18:30");
    }

    #[test]
    fn rejects_malformed_times() {
        for value in &["", "9", "25:00", "09:60", "09-00", "noon"] {
            assert!(
                matches!(parse_time(value), Err(InputError::InvalidTime { .. })),
                "{:?} should not parse",
                value
            );
        }
    }

    #[test]
    fn default_catalog() {
        let catalog = SlotCatalog::default();

        assert_eq!(catalog.len(), 19);
        assert_eq!(catalog.slots().first(), Some(&TimeSlot::new(9, 0).unwrap()));
        assert_eq!(catalog.slots().last(), Some(&TimeSlot::new(18, 0).unwrap()));
        assert!(catalog.iter().tuple_windows().all(|(a, b)| a < b));
    }

    #[test]
    fn stepped_matches_default() {
        let stepped = SlotCatalog::stepped(
            TimeSlot::new(9, 0).unwrap(),
            TimeSlot::new(18, 0).unwrap(),
            30,
        )
        .unwrap();

        assert_eq!(stepped, SlotCatalog::default());
        assert_eq!(
            SlotCatalog::stepped(DEFAULT_OPENS, DEFAULT_CLOSES, DEFAULT_STEP_MINUTES),
            Ok(SlotCatalog::default())
        );

        let default = SlotCatalog::default();
        assert_eq!(default.len(), 19);
        assert_eq!(default.iter().next(), Some(&DEFAULT_OPENS));
        assert_eq!(default.iter().last(), Some(&DEFAULT_CLOSES));
    }

    #[test]
    fn stepped_rejects_bad_steps() {
        let opens = TimeSlot::new(9, 0).unwrap();
        let closes = TimeSlot::new(18, 0).unwrap();

        assert_eq!(
            SlotCatalog::stepped(opens, closes, 0),
            Err(InputError::InvalidStep { minutes: 0 })
        );
        assert_eq!(
            SlotCatalog::stepped(opens, closes, 7),
            Err(InputError::InvalidStep { minutes: 7 })
        );
        assert!(matches!(
            SlotCatalog::stepped(closes, opens, 30),
            Err(InputError::EmptyCatalog { .. })
        ));
    }

    #[test]
    fn from_slots_keeps_order() {
        let catalog = SlotCatalog::from_slots(vec![
            TimeSlot::new(14, 0).unwrap(),
            TimeSlot::new(9, 0).unwrap(),
            TimeSlot::new(14, 0).unwrap(),
        ]);

        assert_eq!(
            catalog.slots(),
            &[TimeSlot::new(14, 0).unwrap(), TimeSlot::new(9, 0).unwrap()]
        );
    }
}
