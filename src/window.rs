use crate::error::InputError;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Anything that falls on a calendar day.
/// Only the day is used, the time of day never is.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz> CalendarDay for DateTime<Tz>
where
    Tz: TimeZone,
{
    /// The day as seen in the timestamp's own offset
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Reads a calendar date. A timestamp is accepted too, and its date is taken
/// as written: `2024-10-14T23:30:00-05:00` is the 14th, not the 15th.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use roombook_libs::window::parse_date;
///
/// let day = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
///
/// assert_eq!(parse_date("2024-10-14").unwrap(), day);
/// assert_eq!(parse_date("2024-10-14T00:00:00.000Z").unwrap(), day);
/// assert!(parse_date("14/10/2024").is_err());
/// ```
pub fn parse_date(value: &str) -> Result<NaiveDate, InputError> {
    let trimmed = value.trim();

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.calendar_day())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|timestamp| timestamp.calendar_day())
        })
        .ok_or_else(|| InputError::InvalidDate {
            value: value.to_string(),
        })
}

/// Inclusive [start, end] range of selectable dates.
///
/// `start > end` is allowed and selects nothing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl BookingWindow {
    /// Construct a new Booking Window
    /// Window is inclusive on [start, end]
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use roombook_libs::window::BookingWindow;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
    /// let window = BookingWindow::new(start, end);
    ///
    /// assert!(window.contains(&start));
    /// assert!(window.contains(&end));
    /// assert!(!window.contains(&NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> BookingWindow {
        BookingWindow { start, end }
    }

    pub fn start(self) -> NaiveDate {
        self.start
    }

    pub fn end(self) -> NaiveDate {
        self.end
    }

    pub fn is_malformed(self) -> bool {
        self.start > self.end
    }

    pub fn contains<D>(&self, date: &D) -> bool
    where
        D: CalendarDay + ?Sized,
    {
        let day = date.calendar_day();
        self.start <= day && day <= self.end
    }

    /// Every selectable date, in order. Empty for a malformed window.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use roombook_libs::window::BookingWindow;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 10, 13).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
    ///
    /// assert_eq!(BookingWindow::new(start, end).days().count(), 2);
    /// assert_eq!(BookingWindow::new(end, start).days().count(), 0);
    /// ```
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

pub const DEFAULT_DAYS_BEFORE: u32 = 1;
pub const DEFAULT_DAYS_AFTER: u32 = 0;

/// How the booking window is decided.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "camelCase")
)]
pub enum WindowPolicy {
    /// An explicit range, the same whatever day it is
    Fixed { start: NaiveDate, end: NaiveDate },
    /// A range around the day the window is resolved on
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    Relative { days_before: u32, days_after: u32 },
}

impl Default for WindowPolicy {
    /// Yesterday through today
    fn default() -> Self {
        WindowPolicy::Relative {
            days_before: DEFAULT_DAYS_BEFORE,
            days_after: DEFAULT_DAYS_AFTER,
        }
    }
}

impl WindowPolicy {
    /// The window in effect on `today`. Relative windows saturate at the ends
    /// of the calendar rather than overflow.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use roombook_libs::window::WindowPolicy;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
    /// let window = WindowPolicy::default().resolve(today);
    ///
    /// assert_eq!(window.start(), NaiveDate::from_ymd_opt(2024, 10, 13).unwrap());
    /// assert_eq!(window.end(), today);
    /// ```
    pub fn resolve(self, today: NaiveDate) -> BookingWindow {
        match self {
            WindowPolicy::Fixed { start, end } => BookingWindow::new(start, end),
            WindowPolicy::Relative {
                days_before,
                days_after,
            } => BookingWindow::new(
                today
                    .checked_sub_days(Days::new(u64::from(days_before)))
                    .unwrap_or(NaiveDate::MIN),
                today
                    .checked_add_days(Days::new(u64::from(days_after)))
                    .unwrap_or(NaiveDate::MAX),
            ),
        }
    }

    /// The window in effect on the local calendar's today
    pub fn resolve_now(self) -> BookingWindow {
        self.resolve(chrono::Local::now().date_naive())
    }
}
