use crate::error::InputError;
use crate::time::{parse_time, TimeSlot};
use crate::window::parse_date;
use chrono::{NaiveDate, NaiveTime};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> $name {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id.to_string())
            }
        }

        #[cfg(feature = "serde")]
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                IdValue::deserialize(deserializer).map(|id| $name(id.into_string()))
            }
        }
    };
}

identifier!(
    /// A meeting room. `1` and `"1"` name the same room.
    RoomId
);

identifier!(
    /// The company a room is booked for
    CompanyId
);

/// Ids arrive as JSON strings or numbers depending on the endpoint
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

#[cfg(feature = "serde")]
impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Text(id) => id,
            IdValue::Integer(id) => id.to_string(),
            IdValue::Unsigned(id) => id.to_string(),
            // JS numbers; `1.0` prints as `1`
            IdValue::Float(id) => id.to_string(),
        }
    }
}

/// A confirmed reservation. Never modified once read.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExistingBooking {
    pub room: RoomId,
    pub company: CompanyId,
    pub date: NaiveDate,
    /// As recorded, seconds included
    pub time: NaiveTime,
}

impl ExistingBooking {
    pub fn new(
        room: impl Into<RoomId>,
        company: impl Into<CompanyId>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> ExistingBooking {
        ExistingBooking {
            room: room.into(),
            company: company.into(),
            date,
            time,
        }
    }

    /// Reads a booking from the text forms the listing endpoint uses.
    ///
    /// # Examples
    /// ```
    /// use roombook_libs::booking::ExistingBooking;
    /// use roombook_libs::time::TimeSlot;
    ///
    /// let booking = ExistingBooking::parse("R1", "C1", "2024-10-14", "09:00:00").unwrap();
    /// assert_eq!(booking.slot(), TimeSlot::new(9, 0).unwrap());
    ///
    /// assert!(ExistingBooking::parse("R1", "C1", "2024-10-14", "9 o'clock").is_err());
    /// ```
    pub fn parse(
        room: impl Into<RoomId>,
        company: impl Into<CompanyId>,
        date: &str,
        time: &str,
    ) -> Result<ExistingBooking, InputError> {
        Ok(ExistingBooking::new(
            room,
            company,
            parse_date(date)?,
            parse_time(time)?,
        ))
    }

    /// The slot this booking takes, seconds dropped
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::from(self.time)
    }

    /// Whether this booking takes `slot` for the queried room and date
    pub fn blocks(&self, slot: TimeSlot, query: &AvailabilityQuery) -> bool {
        self.room == query.room && self.date == query.date && self.slot() == slot
    }
}

/// The (room, date) pair slot occupancy is checked against
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AvailabilityQuery {
    pub room: RoomId,
    pub date: NaiveDate,
}

impl AvailabilityQuery {
    pub fn new(room: impl Into<RoomId>, date: NaiveDate) -> AvailabilityQuery {
        AvailabilityQuery {
            room: room.into(),
            date,
        }
    }

    pub fn parse(room: impl Into<RoomId>, date: &str) -> Result<AvailabilityQuery, InputError> {
        Ok(AvailabilityQuery::new(room, parse_date(date)?))
    }
}

/// One record as the meetings listing endpoint returns it
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookingRecord {
    #[cfg_attr(feature = "serde", serde(rename = "meetingID"))]
    pub room: RoomId,
    #[cfg_attr(feature = "serde", serde(rename = "companyID"))]
    pub company: CompanyId,
    pub time: String,
    pub date: String,
}

impl From<&ExistingBooking> for BookingRecord {
    fn from(booking: &ExistingBooking) -> Self {
        BookingRecord {
            room: booking.room.clone(),
            company: booking.company.clone(),
            time: booking.time.format("%H:%M:%S").to_string(),
            date: booking.date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl TryFrom<BookingRecord> for ExistingBooking {
    type Error = InputError;

    fn try_from(record: BookingRecord) -> Result<Self, Self::Error> {
        ExistingBooking::parse(record.room, record.company, &record.date, &record.time)
    }
}

/// The listing endpoint answers with either a bare array of records or an
/// object holding them under `data`. A null `data` is no records; an object
/// without `data` is not a listing and fails to deserialize.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BookingsPayload {
    List(Vec<BookingRecord>),
    Wrapped {
        #[serde(deserialize_with = "nullable_records")]
        data: Vec<BookingRecord>,
    },
}

#[cfg(feature = "serde")]
fn nullable_records<'de, D>(deserializer: D) -> Result<Vec<BookingRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<BookingRecord>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(feature = "serde")]
impl BookingsPayload {
    pub fn into_records(self) -> Vec<BookingRecord> {
        match self {
            BookingsPayload::List(records) => records,
            BookingsPayload::Wrapped { data } => data,
        }
    }

    /// # Examples
    /// ```
    /// use roombook_libs::booking::BookingsPayload;
    ///
    /// let payload: BookingsPayload = serde_json::from_str(
    ///     r#"{"data": [{"meetingID": 1, "companyID": "7", "time": "09:00:00", "date": "2024-10-14"}]}"#,
    /// )
    /// .unwrap();
    ///
    /// let bookings = payload.into_bookings().unwrap();
    /// assert_eq!(bookings[0].room.as_str(), "1");
    /// ```
    pub fn into_bookings(self) -> Result<Vec<ExistingBooking>, InputError> {
        parse_bookings(self.into_records())
    }
}

/// Converts wire records into bookings, failing on the first malformed one
/// rather than dropping it.
pub fn parse_bookings<I>(records: I) -> Result<Vec<ExistingBooking>, InputError>
where
    I: IntoIterator<Item = BookingRecord>,
{
    let bookings = records
        .into_iter()
        .map(|record| {
            trace!("Reading booking record {:?}", record);
            ExistingBooking::try_from(record)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            debug!("Rejected booking snapshot: {}", err);
            err
        })?;

    debug!("Read {} bookings", bookings.len());

    Ok(bookings)
}
