use crate::availability::{is_date_selectable, is_slot_unavailable};
use crate::booking::{AvailabilityQuery, CompanyId, ExistingBooking, RoomId};
use crate::time::{SlotCatalog, TimeSlot};
use crate::window::BookingWindow;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ReservationError {
    #[error("Please choose a {0}")]
    MissingField(&'static str),
    #[error("{date} is outside the booking window {start} to {end}")]
    DateNotSelectable {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("{slot} is not a bookable time slot")]
    UnknownSlot { slot: TimeSlot },
    #[error("{room} is already booked at {slot} on {date}")]
    SlotTaken {
        room: RoomId,
        date: NaiveDate,
        slot: TimeSlot,
    },
}

/// A booking form as the user fills it in. Every field starts empty.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct ReservationRequest {
    pub room: Option<RoomId>,
    pub company: Option<CompanyId>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
}

/// A request that passed validation, ready to hand to the reservation
/// endpoint. Serializes to the endpoint's field names.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Reservation {
    #[cfg_attr(feature = "serde", serde(rename = "meetingID"))]
    pub room: RoomId,
    #[cfg_attr(feature = "serde", serde(rename = "companyID"))]
    pub company: CompanyId,
    #[cfg_attr(feature = "serde", serde(rename = "time", serialize_with = "wire_time"))]
    pub slot: TimeSlot,
    pub date: NaiveDate,
}

#[cfg(feature = "serde")]
fn wire_time<S>(slot: &TimeSlot, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&slot.to_wire())
}

impl ReservationRequest {
    /// Checks the request against the window, the catalog and the current
    /// snapshot. Fields are checked in form order: room, company, date, time.
    ///
    /// The snapshot may be stale, so passing here does not guarantee the
    /// endpoint accepts the reservation.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use roombook_libs::reservation::{ReservationError, ReservationRequest};
    /// use roombook_libs::time::SlotCatalog;
    /// use roombook_libs::window::WindowPolicy;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
    /// let window = WindowPolicy::default().resolve(today);
    ///
    /// let mut request = ReservationRequest {
    ///     room: Some("Meeting room 1".into()),
    ///     ..Default::default()
    /// };
    ///
    /// assert_eq!(
    ///     request.validate(&window, &SlotCatalog::default(), &[]),
    ///     Err(ReservationError::MissingField("company"))
    /// );
    ///
    /// request.company = Some("7".into());
    /// request.date = Some(today);
    /// request.time = Some("10:00".parse().unwrap());
    ///
    /// let reservation = request.validate(&window, &SlotCatalog::default(), &[]).unwrap();
    /// assert_eq!(reservation.slot.to_wire(), "10:00:00");
    /// ```
    pub fn validate(
        &self,
        window: &BookingWindow,
        catalog: &SlotCatalog,
        bookings: &[ExistingBooking],
    ) -> Result<Reservation, ReservationError> {
        let room = self
            .room
            .clone()
            .ok_or(ReservationError::MissingField("room"))?;
        let company = self
            .company
            .clone()
            .ok_or(ReservationError::MissingField("company"))?;
        let date = self.date.ok_or(ReservationError::MissingField("date"))?;
        let slot = self.time.ok_or(ReservationError::MissingField("time"))?;

        if !is_date_selectable(&date, window) {
            debug!("Rejected reservation on {}: outside booking window", date);
            return Err(ReservationError::DateNotSelectable {
                date,
                start: window.start(),
                end: window.end(),
            });
        }

        if !catalog.contains(slot) {
            debug!("Rejected reservation at {}: not in catalog", slot);
            return Err(ReservationError::UnknownSlot { slot });
        }

        let query = AvailabilityQuery::new(room, date);
        if is_slot_unavailable(slot, &query, bookings) {
            debug!(
                "Rejected reservation for {} at {} on {}: already booked",
                query.room, slot, date
            );
            return Err(ReservationError::SlotTaken {
                room: query.room,
                date,
                slot,
            });
        }

        debug!("Reservation for {} at {} on {} is valid", query.room, slot, date);

        Ok(Reservation {
            room: query.room,
            company,
            slot,
            date,
        })
    }
}

impl From<Reservation> for ExistingBooking {
    /// The booking to add to the snapshot once the endpoint confirms
    fn from(reservation: Reservation) -> Self {
        ExistingBooking::new(
            reservation.room,
            reservation.company,
            reservation.date,
            NaiveTime::from_hms_opt(reservation.slot.hour(), reservation.slot.minute(), 0)
                .unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowPolicy;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled() -> ReservationRequest {
        ReservationRequest {
            room: Some("R1".into()),
            company: Some("C1".into()),
            date: Some(day(2024, 10, 14)),
            time: Some("09:00".parse().unwrap()),
        }
    }

    fn window() -> BookingWindow {
        WindowPolicy::default().resolve(day(2024, 10, 14))
    }

    #[test]
    fn reports_first_missing_field() {
        let catalog = SlotCatalog::default();

        assert_eq!(
            ReservationRequest::default().validate(&window(), &catalog, &[]),
            Err(ReservationError::MissingField("room"))
        );

        let mut request = filled();
        request.date = None;
        request.time = None;
        assert_eq!(
            request.validate(&window(), &catalog, &[]),
            Err(ReservationError::MissingField("date"))
        );

        let mut request = filled();
        request.time = None;
        assert_eq!(
            request.validate(&window(), &catalog, &[]),
            Err(ReservationError::MissingField("time"))
        );
    }

    #[test]
    fn rejects_dates_outside_window() {
        let mut request = filled();
        request.date = Some(day(2024, 10, 12));

        assert_eq!(
            request.validate(&window(), &SlotCatalog::default(), &[]),
            Err(ReservationError::DateNotSelectable {
                date: day(2024, 10, 12),
                start: day(2024, 10, 13),
                end: day(2024, 10, 14),
            })
        );
    }

    #[test]
    fn rejects_slots_outside_catalog() {
        let mut request = filled();
        request.time = Some("08:30".parse().unwrap());

        assert!(matches!(
            request.validate(&window(), &SlotCatalog::default(), &[]),
            Err(ReservationError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn rejects_taken_slot_only_for_same_room() {
        let bookings = vec![ExistingBooking::parse("R1", "C9", "2024-10-14", "09:00:00").unwrap()];
        let catalog = SlotCatalog::default();

        assert_eq!(
            filled().validate(&window(), &catalog, &bookings),
            Err(ReservationError::SlotTaken {
                room: "R1".into(),
                date: day(2024, 10, 14),
                slot: "09:00".parse().unwrap(),
            })
        );

        let mut other_room = filled();
        other_room.room = Some("R2".into());
        assert!(other_room.validate(&window(), &catalog, &bookings).is_ok());
    }

    #[test]
    fn confirmed_reservation_blocks_its_slot() {
        let catalog = SlotCatalog::default();
        let reservation = filled().validate(&window(), &catalog, &[]).unwrap();

        let snapshot = vec![ExistingBooking::from(reservation)];
        assert!(matches!(
            filled().validate(&window(), &catalog, &snapshot),
            Err(ReservationError::SlotTaken { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_for_the_endpoint() {
        let reservation = filled().validate(&window(), &SlotCatalog::default(), &[]).unwrap();

        assert_eq!(
            serde_json::to_value(&reservation).unwrap(),
            serde_json::json!({
                "meetingID": "R1",
                "companyID": "C1",
                "time": "09:00:00",
                "date": "2024-10-14",
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_form() {
        let request: ReservationRequest =
            serde_json::from_str(r#"{"room": 2, "time": "11:30"}"#).unwrap();

        assert_eq!(request.room, Some(RoomId::from("2")));
        assert_eq!(request.company, None);
        assert_eq!(request.time, Some("11:30".parse().unwrap()));
    }
}
