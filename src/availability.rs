use crate::booking::{AvailabilityQuery, ExistingBooking};
use crate::time::{SlotCatalog, TimeSlot};
use crate::window::{BookingWindow, CalendarDay};
use itertools::Itertools;
use log::trace;
#[cfg(feature = "serde")]
use serde::Serialize;

pub trait Occupancy {
    fn occupies(self, slot: TimeSlot, query: &AvailabilityQuery) -> bool;
}

impl<'a, T> Occupancy for T
where
    T: Iterator<Item = &'a ExistingBooking>,
{
    /// Self is the booking snapshot. True if any booking takes `slot` for
    /// the queried room and date.
    ///
    /// # Examples
    /// ```
    /// use roombook_libs::availability::Occupancy;
    /// use roombook_libs::booking::{AvailabilityQuery, ExistingBooking};
    ///
    /// let bookings = vec![
    ///     ExistingBooking::parse("R1", "C1", "2024-10-14", "09:00:00").unwrap(),
    /// ];
    /// let query = AvailabilityQuery::parse("R1", "2024-10-14").unwrap();
    ///
    /// assert!(bookings.iter().occupies("09:00".parse().unwrap(), &query));
    /// assert!(!bookings.iter().occupies("09:30".parse().unwrap(), &query));
    /// ```
    fn occupies(mut self, slot: TimeSlot, query: &AvailabilityQuery) -> bool {
        self.any(|booking| booking.blocks(slot, query))
    }
}

/// A catalog slot and whether it can still be booked
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SlotStatus {
    pub slot: TimeSlot,
    pub available: bool,
}

/// True iff `start <= date <= end`, by calendar day.
///
/// A window whose start is after its end selects no date at all.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use roombook_libs::availability::is_date_selectable;
/// use roombook_libs::window::BookingWindow;
///
/// let start = NaiveDate::from_ymd_opt(2024, 10, 13).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
///
/// assert!(is_date_selectable(&end, &BookingWindow::new(start, end)));
/// assert!(!is_date_selectable(&end, &BookingWindow::new(end, start)));
/// ```
pub fn is_date_selectable<D>(date: &D, window: &BookingWindow) -> bool
where
    D: CalendarDay + ?Sized,
{
    window.contains(date)
}

/// True iff a booking for the queried room and date sits on `slot`.
/// Both sides are compared at hour:minute, so a booking recorded as
/// `09:00:00` takes the `09:00` slot.
pub fn is_slot_unavailable<S>(
    slot: S,
    query: &AvailabilityQuery,
    bookings: &[ExistingBooking],
) -> bool
where
    S: Into<TimeSlot>,
{
    bookings.iter().occupies(slot.into(), query)
}

/// The catalog slots still free for `query`, in catalog order
///
/// # Examples
/// ```
/// use roombook_libs::availability::list_available_slots;
/// use roombook_libs::booking::{AvailabilityQuery, ExistingBooking};
/// use roombook_libs::time::SlotCatalog;
///
/// let catalog = SlotCatalog::default();
/// let bookings = vec![
///     ExistingBooking::parse("R1", "C1", "2024-10-14", "09:00:00").unwrap(),
///     ExistingBooking::parse("R1", "C2", "2024-10-14", "12:30:00").unwrap(),
/// ];
/// let query = AvailabilityQuery::parse("R1", "2024-10-14").unwrap();
///
/// let free = list_available_slots(&catalog, &query, &bookings);
/// assert_eq!(free.len(), catalog.len() - 2);
/// assert_eq!(free[0].to_string(), "09:30");
/// ```
pub fn list_available_slots(
    catalog: &SlotCatalog,
    query: &AvailabilityQuery,
    bookings: &[ExistingBooking],
) -> Vec<TimeSlot> {
    let available = catalog
        .iter()
        .copied()
        .filter(|&slot| !is_slot_unavailable(slot, query, bookings))
        .collect_vec();

    trace!(
        "{} of {} slots free in {} on {}",
        available.len(),
        catalog.len(),
        query.room,
        query.date
    );

    available
}

/// Every catalog slot with its availability, in catalog order
pub fn slot_board(
    catalog: &SlotCatalog,
    query: &AvailabilityQuery,
    bookings: &[ExistingBooking],
) -> Vec<SlotStatus> {
    let board = catalog
        .iter()
        .map(|&slot| SlotStatus {
            slot,
            available: !is_slot_unavailable(slot, query, bookings),
        })
        .collect_vec();

    trace!(
        "Slot board for {} on {}: {} taken",
        query.room,
        query.date,
        board.iter().filter(|status| !status.available).count()
    );

    board
}

/// Bookings on the calendar day of `date`, any room, earliest first.
/// Bookings at the same minute keep their snapshot order.
pub fn bookings_on<'a, D>(date: &D, bookings: &'a [ExistingBooking]) -> Vec<&'a ExistingBooking>
where
    D: CalendarDay + ?Sized,
{
    let day = date.calendar_day();

    bookings
        .iter()
        .filter(|booking| booking.date == day)
        .sorted_by_key(|booking| booking.slot())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slot(value: &str) -> TimeSlot {
        value.parse().unwrap()
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let window = BookingWindow::new(day(2024, 10, 1), day(2024, 12, 30));

        assert!(is_date_selectable(&day(2024, 10, 1), &window));
        assert!(is_date_selectable(&day(2024, 11, 15), &window));
        assert!(is_date_selectable(&day(2024, 12, 30), &window));
        assert!(!is_date_selectable(&day(2024, 9, 30), &window));
        assert!(!is_date_selectable(&day(2024, 12, 31), &window));
    }

    #[test]
    fn empty_snapshot_leaves_everything_free() {
        let query = AvailabilityQuery::new("R1", day(2024, 10, 14));

        assert!(SlotCatalog::default()
            .iter()
            .all(|&s| !is_slot_unavailable(s, &query, &[])));
    }

    #[test]
    fn unavailable_accepts_precise_times() {
        let bookings = vec![ExistingBooking::parse("R1", "C1", "2024-10-14", "09:00:00").unwrap()];
        let query = AvailabilityQuery::new("R1", day(2024, 10, 14));

        let precise = crate::time::parse_time("09:00:45").unwrap();
        assert!(is_slot_unavailable(precise, &query, &bookings));
    }

    #[test]
    fn board_marks_taken_slots() {
        let catalog = SlotCatalog::from_slots(vec![slot("09:00"), slot("09:30"), slot("10:00")]);
        let bookings = vec![
            ExistingBooking::parse("R1", "C1", "2024-10-14", "09:30:00").unwrap(),
            ExistingBooking::parse("R2", "C1", "2024-10-14", "10:00:00").unwrap(),
        ];
        let query = AvailabilityQuery::new("R1", day(2024, 10, 14));

        assert_eq!(
            slot_board(&catalog, &query, &bookings),
            vec![
                SlotStatus {
                    slot: slot("09:00"),
                    available: true
                },
                SlotStatus {
                    slot: slot("09:30"),
                    available: false
                },
                SlotStatus {
                    slot: slot("10:00"),
                    available: true
                },
            ]
        );
    }

    #[test]
    fn bookings_on_filters_and_orders() {
        let bookings = vec![
            ExistingBooking::parse("R2", "C1", "2024-10-14", "15:00:00").unwrap(),
            ExistingBooking::parse("R1", "C1", "2024-10-15", "09:00:00").unwrap(),
            ExistingBooking::parse("R1", "C2", "2024-10-14", "09:00:00").unwrap(),
            ExistingBooking::parse("R2", "C3", "2024-10-14", "09:00:30").unwrap(),
        ];

        let listed = bookings_on(&day(2024, 10, 14), &bookings);

        assert_eq!(
            listed
                .iter()
                .map(|b| (b.room.as_str(), b.company.as_str()))
                .collect_vec(),
            vec![("R1", "C2"), ("R2", "C3"), ("R2", "C1")]
        );
        assert!(bookings_on(&day(2024, 10, 16), &bookings).is_empty());
    }
}
