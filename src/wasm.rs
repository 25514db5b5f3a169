//! Browser entry points for the booking form.
//!
//! Requests are plain JS objects, read with `serde-wasm-bindgen`. Any
//! `InputError` comes back to JS as a rejected value holding its message.

use crate::availability::{self, SlotStatus};
use crate::booking::{parse_bookings, AvailabilityQuery, BookingRecord, ExistingBooking, RoomId};
use crate::config::BookingPolicy;
use crate::error::InputError;
use crate::time::{SlotCatalog, TimeSlot};
use crate::window::parse_date;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRequest {
    #[serde(default)]
    policy: BookingPolicy,
    room: RoomId,
    date: String,
    #[serde(default)]
    bookings: Vec<BookingRecord>,
}

impl AvailabilityRequest {
    fn prepare(self) -> Result<(SlotCatalog, AvailabilityQuery, Vec<ExistingBooking>), InputError> {
        Ok((
            self.policy.catalog()?,
            AvailabilityQuery::parse(self.room, &self.date)?,
            parse_bookings(self.bookings)?,
        ))
    }
}

#[derive(Deserialize)]
struct ListingRequest {
    date: String,
    #[serde(default)]
    bookings: Vec<BookingRecord>,
}

fn input_error(err: InputError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// `{ policy?, room, date, bookings? }` to the free slots as `HH:MM` strings
#[wasm_bindgen(js_name = availableSlots)]
pub fn available_slots(request: JsValue) -> Result<JsValue, JsValue> {
    let request: AvailabilityRequest = serde_wasm_bindgen::from_value(request)?;
    let (catalog, query, bookings) = request.prepare().map_err(input_error)?;

    let slots: Vec<TimeSlot> = availability::list_available_slots(&catalog, &query, &bookings);

    Ok(serde_wasm_bindgen::to_value(&slots)?)
}

/// `{ policy?, room, date, bookings? }` to `[{ slot, available }]` for every
/// catalog slot
#[wasm_bindgen(js_name = slotBoard)]
pub fn slot_board(request: JsValue) -> Result<JsValue, JsValue> {
    let request: AvailabilityRequest = serde_wasm_bindgen::from_value(request)?;
    let (catalog, query, bookings) = request.prepare().map_err(input_error)?;

    let board: Vec<SlotStatus> = availability::slot_board(&catalog, &query, &bookings);

    Ok(serde_wasm_bindgen::to_value(&board)?)
}

/// `{ date, bookings? }` to that day's bookings in any room, earliest first,
/// as listing records
#[wasm_bindgen(js_name = bookingsOn)]
pub fn bookings_on(request: JsValue) -> Result<JsValue, JsValue> {
    let request: ListingRequest = serde_wasm_bindgen::from_value(request)?;
    let date = parse_date(&request.date).map_err(input_error)?;
    let bookings = parse_bookings(request.bookings).map_err(input_error)?;

    let listing: Vec<BookingRecord> = availability::bookings_on(&date, &bookings)
        .into_iter()
        .map(BookingRecord::from)
        .collect();

    Ok(serde_wasm_bindgen::to_value(&listing)?)
}

/// Whether `date` can be picked under `policy` on the caller's `today`.
/// Both dates are `YYYY-MM-DD`; the browser knows the user's today, the
/// library does not.
#[wasm_bindgen(js_name = isDateSelectable)]
pub fn is_date_selectable(date: &str, policy: JsValue, today: &str) -> Result<bool, JsValue> {
    let policy: BookingPolicy = if policy.is_undefined() || policy.is_null() {
        BookingPolicy::default()
    } else {
        serde_wasm_bindgen::from_value(policy)?
    };

    let date = parse_date(date).map_err(input_error)?;
    let today = parse_date(today).map_err(input_error)?;

    Ok(availability::is_date_selectable(&date, &policy.window(today)))
}
