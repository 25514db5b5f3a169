pub mod availability;
pub mod booking;
pub mod config;
pub mod error;
pub mod reservation;
pub mod time;
pub mod window;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use availability::{
    bookings_on, is_date_selectable, is_slot_unavailable, list_available_slots, slot_board,
    SlotStatus,
};
pub use booking::{AvailabilityQuery, CompanyId, ExistingBooking, RoomId};
pub use error::InputError;
pub use time::{SlotCatalog, TimeSlot};
pub use window::{BookingWindow, WindowPolicy};
