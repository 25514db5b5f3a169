#![no_main]
use chrono::{Days, NaiveDate, NaiveTime};
use libfuzzer_sys::fuzz_target;
use roombook_libs::{
    bookings_on, is_slot_unavailable, list_available_slots, slot_board, AvailabilityQuery,
    ExistingBooking, SlotCatalog, TimeSlot,
};

// (room, day offset, minute of day, second)
type RawBooking = (u8, u8, u16, u8);

fuzz_target!(|data: (u8, u8, Vec<u16>, Vec<RawBooking>)| {
    #[cfg(feature = "log")]
    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stdout())
        .apply();

    let (room, offset, raw_slots, raw_bookings) = data;
    let first = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
    let day = |offset: u8| first.checked_add_days(Days::new(u64::from(offset % 8))).unwrap();

    let catalog = if raw_slots.is_empty() {
        SlotCatalog::default()
    } else {
        SlotCatalog::from_slots(
            raw_slots
                .iter()
                .filter_map(|&m| TimeSlot::from_minutes(u32::from(m))),
        )
    };

    let bookings: Vec<ExistingBooking> = raw_bookings
        .iter()
        .filter_map(|&(room, offset, minute, second)| {
            let minute = u32::from(minute);
            NaiveTime::from_hms_opt(minute / 60, minute % 60, u32::from(second % 60)).map(|time| {
                ExistingBooking::new(format!("R{}", room % 4), "C", day(offset), time)
            })
        })
        .collect();

    let query = AvailabilityQuery::new(format!("R{}", room % 4), day(offset));

    let free = list_available_slots(&catalog, &query, &bookings);
    let board = slot_board(&catalog, &query, &bookings);

    assert_eq!(board.len(), catalog.len(), "One board entry per catalog slot");
    assert!(
        board
            .iter()
            .zip(catalog.iter())
            .all(|(status, slot)| status.slot == *slot),
        "Board follows catalog order"
    );
    assert_eq!(
        free,
        board
            .iter()
            .filter(|status| status.available)
            .map(|status| status.slot)
            .collect::<Vec<_>>(),
        "Free slots are the available board entries, in catalog order"
    );

    let taken = bookings
        .iter()
        .filter(|b| b.room == query.room && b.date == query.date)
        .map(|b| b.slot())
        .collect::<Vec<_>>();
    for slot in catalog.iter() {
        assert_eq!(
            is_slot_unavailable(*slot, &query, &bookings),
            taken.contains(slot),
            "Slot {} occupancy",
            slot
        );
    }

    let listed = bookings_on(&query.date, &bookings);
    assert!(listed.iter().all(|b| b.date == query.date));
    assert!(
        listed.windows(2).all(|w| w[0].slot() <= w[1].slot()),
        "Listing is ordered by time"
    );
});
