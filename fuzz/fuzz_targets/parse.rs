#![no_main]
use chrono::Datelike;
use libfuzzer_sys::fuzz_target;
use roombook_libs::time::{parse_time, TimeSlot};
use roombook_libs::window::parse_date;

fuzz_target!(|data: (&str, &str)| {
    let (date, time) = data;

    // Must never panic, only succeed or report the input back
    if let Ok(parsed) = parse_time(time) {
        let slot = TimeSlot::from(parsed);
        assert_eq!(slot.to_string().parse::<TimeSlot>().ok(), Some(slot));
        assert!(slot.minutes_since_midnight() < 24 * 60);
    }

    if let Ok(parsed) = parse_date(date) {
        // Years past 9999 print with a sign and are out of scope
        if !(0..=9999).contains(&parsed.year()) {
            return;
        }
        assert_eq!(parse_date(&parsed.to_string()).ok(), Some(parsed));
    }
});
