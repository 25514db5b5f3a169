use thiserror::Error;

/// Input that could not be turned into a date, a time of day or a setting.
///
/// Malformed input is never coerced into an availability answer: callers get
/// one of these instead of "available" or "unavailable".
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum InputError {
    #[error("Invalid date {value:?}. Expected YYYY-MM-DD or a timestamp starting with one")]
    InvalidDate { value: String },
    #[error("Invalid time {value:?}. Expected HH:MM or HH:MM:SS")]
    InvalidTime { value: String },
    #[error("Slot step of {minutes} minutes does not divide a day")]
    InvalidStep { minutes: u32 },
    #[error("No slots between {opens} and {closes}")]
    EmptyCatalog { opens: String, closes: String },
    #[error("Invalid value {value:?} for setting {key}")]
    InvalidSetting { key: String, value: String },
}
