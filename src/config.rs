use crate::error::InputError;
use crate::time::{SlotCatalog, TimeSlot, DEFAULT_CLOSES, DEFAULT_OPENS, DEFAULT_STEP_MINUTES};
use crate::window::{
    parse_date, BookingWindow, WindowPolicy, DEFAULT_DAYS_AFTER, DEFAULT_DAYS_BEFORE,
};
use chrono::NaiveDate;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const OPENS_VAR: &str = "ROOMBOOK_OPENS";
pub const CLOSES_VAR: &str = "ROOMBOOK_CLOSES";
pub const STEP_VAR: &str = "ROOMBOOK_STEP_MINUTES";
pub const WINDOW_START_VAR: &str = "ROOMBOOK_WINDOW_START";
pub const WINDOW_END_VAR: &str = "ROOMBOOK_WINDOW_END";
pub const DAYS_BEFORE_VAR: &str = "ROOMBOOK_DAYS_BEFORE";
pub const DAYS_AFTER_VAR: &str = "ROOMBOOK_DAYS_AFTER";

/// How the slot catalog is laid out
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct CatalogConfig {
    pub opens: TimeSlot,
    /// Last bookable slot, inclusive
    pub closes: TimeSlot,
    pub step_minutes: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            opens: DEFAULT_OPENS,
            closes: DEFAULT_CLOSES,
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

impl CatalogConfig {
    pub fn build(&self) -> Result<SlotCatalog, InputError> {
        SlotCatalog::stepped(self.opens, self.closes, self.step_minutes)
    }
}

/// Everything the booking form is configured with
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct BookingPolicy {
    pub catalog: CatalogConfig,
    pub window: WindowPolicy,
}

impl BookingPolicy {
    /// Reads the `ROOMBOOK_*` variables. Unset variables keep their defaults.
    pub fn from_env() -> Result<BookingPolicy, InputError> {
        BookingPolicy::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading settings through `lookup`
    ///
    /// # Examples
    /// ```
    /// use roombook_libs::config::BookingPolicy;
    ///
    /// let policy = BookingPolicy::from_lookup(|key| match key {
    ///     "ROOMBOOK_STEP_MINUTES" => Some("60".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(policy.catalog().unwrap().len(), 10);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<BookingPolicy, InputError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog = CatalogConfig {
            opens: setting(&lookup, OPENS_VAR, TimeSlot::from_str)?.unwrap_or(DEFAULT_OPENS),
            closes: setting(&lookup, CLOSES_VAR, TimeSlot::from_str)?.unwrap_or(DEFAULT_CLOSES),
            step_minutes: setting(&lookup, STEP_VAR, u32::from_str)?
                .unwrap_or(DEFAULT_STEP_MINUTES),
        };

        let start = setting(&lookup, WINDOW_START_VAR, parse_date)?;
        let end = setting(&lookup, WINDOW_END_VAR, parse_date)?;

        let window = match (start, end) {
            (Some(start), Some(end)) => WindowPolicy::Fixed { start, end },
            (None, None) => WindowPolicy::Relative {
                days_before: setting(&lookup, DAYS_BEFORE_VAR, u32::from_str)?
                    .unwrap_or(DEFAULT_DAYS_BEFORE),
                days_after: setting(&lookup, DAYS_AFTER_VAR, u32::from_str)?
                    .unwrap_or(DEFAULT_DAYS_AFTER),
            },
            (Some(_), None) => return Err(unpaired(WINDOW_END_VAR)),
            (None, Some(_)) => return Err(unpaired(WINDOW_START_VAR)),
        };

        let policy = BookingPolicy { catalog, window };
        debug!("Loaded booking policy {:?}", policy);

        Ok(policy)
    }

    pub fn catalog(&self) -> Result<SlotCatalog, InputError> {
        self.catalog.build()
    }

    pub fn window(&self, today: NaiveDate) -> BookingWindow {
        self.window.resolve(today)
    }
}

fn setting<F, P, T, E>(lookup: &F, key: &str, parse: P) -> Result<Option<T>, InputError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, E>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => parse(value.trim())
            .map(Some)
            .map_err(|_| InputError::InvalidSetting {
                key: key.to_string(),
                value,
            }),
    }
}

fn unpaired(missing: &str) -> InputError {
    InputError::InvalidSetting {
        key: missing.to_string(),
        value: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let policy = BookingPolicy::from_lookup(lookup(&[])).unwrap();

        assert_eq!(policy, BookingPolicy::default());
        assert_eq!(policy.catalog().unwrap(), SlotCatalog::default());
        assert_eq!(
            policy.window,
            WindowPolicy::Relative {
                days_before: 1,
                days_after: 0
            }
        );
    }

    #[test]
    fn fixed_window_needs_both_ends() {
        let policy = BookingPolicy::from_lookup(lookup(&[
            (WINDOW_START_VAR, "2024-10-01"),
            (WINDOW_END_VAR, "2024-12-30"),
        ]))
        .unwrap();

        assert_eq!(
            policy.window,
            WindowPolicy::Fixed {
                start: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
            }
        );

        assert_eq!(
            BookingPolicy::from_lookup(lookup(&[(WINDOW_START_VAR, "2024-10-01")])),
            Err(InputError::InvalidSetting {
                key: WINDOW_END_VAR.to_string(),
                value: String::new(),
            })
        );
    }

    #[test]
    fn unparsable_values_are_errors() {
        assert_eq!(
            BookingPolicy::from_lookup(lookup(&[(STEP_VAR, "half an hour")])),
            Err(InputError::InvalidSetting {
                key: STEP_VAR.to_string(),
                value: "half an hour".to_string(),
            })
        );
        assert!(BookingPolicy::from_lookup(lookup(&[(OPENS_VAR, "9am")])).is_err());
    }

    #[test]
    fn custom_hours() {
        let policy = BookingPolicy::from_lookup(lookup(&[
            (OPENS_VAR, "08:00"),
            (CLOSES_VAR, "12:00:00"),
            (DAYS_AFTER_VAR, "7"),
        ]))
        .unwrap();

        assert_eq!(policy.catalog().unwrap().len(), 9);
        assert_eq!(
            policy.window,
            WindowPolicy::Relative {
                days_before: 1,
                days_after: 7
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults() {
        let policy: BookingPolicy = serde_json::from_str(
            r#"{"catalog": {"stepMinutes": 60}, "window": {"kind": "fixed", "start": "2024-10-01", "end": "2024-12-30"}}"#,
        )
        .unwrap();

        assert_eq!(policy.catalog.opens, TimeSlot::new(9, 0).unwrap());
        assert_eq!(policy.catalog.step_minutes, 60);
        assert!(matches!(policy.window, WindowPolicy::Fixed { .. }));

        let empty: BookingPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, BookingPolicy::default());
    }
}
