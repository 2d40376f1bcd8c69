//! Public holiday models.
//!
//! This module contains the [`PublicHoliday`] record and the
//! [`HolidayCalendar`] used to look holidays up by date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents a gazetted public holiday.
///
/// # Example
///
/// ```
/// use otms_engine::models::PublicHoliday;
/// use chrono::NaiveDate;
///
/// let holiday = PublicHoliday {
///     date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
///     name: "National Day".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// The date of the public holiday.
    pub date: NaiveDate,
    /// The name of the public holiday (e.g., "National Day").
    pub name: String,
}

/// Holiday file structure, one per calendar year.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayFile {
    /// Holidays listed in the file.
    pub holidays: Vec<PublicHoliday>,
}

/// A set of public holidays keyed by date.
///
/// At most one holiday is kept per date; inserting a second holiday on the
/// same date replaces the first.
///
/// # Example
///
/// ```
/// use otms_engine::models::{HolidayCalendar, PublicHoliday};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
/// let calendar = HolidayCalendar::from_holidays(vec![PublicHoliday {
///     date,
///     name: "Labour Day".to_string(),
/// }]);
///
/// assert!(calendar.is_holiday(date));
/// assert_eq!(calendar.get(date).unwrap().name, "Labour Day");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, PublicHoliday>,
}

impl HolidayCalendar {
    /// Builds a calendar from a list of holidays.
    pub fn from_holidays(holidays: impl IntoIterator<Item = PublicHoliday>) -> Self {
        let mut calendar = Self::default();
        for holiday in holidays {
            calendar.insert(holiday);
        }
        calendar
    }

    /// Adds or replaces the holiday on its date.
    pub fn insert(&mut self, holiday: PublicHoliday) -> Option<PublicHoliday> {
        self.holidays.insert(holiday.date, holiday)
    }

    /// Removes the holiday on the given date, if any.
    pub fn remove(&mut self, date: NaiveDate) -> Option<PublicHoliday> {
        self.holidays.remove(&date)
    }

    /// Returns the holiday on the given date, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&PublicHoliday> {
        self.holidays.get(&date)
    }

    /// Checks if a given date is a public holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Returns all holidays in date order.
    pub fn iter(&self) -> impl Iterator<Item = &PublicHoliday> {
        self.holidays.values()
    }

    /// Returns the number of holidays in the calendar.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Returns true if the calendar has no holidays.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}
