use chrono::{Datelike, NaiveDate};

/// Every Monday-Friday calendar day from `start` to `end` inclusive.
/// A reversed range yields nothing.
pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |day| *day <= end)
        .filter(|day| day.weekday().num_days_from_monday() < 5)
}
