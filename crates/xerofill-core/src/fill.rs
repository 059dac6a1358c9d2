//! The idempotent fill operations: check recorded hours first, create only
//! when the day reads as empty, retry creation under a bounded policy.
//!
//! The browser-facing side lives behind [`TimesheetBackend`] so the guard
//! logic can be exercised without a browser.

use crate::retry::RetryPolicy;
use async_trait::async_trait;
use chrono::NaiveDate;

/// What Xero reports for a day with no time entries.
pub const ZERO_HOURS: &str = "0:00";

pub const DEFAULT_HOURS: u32 = 8;

/// One time entry as presented to the provider. Never persisted locally -
/// the provider is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub project: String,
    pub task: String,
    pub hours: u32,
}

/// Project/task/hours applied to every day of a range fill.
#[derive(Debug, Clone)]
pub struct EntryDefaults {
    pub project: String,
    pub task: String,
    pub hours: u32,
}

impl EntryDefaults {
    pub fn entry_for(&self, date: NaiveDate) -> TimeEntry {
        TimeEntry {
            date,
            project: self.project.clone(),
            task: self.task.clone(),
            hours: self.hours,
        }
    }
}

/// The provider-side operations the fill logic needs.
#[async_trait]
pub trait TimesheetBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Recorded hours text for a date, e.g. `"0:00"` or `"8:00"`. Empty
    /// string when the date's row cannot be found.
    async fn recorded_hours(&self, date: NaiveDate) -> Result<String, Self::Error>;

    /// Create one entry. May be called multiple times under retry.
    async fn create_entry(&self, entry: &TimeEntry) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    Created,
    /// The date already had recorded hours; nothing was created.
    Skipped {
        existing: String,
    },
}

/// Create an entry unless the date already has recorded hours.
///
/// The idempotence check runs before any creation attempt, so re-running
/// over the same date never duplicates an entry.
pub async fn create_entry_safe<B>(
    backend: &B,
    policy: &RetryPolicy,
    entry: &TimeEntry,
) -> Result<FillOutcome, B::Error>
where
    B: TimesheetBackend + Sync,
{
    let existing = backend.recorded_hours(entry.date).await?;
    if existing != ZERO_HOURS {
        tracing::info!(
            "Already have time entries for {}: {existing} - skipping",
            entry.date
        );
        return Ok(FillOutcome::Skipped { existing });
    }

    policy.run(move || backend.create_entry(entry)).await?;
    tracing::info!(
        "Created {}h entry for {} ({} / {})",
        entry.hours,
        entry.date,
        entry.project,
        entry.task
    );

    Ok(FillOutcome::Created)
}

/// Fill every weekday from `start` to `end` inclusive with the default
/// entry. Weekends are skipped; the first unrecoverable failure propagates.
pub async fn fill_range<B>(
    backend: &B,
    policy: &RetryPolicy,
    defaults: &EntryDefaults,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, FillOutcome)>, B::Error>
where
    B: TimesheetBackend + Sync,
{
    let mut outcomes = Vec::new();

    for date in crate::schedule::weekdays_between(start, end) {
        let entry = defaults.entry_for(date);
        let outcome = create_entry_safe(backend, policy, &entry).await?;
        outcomes.push((date, outcome));
    }

    Ok(outcomes)
}
