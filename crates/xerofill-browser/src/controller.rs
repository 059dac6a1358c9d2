//! Drives one authenticated Xero session through the UI steps needed to
//! read and create time entries. All selectors target Xero's
//! `data-automationid` / `data-name` attributes.

use crate::session::{BrowserSession, WaitOptions, automation_id, data_name};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use std::time::Duration;
use xerofill_core::config::Config;
use xerofill_core::fill::{self, EntryDefaults, FillOutcome, TimeEntry, TimesheetBackend};
use xerofill_core::retry::RetryPolicy;

const LOGIN_URL: &str = "https://login.xero.com/identity/user/login";
const APP_URL: &str = "https://go.xero.com";
const TIME_ENTRIES_PATH: &str = "/projects/time-entries";
const TWO_FACTOR_PATH: &str = "/login/two-factor";
const XERO_HOST_FRAGMENT: &str = "xero";

const EMAIL_FIELD: &str = "#xl-form-email";
const PASSWORD_FIELD: &str = "#xl-form-password";
const SUBMIT_BUTTON: &str = "#xl-form-submit";

/// Clicking the app header dismisses an already-open datepicker.
const PAGE_HEADER: &str = "#shell-app-root > header > div > div:first-of-type";

pub struct TimesheetController {
    session: BrowserSession,
    config: Config,
    defaults: EntryDefaults,
    retry: RetryPolicy,
    wait: WaitOptions,
}

impl TimesheetController {
    pub fn new(
        session: BrowserSession,
        config: Config,
        defaults: EntryDefaults,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            session,
            config,
            defaults,
            retry,
            wait: WaitOptions::default(),
        }
    }

    pub fn into_session(self) -> BrowserSession {
        self.session
    }

    /// Log in with the configured credentials. A two-factor challenge is
    /// left for the user to answer in the browser window; the device is
    /// marked as remembered so subsequent runs on this profile skip it.
    pub async fn login(&self) -> Result<()> {
        tracing::info!("Logging in to Xero");
        self.session.goto(LOGIN_URL).await?;
        self.session.close_other_pages(XERO_HOST_FRAGMENT).await?;

        let email = self.session.wait_clickable(EMAIL_FIELD, &self.wait).await?;
        email.click().await?;
        email.type_str(&self.config.email).await?;

        let password = self
            .session
            .wait_clickable(PASSWORD_FIELD, &self.wait)
            .await?;
        password.click().await?;
        password.type_str(&self.config.password).await?;

        self.session
            .wait_clickable(SUBMIT_BUTTON, &self.wait)
            .await?
            .click()
            .await?;

        // Login lands either in the app or on the two-factor challenge
        let landed = self
            .session
            .wait_url_contains_any(
                &[APP_URL, TWO_FACTOR_PATH],
                &WaitOptions::new(Duration::from_secs(30), Duration::from_millis(500)),
            )
            .await?;

        if landed == 1 {
            self.confirm_two_factor().await?;
        }

        tracing::info!("Logged in");
        Ok(())
    }

    async fn confirm_two_factor(&self) -> Result<()> {
        tracing::info!("Two-factor challenge: enter the code in the browser window");

        self.session
            .wait_clickable(
                &automation_id("auth-remembermecheckbox--checkbox"),
                &self.wait,
            )
            .await?
            .click()
            .await?;

        self.session
            .wait_clickable(&automation_id("auth-onetimepassword--input"), &self.wait)
            .await?
            .click()
            .await?;

        // The user types the code; wait for the redirect into the app
        self.session
            .wait_url_contains(
                APP_URL,
                &WaitOptions::new(Duration::from_secs(60), Duration::from_millis(500)),
            )
            .await
    }

    /// Projects area, then the time entries screen.
    pub async fn go_to_time_entries(&self) -> Result<()> {
        self.session
            .wait_clickable(&data_name("navigation-menu/projects"), &self.wait)
            .await?
            .click()
            .await?;

        self.session
            .wait_clickable(
                &data_name("navigation-menu/projects/time-entries"),
                &self.wait,
            )
            .await?
            .click()
            .await?;

        self.session
            .wait_url_contains(TIME_ENTRIES_PATH, &self.wait)
            .await
    }

    async fn require_time_entries_page(&self) -> Result<()> {
        let url = self.session.current_url().await?;
        if !url.contains(TIME_ENTRIES_PATH) {
            return Err(Error::Precondition(format!(
                "Not on the time entries page (currently at {url})"
            )));
        }
        Ok(())
    }

    /// Open the date-range picker and select `date`.
    pub async fn pick_date(&self, date: NaiveDate) -> Result<()> {
        self.require_time_entries_page().await?;

        self.session
            .wait_clickable(PAGE_HEADER, &self.wait)
            .await?
            .click()
            .await?;

        self.session
            .wait_clickable(
                &automation_id("time-entry-date-range-dropdown-button"),
                &self.wait,
            )
            .await?
            .click()
            .await?;

        self.session
            .wait_clickable(
                &automation_id("time-entry-date-range-datepicker-item--body"),
                &self.wait,
            )
            .await?
            .click()
            .await?;

        self.session
            .select_by_label(
                &automation_id("time-entry-date-range-datepicker--yearselector"),
                &date.format("%Y").to_string(),
                &self.wait,
            )
            .await?;
        self.session
            .select_by_label(
                &automation_id("time-entry-date-range-datepicker--monthselector"),
                &date.format("%B").to_string(),
                &self.wait,
            )
            .await?;

        let day_cell = format!(
            "{} .xui-datepicker--day time[datetime=\"{}\"]",
            automation_id("time-entry-date-range-datepicker"),
            date.format("%Y-%m-%d")
        );
        self.session
            .wait_clickable(&day_cell, &self.wait)
            .await?
            .click()
            .await?;

        Ok(())
    }

    /// Recorded hours text for `date`, or `""` when its weekday row is not
    /// in the list.
    pub async fn check_hours(&self, date: NaiveDate) -> Result<String> {
        self.require_time_entries_page().await?;
        self.pick_date(date).await?;

        let rows = self
            .session
            .wait_list_stable(&automation_id("time-entry-list-weekday-item"), &self.wait)
            .await?;

        // Rows read like "Wed 3 8:00"
        let label = format!("{} {}", date.format("%a"), date.day());
        for row in rows {
            if row.contains(&label) {
                return Ok(row.replace(&label, "").trim().to_string());
            }
        }

        Ok(String::new())
    }

    async fn create_entry_on_page(&self, entry: &TimeEntry) -> Result<()> {
        self.require_time_entries_page().await?;

        // A modal left open by a failed attempt blocks everything below
        self.session
            .close_if_present(&automation_id("time-entry-modal-modal--close"))
            .await?;

        self.pick_date(entry.date).await?;

        self.session
            .wait_clickable(&automation_id("projects-button-add-time"), &self.wait)
            .await?
            .click()
            .await?;

        let project_input = self
            .session
            .wait_clickable(&automation_id("time-entry-modal-project--input"), &self.wait)
            .await?;
        project_input.click().await?;
        project_input.type_str(&entry.project).await?;

        // First autocomplete suggestion
        self.session
            .wait_clickable(&automation_id("autocompleter-option"), &self.wait)
            .await?
            .click()
            .await?;

        self.session
            .wait_clickable(
                &automation_id("time-entry-modal-task-wrap--button"),
                &self.wait,
            )
            .await?
            .click()
            .await?;

        // Task option labels must match exactly
        self.session
            .wait_labelled(
                &automation_id("time-entry-modal-task-option"),
                &entry.task,
                &self.wait,
            )
            .await?
            .click()
            .await?;

        let duration_input = self
            .session
            .wait_clickable(
                &automation_id("time-entry-modal-duration--input"),
                &self.wait,
            )
            .await?;
        duration_input.click().await?;
        duration_input.type_str(&entry.hours.to_string()).await?;

        self.session
            .wait_clickable(
                &automation_id("time-entry-modal-save-button-group-save-button"),
                &self.wait,
            )
            .await?
            .click()
            .await?;

        tracing::debug!("Saved entry for {}", entry.date);
        Ok(())
    }

    /// Ensure `date` has an entry with the configured defaults.
    pub async fn fill_date(&self, date: NaiveDate) -> Result<FillOutcome> {
        let entry = self.defaults.entry_for(date);
        fill::create_entry_safe(self, &self.retry, &entry).await
    }

    /// Ensure today has an entry with the configured defaults.
    pub async fn fill_today(&self) -> Result<FillOutcome> {
        self.fill_date(Local::now().date_naive()).await
    }

    /// Ensure every weekday from `start` to `end` inclusive has an entry.
    pub async fn fill_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, FillOutcome)>> {
        fill::fill_range(self, &self.retry, &self.defaults, start, end).await
    }
}

#[async_trait]
impl TimesheetBackend for TimesheetController {
    type Error = Error;

    async fn recorded_hours(&self, date: NaiveDate) -> Result<String> {
        self.check_hours(date).await
    }

    async fn create_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.create_entry_on_page(entry).await
    }
}
