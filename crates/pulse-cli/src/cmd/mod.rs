pub mod config;
pub mod present;
pub mod projects;
pub mod update;

use chrono::NaiveDate;

/// The reference date for progress: `--today` or the local calendar date.
pub fn reference_date(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| chrono::Local::now().date_naive())
}
