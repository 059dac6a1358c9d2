mod chrome;
mod controller;
mod error;
mod profile;
mod session;

pub use chrome::find_chrome;
pub use controller::TimesheetController;
pub use error::{Error, Result};
pub use profile::ProfileDir;
pub use session::{BrowserSession, LaunchOptions, WaitOptions, automation_id, data_name};
