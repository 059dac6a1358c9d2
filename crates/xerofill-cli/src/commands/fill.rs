use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use clap::Args;
use console::Term;
use std::path::PathBuf;
use std::time::Duration;
use xerofill_browser::{
    BrowserSession, LaunchOptions, ProfileDir, TimesheetController, find_chrome,
};
use xerofill_core::config::Config;
use xerofill_core::fill::{EntryDefaults, FillOutcome};
use xerofill_core::retry::RetryPolicy;

#[derive(Args)]
pub struct FillArgs {
    /// Fill a single date instead of today
    #[arg(long, value_parser = parse_date, conflicts_with_all = ["from", "to"])]
    date: Option<NaiveDate>,

    /// Start of an inclusive date range (weekends are skipped)
    #[arg(long, value_parser = parse_date, requires = "to")]
    from: Option<NaiveDate>,

    /// End of an inclusive date range
    #[arg(long, value_parser = parse_date, requires = "from")]
    to: Option<NaiveDate>,

    /// Hours to record per entry
    #[arg(long, default_value_t = xerofill_core::fill::DEFAULT_HOURS)]
    hours: u32,

    /// Project name (defaults to DEFAULT_PROJECT from the environment)
    #[arg(long)]
    project: Option<String>,

    /// Task name (defaults to DEFAULT_TASK from the environment)
    #[arg(long)]
    task: Option<String>,

    /// Path to the Chrome binary
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Browser profile directory (default: ~/.xerofill/profile)
    #[arg(long)]
    profile_dir: Option<PathBuf>,

    /// Run Chrome headless (a two-factor challenge needs a visible window)
    #[arg(long)]
    headless: bool,

    /// Creation attempts per entry (minimum 2)
    #[arg(long, default_value_t = xerofill_core::retry::DEFAULT_ATTEMPTS)]
    retries: u32,

    /// Pause between creation attempts, in milliseconds
    #[arg(long, default_value_t = 500)]
    backoff_ms: u64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Clone, Copy)]
enum Target {
    Today,
    Date(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

pub fn execute(args: FillArgs) -> Result<()> {
    let config = Config::from_env()?;

    let target = match (args.date, args.from, args.to) {
        (Some(date), _, _) => Target::Date(date),
        (None, Some(from), Some(to)) => {
            if from > to {
                bail!("--from must not be after --to");
            }
            Target::Range(from, to)
        }
        _ => Target::Today,
    };

    if matches!(target, Target::Today) && !args.yes && !confirm("Fill today's timesheet?")? {
        println!("Aborted.");
        return Ok(());
    }

    let retry = RetryPolicy::new(args.retries, Duration::from_millis(args.backoff_ms))?;
    let defaults = EntryDefaults {
        project: args.project.unwrap_or_else(|| config.default_project.clone()),
        task: args.task.unwrap_or_else(|| config.default_task.clone()),
        hours: args.hours,
    };

    let chrome = find_chrome(args.chrome_path.as_deref())?;
    println!("🔍 Using Chrome at: {}", chrome.display());
    tracing::debug!(
        "Filling with project {:?}, task {:?}, {}h per entry",
        defaults.project,
        defaults.task,
        defaults.hours
    );

    let profile_path = match args.profile_dir {
        Some(path) => path,
        None => ProfileDir::default_path()?,
    };

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let profile = ProfileDir::ensure(profile_path, &chrome).await?;
        println!("📁 Using profile: {}", profile.path().display());

        println!("🚀 Launching Chrome...");
        let session = BrowserSession::launch(&LaunchOptions {
            chrome_path: chrome.clone(),
            profile_dir: profile.path().to_path_buf(),
            headless: args.headless,
        })
        .await?;

        let controller = TimesheetController::new(session, config, defaults, retry);

        // Run the fill, but close the session whatever happens
        let outcomes = run_fill(&controller, target).await;
        let close_result = controller.into_session().close().await;

        let outcomes = outcomes?;
        close_result?;

        report(&outcomes);
        Ok(())
    });

    // Explicitly shutdown runtime with timeout to prevent hanging on blocking tasks
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn run_fill(
    controller: &TimesheetController,
    target: Target,
) -> Result<Vec<(NaiveDate, FillOutcome)>, xerofill_browser::Error> {
    controller.login().await?;
    controller.go_to_time_entries().await?;

    match target {
        Target::Today => {
            let today = Local::now().date_naive();
            Ok(vec![(today, controller.fill_today().await?)])
        }
        Target::Date(date) => Ok(vec![(date, controller.fill_date(date).await?)]),
        Target::Range(from, to) => controller.fill_range(from, to).await,
    }
}

fn report(outcomes: &[(NaiveDate, FillOutcome)]) {
    if outcomes.is_empty() {
        println!("Nothing to fill - the requested days are all weekend days.");
        return;
    }

    for (date, outcome) in outcomes {
        match outcome {
            FillOutcome::Created => println!("✅ {date}: entry created"),
            FillOutcome::Skipped { existing } => {
                println!("⏭️  {date}: already has {existing}, skipped")
            }
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    let term = Term::stdout();
    term.write_str(&format!("{question} [y/N] "))?;
    let key = term.read_char()?;
    println!();
    Ok(key.eq_ignore_ascii_case(&'y'))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    s.parse()
        .map_err(|_| format!("invalid date {s:?}, expected YYYY-MM-DD"))
}
