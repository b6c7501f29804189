//! These structs provide the CLI interface for the vcost CLI.

use crate::model::{Amount, Category};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// vcost: Record vehicle costs in a Google sheet and see what they add up to.
///
/// Every entry goes to the `Daten` worksheet of a Google sheet that is shared by everyone who uses
/// it. Each person only sees their own entries, selected with --user.
///
/// The program does not sign in to Google by itself. Provide an access token for the Sheets API
/// in $VCOST_HOME/.secrets/token.json or in the VCOST_ACCESS_TOKEN environment variable.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. You need the URL of the Google sheet that holds
    /// (or will hold) the records. The sheet must have a worksheet named `Daten`, or pass
    /// --worksheet.
    Init(InitArgs),
    /// Record a new cost.
    Add(AddArgs),
    /// List your costs, newest first.
    List,
    /// Show your total and how it splits across categories and vehicles.
    Summary,
    /// List the vehicles that have been recorded so far, numbered for use with `add --pick`.
    Vehicles,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and backups are held. Defaults to ~/vcost
    #[arg(long, env = "VCOST_HOME", default_value_t = default_vcost_home())]
    home: DisplayPath,

    /// Whose costs to record and show.
    #[arg(long, env = "VCOST_USER", default_value = "Gast")]
    user: String,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf, user: impl Into<String>) -> Self {
        Self {
            log_level,
            home: home.into(),
            user: user.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

/// (Not shown): Args for the `vcost init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The name of the worksheet holding the records.
    #[arg(long)]
    worksheet: Option<String>,

    /// A JSON file with an access token, `{"access_token": "..."}`. It is moved to
    /// $VCOST_HOME/.secrets/token.json.
    #[arg(long)]
    token_file: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        worksheet: Option<String>,
        token_file: Option<PathBuf>,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            worksheet,
            token_file,
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn worksheet(&self) -> Option<&str> {
        self.worksheet.as_deref()
    }

    pub fn token_file(&self) -> Option<&Path> {
        self.token_file.as_deref()
    }
}

/// (Not shown): Args for the `vcost add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The vehicle, as free text.
    #[arg(long, conflicts_with = "pick", required_unless_present = "pick")]
    vehicle: Option<String>,

    /// The number of a known vehicle as shown by `vcost vehicles`.
    #[arg(long)]
    pick: Option<usize>,

    /// The kind of expense.
    #[arg(long, value_enum)]
    category: Category,

    /// The amount in CHF, e.g. 84.35 or "CHF 1'250.00".
    #[arg(long)]
    amount: Amount,

    /// The date of the expense, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// An optional note.
    #[arg(long, default_value = "")]
    note: String,
}

impl AddArgs {
    pub fn new(vehicle: VehicleArg, category: Category, amount: Amount) -> Self {
        let (vehicle, pick) = match vehicle {
            VehicleArg::Text(text) => (Some(text), None),
            VehicleArg::Pick(n) => (None, Some(n)),
        };
        Self {
            vehicle,
            pick,
            category,
            amount,
            date: None,
            note: String::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// How the vehicle was given. When neither flag is present this is an empty text, which the
    /// form rejects.
    pub fn vehicle(&self) -> VehicleArg {
        match (&self.vehicle, self.pick) {
            (_, Some(n)) => VehicleArg::Pick(n),
            (Some(text), None) => VehicleArg::Text(text.clone()),
            (None, None) => VehicleArg::Text(String::new()),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// The vehicle as given on the command line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VehicleArg {
    Text(String),
    /// 1-based position in the known vehicles list.
    Pick(usize),
}

fn default_vcost_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("vcost"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or VCOST_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("vcost")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "vcost",
            "--user",
            "Ana",
            "add",
            "--vehicle",
            "Audi A3",
            "--category",
            "fuel",
            "--amount",
            "CHF 84.35",
            "--date",
            "2025-10-12",
        ])
        .unwrap();
        assert_eq!(args.common().user(), "Ana");
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.vehicle(), VehicleArg::Text("Audi A3".to_string()));
        assert_eq!(add.category(), Category::Fuel);
        assert_eq!(add.amount().to_string(), "84.35");
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2025, 10, 12));
        assert_eq!(add.note(), "");
    }

    #[test]
    fn test_parse_add_pick() {
        let args = Args::try_parse_from([
            "vcost",
            "add",
            "--pick",
            "2",
            "--category",
            "service-repair",
            "--amount",
            "465.8",
        ])
        .unwrap();
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.vehicle(), VehicleArg::Pick(2));
        assert_eq!(add.category(), Category::ServiceRepair);
    }

    #[test]
    fn test_parse_add_needs_a_vehicle() {
        let result = Args::try_parse_from([
            "vcost",
            "add",
            "--category",
            "fuel",
            "--amount",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_add_rejects_negative_amount() {
        let result = Args::try_parse_from([
            "vcost",
            "add",
            "--vehicle",
            "Golf",
            "--category",
            "fuel",
            "--amount=-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_init() {
        let args = Args::try_parse_from([
            "vcost",
            "--home",
            "/tmp/somewhere",
            "init",
            "--sheet-url",
            "https://docs.google.com/spreadsheets/d/abc/edit",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/somewhere"));
        let Command::Init(init) = args.command() else {
            panic!("expected init");
        };
        assert_eq!(init.worksheet(), None);
        assert_eq!(init.token_file(), None);
    }
}
