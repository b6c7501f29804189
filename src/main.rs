use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use vehicle_costs::args::{Args, Command};
use vehicle_costs::{commands, Config, Mode, Result, LOG_TARGET};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();
    let user = args.common().user();

    // This allows for running the program without hitting the Google APIs. When
    // VCOST_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.sheet_url(),
            init_args.worksheet(),
            init_args.token_file(),
        )
        .await?
        .print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(config, mode, user, add_args.clone())
                .await?
                .print()
        }

        Command::List => commands::list(Config::load(home).await?, mode, user)
            .await?
            .print(),

        Command::Summary => commands::summary(Config::load(home).await?, mode, user)
            .await?
            .print(),

        Command::Vehicles => commands::vehicles(Config::load(home).await?, mode, user)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this program only.
            EnvFilter::new(default_directives(level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The filter directives used when RUST_LOG is not set. Command output is logged by the library,
/// so its target has to be enabled along with the binary's own.
fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    format!("{LOG_TARGET}={level},{}={level}", env!("CARGO_BIN_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_enable_library_output() {
        let directives = default_directives(LevelFilter::INFO);
        assert_eq!(LOG_TARGET, "vehicle_costs");
        assert!(directives.split(',').any(|d| d == "vehicle_costs=info"));
        assert!(directives.split(',').any(|d| d == "vcost=info"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_default_directives_follow_level() {
        let directives = default_directives(LevelFilter::DEBUG);
        assert_eq!(directives, "vehicle_costs=debug,vcost=debug");
    }
}
