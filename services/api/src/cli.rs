use crate::infra::{load_state, ProjectState};
use crate::report::{
    run_quotes, run_report, run_simulation, run_tally, run_vote_update, ReportArgs, SetVoteArgs,
    SimulateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use copro_elevator::config::{AppConfig, DataConfig};
use copro_elevator::error::AppError;
use copro_elevator::ProjectRules;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Elevator Project Assistant",
    about = "Compare elevator quotes, split costs and follow the co-ownership vote",
    version
)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the quote comparison and rubric scores
    Quotes,
    /// Split a target cost across the elevator building
    Simulate(SimulateArgs),
    /// Manage the vote records
    Votes {
        #[command(subcommand)]
        command: VotesCommand,
    },
    /// Print the full project report
    Report(ReportArgs),
}

#[derive(Subcommand, Debug)]
enum VotesCommand {
    /// Seed the vote records if the store is empty
    Init,
    /// Delete every vote record and reseed from the defaults
    Reset,
    /// Print the current tally and threshold status
    Tally,
    /// Record one unit's vote
    Set(SetVoteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DataArgs {
    /// Directory holding units.csv and quotes.csv
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,
    /// SQLite file backing the vote records
    #[arg(long, global = true)]
    pub(crate) db_path: Option<PathBuf>,
}

impl DataArgs {
    /// A new data directory also moves the default store location.
    pub(crate) fn apply(&self, config: &mut AppConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.data = DataConfig::new(data_dir.clone(), None);
        }
        if let Some(db_path) = &self.db_path {
            config.data.database_path = db_path.clone();
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, cli.data).await,
        Command::Quotes => {
            run_quotes(&offline_state(&cli.data)?);
            Ok(())
        }
        Command::Simulate(args) => run_simulation(&offline_state(&cli.data)?, args),
        Command::Votes { command } => {
            let state = offline_state(&cli.data)?;
            match command {
                VotesCommand::Init => {
                    // loading the state seeds an empty store
                    println!("Vote records ready ({} units)", state.votes.records()?.len());
                    Ok(())
                }
                VotesCommand::Reset => {
                    let seeded = state.votes.reset()?;
                    println!("Vote records reset ({seeded} units reseeded)");
                    Ok(())
                }
                VotesCommand::Tally => run_tally(&state),
                VotesCommand::Set(args) => run_vote_update(&state, args),
            }
        }
        Command::Report(args) => run_report(&offline_state(&cli.data)?, args),
    }
}

fn offline_state(data_args: &DataArgs) -> Result<ProjectState, AppError> {
    let mut config = AppConfig::load()?;
    data_args.apply(&mut config);
    load_state(&config.data, ProjectRules::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_take_overs() {
        let cli = Cli::try_parse_from([
            "copro-elevator-api",
            "simulate",
            "--amount",
            "156170",
            "--take-over",
            "14:3:40",
            "--take-over",
            "11:3:60",
        ])
        .expect("valid arguments");

        match cli.command {
            Some(Command::Simulate(args)) => {
                assert_eq!(args.amount, 156_170.0);
                assert_eq!(args.take_overs.len(), 2);
                assert!(args.step.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn data_dir_override_moves_the_default_store() {
        let cli = Cli::try_parse_from([
            "copro-elevator-api",
            "votes",
            "tally",
            "--data-dir",
            "/srv/copro",
        ])
        .expect("valid arguments");
        let mut config = AppConfig {
            environment: copro_elevator::config::AppEnvironment::Test,
            server: copro_elevator::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            telemetry: copro_elevator::config::TelemetryConfig {
                log_level: "info".to_string(),
            },
            data: DataConfig::new("data", None),
        };

        cli.data.apply(&mut config);
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/copro"));
        assert_eq!(
            config.data.database_path,
            PathBuf::from("/srv/copro/votes.sqlite3")
        );
    }

    #[test]
    fn vote_set_takes_an_optional_confidence() {
        let cli = Cli::try_parse_from([
            "copro-elevator-api",
            "votes",
            "set",
            "16",
            "opposed",
            "--confidence",
            "certain",
        ])
        .expect("valid arguments");

        match cli.command {
            Some(Command::Votes {
                command: VotesCommand::Set(args),
            }) => {
                assert_eq!(args.unit, 16);
                assert_eq!(args.vote, "opposed");
                assert_eq!(args.confidence.as_deref(), Some("certain"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
