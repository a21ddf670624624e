use clap::{Parser, Subcommand, ValueEnum};

use super::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "agent")]
#[command(about = "Submit weather-data queries to the agent and follow their progress", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Agent base URL
    #[arg(long = "api-url", env = "AGENT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Where log output goes
    #[arg(long = "log", value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a natural-language query, e.g. "441000205 の 2025-04-20 12時〜13時の ru"
    Run {
        query: String,

        /// Follow this task's progress instead of the id returned by the agent
        #[arg(long = "task-id")]
        task_id: Option<String>,

        /// Ignore stage regressions reported by the server
        #[arg(long)]
        strict: bool,

        /// Print the acknowledgment and exit
        #[arg(long = "no-follow")]
        no_follow: bool,
    },
    /// Follow the progress of an already submitted task
    Watch {
        task_id: String,

        /// Ignore stage regressions reported by the server
        #[arg(long)]
        strict: bool,
    },
    /// Check that the agent is up
    Health,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_overrides() {
        let cli = Cli::parse_from([
            "agent",
            "run",
            "441000205 の ru",
            "--task-id",
            "t-9",
            "--strict",
            "-vv",
            "--api-url",
            "http://localhost:7000",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:7000"));
        match cli.command {
            Command::Run {
                query,
                task_id,
                strict,
                no_follow,
            } => {
                assert_eq!(query, "441000205 の ru");
                assert_eq!(task_id.as_deref(), Some("t-9"));
                assert!(strict);
                assert!(!no_follow);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
