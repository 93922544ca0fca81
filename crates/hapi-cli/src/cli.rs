//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use hapi_config::Theme;

#[derive(Parser)]
#[command(
    name = "hapi",
    version,
    about = "Build the HAPI humanitarian data warehouse",
    long_about = "Build the HAPI humanitarian data warehouse.\n\n\
                  Loads reference data for the tracked countries (locations, admin\n\
                  units, sectors, organisation types, organisation aliases), then\n\
                  populates each configured theme from its result set."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Populate the warehouse from the configured sources.
    Run(RunArgs),

    /// Load and validate a configuration file without running anything.
    CheckConfig(ConfigArgs),

    /// Print the admin2 code a reported admin code maps to.
    ResolveAdmin2(ResolveArgs),
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Pipeline configuration (TOML).
    #[arg(long = "config", value_name = "PATH", default_value = "hapi.toml")]
    pub config: PathBuf,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only populate these themes (repeatable; default: every configured theme).
    #[arg(long = "theme", value_enum)]
    pub themes: Vec<ThemeArg>,

    /// Delete the warehouse file before running.
    #[arg(long = "fresh")]
    pub fresh: bool,

    /// Write the organisation alias table seen during the run as JSON.
    #[arg(long = "alias-report", value_name = "PATH")]
    pub alias_report: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Admin code as reported by a source.
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Granularity the code was reported at (national, adminone, admintwo).
    #[arg(long = "granularity", value_name = "LEVEL")]
    pub granularity: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Population,
    OperationalPresence,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Population => Self::Population,
            ThemeArg::OperationalPresence => Self::OperationalPresence,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_themes() {
        let cli = Cli::parse_from([
            "hapi",
            "run",
            "--config",
            "conf/hapi.toml",
            "--theme",
            "population",
            "--theme",
            "operational-presence",
            "--fresh",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.config, PathBuf::from("conf/hapi.toml"));
        assert_eq!(
            args.themes,
            [ThemeArg::Population, ThemeArg::OperationalPresence]
        );
        assert!(args.fresh);
        assert!(args.alias_report.is_none());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "hapi",
            "resolve-admin2",
            "AFG",
            "--granularity",
            "national",
            "--log-format",
            "json",
        ]);
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(matches!(cli.command, Command::ResolveAdmin2(_)));
    }
}
