//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage with contributors, failures and warnings
    Full,
    /// Only the final consensus value
    Final,
    /// The whole pipeline report as JSON
    Json,
}

impl From<OutputFormat> for consensus_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => consensus_domain::OutputFormat::Full,
            OutputFormat::Final => consensus_domain::OutputFormat::Final,
            OutputFormat::Json => consensus_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for consensus-engine
#[derive(Parser, Debug)]
#[command(name = "consensus-engine")]
#[command(author, version, about = "Multi-backend consensus engine - several analysis backends, one trustworthy answer")]
#[command(long_about = r#"
consensus-engine sends the same analytical question to several independent
backends and reconciles their replies into one answer with a consensus score.

The pipeline has three stages:
1. Knowledge: domain knowledge relevant to the payload
2. Data: what the payload's data actually shows
3. Reasoning: conclusions drawn from the two previous stages

Each stage fans out to its backends in parallel. Failed or timed-out backends
are excluded; the run only fails when every backend of a stage fails.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./consensus.toml    Project-level config (or ./.consensus.toml)
3. ~/.config/consensus-engine/config.toml   Global config

Example:
  consensus-engine payload.json
  cat payload.json | consensus-engine -o json
  consensus-engine --config offline.toml --run-log run.jsonl payload.json
"#)]
pub struct Cli {
    /// JSON payload file to analyse ("-" or absent reads stdin)
    #[arg(value_name = "PAYLOAD")]
    pub payload: Option<PathBuf>,

    /// Output format (defaults to the configured one, then "final")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Ask backends for plain text instead of a JSON object
    #[arg(long)]
    pub text: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append run events to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub run_log: Option<PathBuf>,
}

impl Cli {
    /// True when the payload should be read from stdin
    pub fn reads_stdin(&self) -> bool {
        match &self.payload {
            None => true,
            Some(path) => path.as_os_str() == "-",
        }
    }

    /// Resolve the output format: flag first, then config, then the default
    pub fn output_format(
        &self,
        configured: Option<consensus_domain::OutputFormat>,
    ) -> consensus_domain::OutputFormat {
        self.output
            .map(Into::into)
            .or(configured)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "consensus-engine",
            "-vv",
            "-o",
            "json",
            "--text",
            "--run-log",
            "run.jsonl",
            "payload.json",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.text);
        assert_eq!(cli.run_log, Some(PathBuf::from("run.jsonl")));
        assert_eq!(cli.payload, Some(PathBuf::from("payload.json")));
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn test_stdin_payload() {
        let cli = Cli::parse_from(["consensus-engine"]);
        assert!(cli.reads_stdin());

        let cli = Cli::parse_from(["consensus-engine", "-"]);
        assert!(cli.reads_stdin());
    }

    #[test]
    fn test_output_format_precedence() {
        let cli = Cli::parse_from(["consensus-engine"]);
        assert_eq!(cli.output_format(None), consensus_domain::OutputFormat::Final);
        assert_eq!(
            cli.output_format(Some(consensus_domain::OutputFormat::Full)),
            consensus_domain::OutputFormat::Full
        );

        let cli = Cli::parse_from(["consensus-engine", "-o", "json"]);
        assert_eq!(
            cli.output_format(Some(consensus_domain::OutputFormat::Full)),
            consensus_domain::OutputFormat::Json
        );
    }
}
