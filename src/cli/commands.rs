//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Windowed incremental export CLI
#[derive(Parser, Debug)]
#[command(name = "export-cdk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Built-in connector name or connector manifest file (YAML)
    #[arg(short, long, global = true, default_value = "dixa")]
    pub connector: PathBuf,

    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline configuration JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), read at start and rewritten after every window
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON (not persisted)
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the configuration the connector needs
    Spec,

    /// Validate configuration and manifest without network access
    Check,

    /// List stream names
    Streams,

    /// List built-in connectors
    List,

    /// Read data from streams
    Read {
        /// Streams to read (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Split a comma-separated stream list, dropping blanks
pub fn parse_stream_list(list: Option<&str>) -> Vec<String> {
    list.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_command() {
        let cli = Cli::try_parse_from([
            "export-cdk",
            "--config-json",
            r#"{"api_token":"x","start_date":"2023-01-01"}"#,
            "--state",
            "state.json",
            "read",
            "--streams",
            "message_export",
        ])
        .unwrap();

        assert_eq!(cli.connector, PathBuf::from("dixa"));
        assert_eq!(cli.state, Some(PathBuf::from("state.json")));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Read { streams } => assert_eq!(streams.as_deref(), Some("message_export")),
            other => panic!("expected read, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["export-cdk", "check", "--verbose", "-c", "my.yaml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.connector, PathBuf::from("my.yaml"));
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_parse_stream_list() {
        assert_eq!(
            parse_stream_list(Some("a, b,,c ")),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_stream_list(None).is_empty());
        assert!(parse_stream_list(Some(" ")).is_empty());
    }
}
