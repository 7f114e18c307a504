//! Command-line argument definitions.

use std::path::PathBuf;

use chatrelay_protocol::TargetKind;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Diagnostic verbosity for the chatrelay crates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    /// Default: problems only
    #[default]
    #[value(alias = "warning")]
    Warn,
    /// Stream lifecycle and submitted reviews
    Info,
    /// Requests, configuration and skipped events
    Debug,
    /// Every received unit
    Trace,
}

impl LogLevel {
    /// Level name as used in an `EnvFilter` directive.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse an environment value, ignoring case and surrounding spaces.
    pub fn parse_env(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}

/// Chatrelay - talk to prompts and agents from the terminal
#[derive(Debug, Parser)]
#[command(name = "chatrelay", author, version)]
#[command(about = "Chatrelay - stream, fetch and review chats", long_about = None)]
pub struct Cli {
    /// Shorthand for --log-level debug
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log level for diagnostics written to stderr
    #[arg(long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Path to a config file (defaults to ~/.chatrelay/config.toml)
    #[arg(long = "config", global = true, env = "CHATRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Stream a chat response as it is generated
    Stream(ChatArgs),

    /// Request a complete chat response in one call
    Get(ChatArgs),

    /// Submit a review for a finished chat
    Review(ReviewArgs),
}

/// Arguments shared by `stream` and `get`.
#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Target kind: prompt, agent (or portal, workflow on the legacy API)
    pub kind: TargetKind,

    /// Target identifier
    pub id: String,

    /// User identifier sent with the request
    #[arg(long = "user", short = 'u')]
    pub user_id: Option<String>,

    /// Template variable, repeatable (NAME=VALUE)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_key_val)]
    pub variables: Vec<(String, String)>,

    /// Secret forwarded to an agent, repeatable (NAME=VALUE)
    #[arg(long = "secret", value_name = "NAME=VALUE", value_parser = parse_key_val)]
    pub secrets: Vec<(String, String)>,

    /// User message appended to the conversation, repeatable
    #[arg(long = "message", short = 'm')]
    pub messages: Vec<String>,

    /// Print the result as a JSON object
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `review`.
#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Chat identifier returned by `stream` or `get`
    pub chat_id: String,

    /// User identifier
    #[arg(long = "user", short = 'u')]
    pub user_id: Option<String>,

    /// Numeric score
    #[arg(long, short = 's', allow_negative_numbers = true)]
    pub score: Option<i32>,

    /// Free-form review text
    #[arg(long, short = 't')]
    pub text: Option<String>,
}

/// Parse a `NAME=VALUE` pair. The value may contain further `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("name=Ada").unwrap(),
            ("name".to_string(), "Ada".to_string())
        );
        assert_eq!(
            parse_key_val("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_val("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_stream_command() {
        let cli = Cli::try_parse_from([
            "chatrelay",
            "stream",
            "agent",
            "a1",
            "--user",
            "u1",
            "--var",
            "topic=rust",
            "--secret",
            "token=abc",
            "-m",
            "Hello",
            "-m",
            "Again",
            "--json",
        ])
        .unwrap();

        let Commands::Stream(args) = cli.command else {
            panic!("expected stream command");
        };
        assert_eq!(args.kind, TargetKind::Agent);
        assert_eq!(args.id, "a1");
        assert_eq!(args.user_id.as_deref(), Some("u1"));
        assert_eq!(args.variables, vec![("topic".to_string(), "rust".to_string())]);
        assert_eq!(args.secrets, vec![("token".to_string(), "abc".to_string())]);
        assert_eq!(args.messages, vec!["Hello".to_string(), "Again".to_string()]);
        assert!(args.json);
    }

    #[test]
    fn test_target_kind_is_case_insensitive() {
        let cli = Cli::try_parse_from(["chatrelay", "get", "PROMPT", "p1"]).unwrap();
        let Commands::Get(args) = cli.command else {
            panic!("expected get command");
        };
        assert_eq!(args.kind, TargetKind::Prompt);
    }

    #[test]
    fn test_unknown_target_kind_rejected() {
        assert!(Cli::try_parse_from(["chatrelay", "get", "model", "p1"]).is_err());
    }

    #[test]
    fn test_parse_review_command() {
        let cli = Cli::try_parse_from([
            "chatrelay", "review", "c1", "--score", "-1", "--text", "meh", "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Review(args) = cli.command else {
            panic!("expected review command");
        };
        assert_eq!(args.chat_id, "c1");
        assert_eq!(args.score, Some(-1));
        assert_eq!(args.text.as_deref(), Some("meh"));
        assert_eq!(args.user_id, None);
    }

    #[test]
    fn test_log_level_parse_env() {
        assert_eq!(LogLevel::parse_env("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse_env(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse_env("loud"), None);
        assert_eq!(LogLevel::Trace.directive(), "trace");
    }

    #[test]
    fn test_log_level_flag() {
        let cli = Cli::try_parse_from(["chatrelay", "--log-level", "info", "get", "prompt", "p1"])
            .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Info));
        assert!(!cli.verbose);
    }
}
