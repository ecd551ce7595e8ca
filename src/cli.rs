//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CBMS Events - event registration sync and logistics analytics
///
/// Watch the provincial registration spreadsheet, aggregate participants
/// into logistics figures, and optionally request an AI briefing from a
/// local Ollama model.
///
/// Examples:
///   cbms-events --endpoint https://script.google.com/macros/s/abc/exec
///   cbms-events --demo --once --format json
///   cbms-events --demo --once --insight --model llama3.2:latest
///   cbms-events --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Record store endpoint URL
    ///
    /// The web-app endpoint fronting the registration spreadsheet.
    /// Can also be set via CBMS_STORE_URL or .cbms-events.toml.
    #[arg(short, long, value_name = "URL", env = "CBMS_STORE_URL")]
    pub endpoint: Option<String>,

    /// Run against built-in sample records instead of a remote store
    #[arg(long)]
    pub demo: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cbms-events.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Event name to filter by ("all" for no restriction)
    #[arg(long, value_name = "NAME")]
    pub event: Option<String>,

    /// Fetch and render once, then exit (no polling)
    #[arg(long)]
    pub once: bool,

    /// Also request an AI logistics insight (requires --once)
    #[arg(long)]
    pub insight: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Seconds between background refreshes
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Ollama model to use for the insight
    #[arg(short, long, default_value = "llama3.2:latest", env = "CBMS_MODEL")]
    pub model: String,

    /// Ollama API endpoint URL
    #[arg(long, default_value = "http://localhost:11434", env = "OLLAMA_URL")]
    pub ollama_url: String,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long, default_value = "0.2")]
    pub temperature: f32,

    /// Record store request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub store_timeout: Option<u64>,

    /// Insight request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub model_timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .cbms-events.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Terminal text dashboard (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.endpoint.is_none() && !self.demo {
            return Err(
                "Provide a record store with --endpoint (or CBMS_STORE_URL), or use --demo"
                    .to_string(),
            );
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Store endpoint must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.insight {
            if !self.once {
                return Err("--insight requires --once".to_string());
            }
            if !self.ollama_url.starts_with("http://") && !self.ollama_url.starts_with("https://")
            {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        if let Some(interval) = self.interval {
            if interval == 0 {
                return Err("Refresh interval must be at least 1 second".to_string());
            }
        }

        if let Some(timeout) = self.store_timeout.or(self.model_timeout) {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            endpoint: Some("https://script.google.com/macros/s/abc/exec".to_string()),
            demo: false,
            config: None,
            event: None,
            once: false,
            insight: false,
            format: OutputFormat::Text,
            interval: None,
            model: "llama3.2:latest".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            temperature: 0.2,
            store_timeout: None,
            model_timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args_pass() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_requires_endpoint_or_demo() {
        let mut args = make_args();
        args.endpoint = None;
        assert!(args.validate().is_err());

        args.demo = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_endpoint() {
        let mut args = make_args();
        args.endpoint = Some("script.google.com/exec".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_insight_requires_once() {
        let mut args = make_args();
        args.insight = true;
        assert!(args.validate().is_err());

        args.once = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut args = make_args();
        args.interval = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
