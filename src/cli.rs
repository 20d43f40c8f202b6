//! Command-line interface parsing for build_firefly
//!
//! This module handles parsing of CLI arguments using clap and resolves them
//! into the `BuildConfig` the build pipeline runs from.

use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::default_cache_dir;
use crate::data::dottrack::DOTTRACK_BASE_URL;
use crate::data::DEFAULT_TICK_SECONDS;
use crate::firefly::{ColorScheme, FIRST_COLOR, GENERAL_COLOR};
use crate::logging::Verbosity;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The --color value is not a JSON object of strings
    #[error("Invalid --color value: {0}. Expected a JSON object such as '{{\"12\": \"f00\"}}'")]
    InvalidColorMap(String),
}

/// Build firefly polyline data from a DotTrack race replay
#[derive(Parser, Debug)]
#[command(name = "build_firefly")]
#[command(about = "Build GPX data for firefly from a DotTrack replay")]
#[command(version)]
pub struct Cli {
    /// DotTrack project name, e.g. the race slug in the live URL
    #[arg(short, long)]
    pub project: String,

    /// Per-team color overrides as a JSON object of team id to color
    ///
    /// Example:
    ///   build_firefly -p race2024 --color '{"12": "f00", "31": "0af"}'
    #[arg(long, value_name = "JSON")]
    pub color: Option<String>,

    /// Directory to write firefly.json into
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Directory for cached API responses [default: XDG cache dir]
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the DotTrack live service
    #[arg(long, value_name = "URL", default_value = DOTTRACK_BASE_URL)]
    pub base_url: String,

    /// Seconds of race time per replay tick
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TICK_SECONDS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_seconds: u64,

    /// Color of the first team to finish
    #[arg(long, value_name = "COLOR", default_value = FIRST_COLOR)]
    pub first_color: String,

    /// Color of every other team
    #[arg(long, value_name = "COLOR", default_value = GENERAL_COLOR)]
    pub general_color: String,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Logging verbosity selected by -v / -q
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Configuration for one build, derived from CLI arguments
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// DotTrack project name
    pub project: String,
    /// Base URL of the DotTrack service
    pub base_url: String,
    /// Where cached responses live
    pub cache_dir: PathBuf,
    /// Where firefly.json is written
    pub output_dir: PathBuf,
    /// Seconds of race time per replay tick
    pub tick_seconds: u64,
    /// Team id string to color
    pub color_overrides: HashMap<String, String>,
    /// Default colors
    pub colors: ColorScheme,
}

/// Parses a --color argument into a team id to color map
///
/// # Returns
/// * `Ok(map)` if the string is a JSON object whose values are all strings
/// * `Err(CliError::InvalidColorMap)` otherwise
pub fn parse_color_arg(s: &str) -> Result<HashMap<String, String>, CliError> {
    serde_json::from_str(s).map_err(|e| CliError::InvalidColorMap(e.to_string()))
}

impl BuildConfig {
    /// Creates a BuildConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(BuildConfig)` with defaults filled in
    /// * `Err(CliError)` if --color is malformed
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let color_overrides = match &cli.color {
            Some(json) => parse_color_arg(json)?,
            None => HashMap::new(),
        };

        Ok(BuildConfig {
            project: cli.project.clone(),
            base_url: cli.base_url.clone(),
            cache_dir: cli.cache_dir.clone().unwrap_or_else(default_cache_dir),
            output_dir: cli.output.clone(),
            tick_seconds: cli.tick_seconds,
            color_overrides,
            colors: ColorScheme {
                first: cli.first_color.clone(),
                general: cli.general_color.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_arg_object() {
        let map = parse_color_arg(r#"{"12": "f00", "A3": "0af"}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["12"], "f00");
        assert_eq!(map["A3"], "0af");
    }

    #[test]
    fn test_parse_color_arg_empty_object() {
        assert!(parse_color_arg("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_color_arg_invalid() {
        for bad in ["", "{", "[\"f00\"]", r#"{"12": 5}"#, "f00"] {
            let result = parse_color_arg(bad);
            assert!(result.is_err(), "{:?} should be rejected", bad);
            assert!(result.unwrap_err().to_string().contains("Invalid --color"));
        }
    }

    #[test]
    fn test_cli_parse_project_only() {
        let cli = Cli::parse_from(["build_firefly", "--project", "race2024"]);
        assert_eq!(cli.project, "race2024");
        assert!(cli.color.is_none());
        assert_eq!(cli.output, PathBuf::from("output"));
        assert_eq!(cli.base_url, DOTTRACK_BASE_URL);
        assert_eq!(cli.tick_seconds, 120);
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_cli_parse_short_flags() {
        let cli = Cli::parse_from(["build_firefly", "-p", "x", "-o", "out", "-v"]);
        assert_eq!(cli.project, "x");
        assert_eq!(cli.output, PathBuf::from("out"));
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_cli_requires_project() {
        assert!(Cli::try_parse_from(["build_firefly"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_tick_seconds() {
        assert!(Cli::try_parse_from(["build_firefly", "-p", "x", "--tick-seconds", "0"]).is_err());
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["build_firefly", "-p", "x", "-v", "-q"]).is_err());
        let cli = Cli::parse_from(["build_firefly", "-p", "x", "-q"]);
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_build_config_defaults() {
        let cli = Cli::parse_from(["build_firefly", "-p", "race2024"]);
        let config = BuildConfig::from_cli(&cli).unwrap();
        assert_eq!(config.project, "race2024");
        assert!(config.color_overrides.is_empty());
        assert_eq!(config.colors, ColorScheme::default());
        assert_eq!(config.cache_dir, default_cache_dir());
    }

    #[test]
    fn test_build_config_with_overrides() {
        let cli = Cli::parse_from([
            "build_firefly",
            "-p",
            "race2024",
            "--color",
            r#"{"7": "f0f"}"#,
            "--cache-dir",
            "/tmp/ff-cache",
            "--first-color",
            "ff0",
        ]);
        let config = BuildConfig::from_cli(&cli).unwrap();
        assert_eq!(config.color_overrides["7"], "f0f");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/ff-cache"));
        assert_eq!(config.colors.first, "ff0");
        assert_eq!(config.colors.general, GENERAL_COLOR);
    }

    #[test]
    fn test_build_config_invalid_color() {
        let cli = Cli::parse_from(["build_firefly", "-p", "x", "--color", "not json"]);
        assert!(BuildConfig::from_cli(&cli).is_err());
    }
}
