use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for snowmark
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Snowmark: markdown to sanitized HTML with a table of contents"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", global = true, action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the snowmark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render markdown to the JSON response envelope.
  ///
  /// Without inputs, or with `-`, markdown is read from stdin. Directories
  /// are searched recursively for `.md` files.
  Render {
    /// Markdown files or directories to render.
    inputs: Vec<PathBuf>,

    /// Write one `.json` file per input into this directory instead of
    /// printing to stdout.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,
  },

  /// Initialize a new snowmark configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "snowmark.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Print the effective sanitizer allow-list.
  Policy {
    /// Output format.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,
  },

  /// Print the CSS for syntax highlighted code blocks.
  Stylesheet {
    /// Highlighting theme. Defaults to `render.theme` from the configuration.
    #[arg(short, long)]
    theme: Option<String>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_render_arguments() {
    let cli = Cli::try_parse_from([
      "snowmark",
      "render",
      "docs",
      "README.md",
      "-o",
      "out",
      "-p",
      "2",
      "--config",
      "render.emoji=false",
      "-v",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.config_overrides, ["render.emoji=false"]);
    let Commands::Render {
      inputs,
      output_dir,
      pretty,
      jobs,
    } = cli.command
    else {
      panic!("expected render command");
    };
    assert_eq!(inputs, [PathBuf::from("docs"), PathBuf::from("README.md")]);
    assert_eq!(output_dir, Some(PathBuf::from("out")));
    assert!(!pretty);
    assert_eq!(jobs, Some(2));
  }

  #[test]
  fn test_repeated_config_files() {
    let cli = Cli::try_parse_from([
      "snowmark",
      "-c",
      "a.toml",
      "--config-file",
      "b.json",
      "policy",
    ])
    .unwrap();
    assert_eq!(cli.config_files, [
      PathBuf::from("a.toml"),
      PathBuf::from("b.json")
    ]);
    assert!(matches!(cli.command, Commands::Policy { ref format } if format == "toml"));
  }

  #[test]
  fn test_init_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["snowmark", "init", "-F", "yaml"]).is_err());
  }
}
