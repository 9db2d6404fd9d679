//! # schemagen CLI entry point
//!
//! Parses command-line arguments, configures logging from the verbosity
//! flag, and dispatches to the subcommand handler.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schemagen_cli::generate::{run_generate, GenerateArgs};

/// Generate typed, validating Rust parsers from JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "schemagen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a Rust package from a directory of `*.schema.json` files.
    Generate(GenerateArgs),
}

fn filter_for(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(cli.verbose))
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Generate(args) => run_generate(args, cli.config.as_deref()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagen_codegen::Layout;

    #[test]
    fn parse_generate_with_defaults() {
        let cli = Cli::try_parse_from(["schemagen", "generate", "schemas"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.config, None);
        let Commands::Generate(args) = cli.command;
        assert_eq!(args.schemas_dir, PathBuf::from("schemas"));
        assert_eq!(args.output, None);
        assert_eq!(args.layout, None);
        assert!(args.exclude.is_empty());
    }

    #[test]
    fn parse_every_generate_flag() {
        let cli = Cli::try_parse_from([
            "schemagen",
            "generate",
            "schemas",
            "-o",
            "out",
            "--package-name",
            "people",
            "--package-version",
            "1.2.3",
            "--layout",
            "bundled",
            "--exclude",
            "a.schema.json",
            "--exclude",
            "b.schema.json",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command;
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.package_name.as_deref(), Some("people"));
        assert_eq!(args.package_version.as_deref(), Some("1.2.3"));
        assert_eq!(args.layout, Some(Layout::Bundled));
        assert_eq!(args.exclude, ["a.schema.json", "b.schema.json"]);
    }

    #[test]
    fn parse_global_flags() {
        let cli =
            Cli::try_parse_from(["schemagen", "-vv", "--config", "schemagen.yaml", "generate", "s"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("schemagen.yaml")));
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!(Cli::try_parse_from(["schemagen", "generate", "s", "--layout", "flat"]).is_err());
    }

    #[test]
    fn missing_subcommand_or_directory_is_rejected() {
        assert!(Cli::try_parse_from(["schemagen"]).is_err());
        assert!(Cli::try_parse_from(["schemagen", "generate"]).is_err());
    }
}
