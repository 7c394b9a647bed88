//! dealer-tool - split, combine and merge dealer collections.
//!
//! File IO, logging and prompting live here; the reconciliation itself is
//! done by the dealer-engine crate.

mod commands;
mod config;
mod error;
mod io;
mod prompt;

use crate::commands::{combine, merge, split};
use crate::config::Config;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dealer-tool", version, about)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Write compact JSON files instead of indented ones
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write every dealer of a collection to its own file
    Split(split::SplitArgs),
    /// Combine dealer files from a directory into one collection
    Combine(combine::CombineArgs),
    /// Merge incoming dealers into a base collection
    Merge(merge::MergeArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "dealer_tool=info",
        1 => "dealer_tool=debug",
        _ => "dealer_tool=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let mut config = Config::from_env()?;
    if cli.compact {
        config.pretty = false;
    }

    match &cli.command {
        Command::Split(args) => print_summary(&split::run(args, &config)?, cli.json)?,
        Command::Combine(args) => print_summary(&combine::run(args, &config)?, cli.json)?,
        Command::Merge(args) => print_summary(&merge::run(args, &config)?, cli.json)?,
    }

    Ok(())
}

fn print_summary<S: Serialize + Display>(summary: &S, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_merge_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dealer-tool",
            "merge",
            "-b",
            "base.json",
            "-o",
            "out.json",
            "--policy",
            "merge-fields",
            "a.json",
            "b.json",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Command::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.policy, Some(merge::PolicyArg::MergeFields));
        assert_eq!(args.incoming.len(), 2);
    }

    #[test]
    fn merge_requires_incoming_files() {
        let result = Cli::try_parse_from(["dealer-tool", "merge", "-b", "a.json", "-o", "b.json"]);
        assert!(result.is_err());
    }
}
