// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{Context, Result};
use midigen::command::parse_script;
use midigen::{Session, SessionConfig};
use std::env;
use std::fs;

fn print_usage() {
    println!("midigen - Compose and export MIDI from a command script");
    println!();
    println!("Usage: midigen <SCRIPT> [OPTIONS]");
    println!();
    println!("Arguments:");
    println!("  <SCRIPT>           YAML list of commands to run against one session");
    println!();
    println!("Options:");
    println!("  --config <FILE>    Session config (.yaml, .yml or .toml)");
    println!("  -v, --verbose      Log every edit");
    println!("  --help             Show this help message");
}

struct Args {
    script: String,
    config: Option<String>,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Option<Args>> {
    let mut script = None;
    let mut config = None;
    let mut verbose = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "-v" | "--verbose" => verbose = true,
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                config = Some(path.clone());
            }
            other if other.starts_with('-') => {
                anyhow::bail!("Unknown option: {}", other);
            }
            other => {
                if script.replace(other.to_string()).is_some() {
                    anyhow::bail!("Only one script may be given");
                }
            }
        }
    }

    match script {
        Some(script) => Ok(Some(Args {
            script,
            config,
            verbose,
        })),
        None => Ok(None),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let args = match parse_args(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(1);
        }
    };

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let mut session = Session::with_config(config)?;

    let contents = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script: {:?}", args.script))?;
    let commands = parse_script(&contents)
        .with_context(|| format!("Failed to parse script: {:?}", args.script))?;

    let mut failures = 0;
    for command in commands {
        let response = session.execute(command);
        if response.is_error() {
            failures += 1;
        }
        let yaml = serde_yaml::to_string(&vec![response])
            .context("Failed to serialize response")?;
        print!("{}", yaml);
    }

    if failures > 0 {
        tracing::warn!("{} command(s) were rejected", failures);
    }
    Ok(())
}
