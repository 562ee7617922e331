//! sqlscope CLI - read-only classification and table extraction for SQL scripts

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlscope_core::normalize::normalize_raw_identifier;
use sqlscope_core::parser::parse_script;
use sqlscope_core::{DialectFamily, Engine, EngineRegistry};
use tracing::Level;

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::{FileResources, FileVerdict, OutputFormatter};

const DEFAULT_ENGINE: Engine = Engine::MySql;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args) {
        Ok(has_findings) => {
            if has_findings {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::find_and_load()?.unwrap_or_default(),
    };
    let registry = EngineRegistry::with_default_engines();

    match args.command {
        Command::Classify {
            files,
            engine,
            format,
        } => {
            let config = config.merge_with_args(&files, &engine, &None, &None, &format);
            let engine = resolve_engine(&config)?;
            let entry = registry.lookup(engine).map_err(miette::Report::new)?;

            let mut reports = Vec::new();
            for file in collect_files(&config.files)? {
                let content = fs::read_to_string(&file).into_diagnostic()?;
                let verdict = entry
                    .validate_query(&content)
                    .map_err(|e| miette::Report::new(e).wrap_err(file.display().to_string()))?;
                tracing::info!(file = %file.display(), ?verdict, "classified");
                reports.push(FileVerdict {
                    file: file.display().to_string(),
                    verdict,
                });
            }

            if !args.quiet {
                OutputFormatter::new(config.format.unwrap_or_default(), engine)
                    .print_verdicts(&reports)?;
            }

            Ok(reports.iter().any(|r| !r.verdict.is_pure_read()))
        }

        Command::Resources {
            files,
            engine,
            database,
            schema,
            format,
        } => {
            let config = config.merge_with_args(&files, &engine, &database, &schema, &format);
            let engine = resolve_engine(&config)?;
            let entry = registry.lookup(engine).map_err(miette::Report::new)?;
            let family = family_of(engine)?;

            let case = family.identifier_case();
            let database = config
                .database
                .as_deref()
                .map(|d| normalize_raw_identifier(d, case))
                .unwrap_or_default();
            let schema = config
                .schema
                .as_deref()
                .map(|s| normalize_raw_identifier(s, case))
                .unwrap_or_default();
            if database.is_empty() {
                tracing::warn!("no --database given; unqualified tables resolve to an empty database");
            }

            let mut reports = Vec::new();
            for file in collect_files(&config.files)? {
                let content = fs::read_to_string(&file).into_diagnostic()?;
                let resources = entry
                    .extract_resource_list(&database, &schema, &content)
                    .map_err(|e| miette::Report::new(e).wrap_err(file.display().to_string()))?;
                tracing::info!(file = %file.display(), count = resources.len(), "extracted");
                reports.push(FileResources {
                    file: file.display().to_string(),
                    resources,
                });
            }

            if !args.quiet {
                OutputFormatter::new(config.format.unwrap_or_default(), engine)
                    .print_resources(&reports)?;
            }

            Ok(false)
        }

        Command::Engines => {
            for engine in registry.engines() {
                match engine.family() {
                    Some(family) => println!("{:<12} {}", engine.as_str(), family),
                    None => println!("{}", engine),
                }
            }
            Ok(false)
        }

        Command::Parse { file, engine } => {
            // Parse and display AST (for debugging)
            let config = config.merge_with_args(&[], &engine, &None, &None, &None);
            let engine = resolve_engine(&config)?;
            let family = family_of(engine)?;
            let content = fs::read_to_string(&file).into_diagnostic()?;

            match parse_script(family.parser_dialect().as_ref(), &content) {
                Ok(script) => {
                    for (i, stmt) in script.iter().enumerate() {
                        println!("Statement {}:", i + 1);
                        println!("{:#?}", stmt);
                        println!();
                    }
                    Ok(false)
                }
                Err(e) => Err(miette::Report::new(e)),
            }
        }
    }
}

fn resolve_engine(config: &Config) -> Result<Engine> {
    match &config.engine {
        Some(name) => name.parse().map_err(|e: String| miette::miette!(e)),
        None => Ok(DEFAULT_ENGINE),
    }
}

fn family_of(engine: Engine) -> Result<DialectFamily> {
    engine
        .family()
        .ok_or_else(|| miette::Report::new(sqlscope_core::Error::UnsupportedEngine(engine)))
}

/// Expand glob patterns; plain paths are passed through unchanged
fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') {
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                files.push(path);
            }
        } else {
            files.push(PathBuf::from(pattern));
        }
    }

    if files.is_empty() {
        miette::bail!(
            "No SQL files specified. Use positional arguments or configure `files` in sqlscope.toml"
        );
    }
    Ok(files)
}
