//! awaitguard CLI - run the runner-await rule over compilation files

mod render;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use awaitguard_checker::{AnalysisDriver, AnalyzerSettings, RuleDescriptor, Severity};
use awaitguard_symbols::{Compilation, SymbolError};

#[derive(Parser)]
#[command(name = "awaitguard")]
#[command(about = "Flags runner awaits outside async task-returning constructs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze compilation files
    Check {
        /// Compilation file(s) in JSON form
        files: Vec<PathBuf>,
        /// Analyze operation blocks concurrently
        #[arg(long)]
        parallel: bool,
        /// Override a rule's severity (e.g. W-ASYNC-001=error)
        #[arg(long = "severity", value_name = "RULE=LEVEL", value_parser = parse_override)]
        severity: Vec<(String, Severity)>,
        /// Disable a rule by id
        #[arg(long = "disable", value_name = "RULE")]
        disable: Vec<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Human)]
        format: Format,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Describe a rule, or list all rules
    Explain {
        /// Rule id
        rule: Option<String>,
    },
    /// Print the operation blocks of a compilation file
    Dump {
        /// Input file
        file: PathBuf,
        /// Re-emit the validated compilation as pretty JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
}

/// Errors reported by the command line front end
#[derive(Debug, Error)]
enum CliError {
    /// E-CLI-001
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Compilation file failed to decode or validate
    #[error("{}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: SymbolError,
    },

    /// E-CLI-002
    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    /// E-CLI-003
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    /// E-CLI-004
    #[error("cannot encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            CliError::Read { .. } => "E-CLI-001",
            CliError::Load { source, .. } => source.code(),
            CliError::UnknownRule(_) => "E-CLI-002",
            CliError::Output(_) => "E-CLI-003",
            CliError::Encode(_) => "E-CLI-004",
        }
    }
}

fn parse_override(s: &str) -> Result<(String, Severity), String> {
    let (rule, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected RULE=LEVEL, got `{}`", s))?;
    let rule = rule.trim();
    if rule.is_empty() {
        return Err(format!("missing rule id in `{}`", s));
    }
    Ok((rule.to_string(), level.trim().parse()?))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("AWAITGUARD_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Check {
            files,
            parallel,
            severity,
            disable,
            format,
            no_color,
        } => {
            let options = CheckOptions {
                parallel,
                severity,
                disable,
                format,
                color: !no_color,
            };
            cmd_check(&files, options)
        }
        Commands::Explain { rule } => cmd_explain(rule.as_deref()),
        Commands::Dump { file, json } => cmd_dump(&file, json),
    };

    match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error[{}]: {}", error.code(), error);
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<Compilation, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let compilation = Compilation::from_json(&json).map_err(|source| CliError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        blocks = compilation.blocks.len(),
        symbols = compilation.symbols.len(),
        "compilation loaded"
    );
    Ok(compilation)
}

struct CheckOptions {
    parallel: bool,
    severity: Vec<(String, Severity)>,
    disable: Vec<String>,
    format: Format,
    color: bool,
}

fn build_driver(options: &CheckOptions) -> Result<AnalysisDriver, CliError> {
    let registry = AnalysisDriver::with_default_rules(AnalyzerSettings::default());
    let canonical = |rule: &str| {
        find_rule(&registry, rule)
            .map(|d| d.id.to_string())
            .ok_or_else(|| CliError::UnknownRule(rule.to_string()))
    };

    let mut severity_overrides = HashMap::new();
    for (rule, level) in &options.severity {
        severity_overrides.insert(canonical(rule)?, *level);
    }
    let disabled_rules: HashSet<String> = options
        .disable
        .iter()
        .map(|rule| canonical(rule))
        .collect::<Result<_, _>>()?;

    Ok(AnalysisDriver::with_default_rules(AnalyzerSettings {
        parallel: options.parallel,
        severity_overrides,
        disabled_rules,
    }))
}

fn find_rule<'a>(driver: &'a AnalysisDriver, id: &str) -> Option<&'a RuleDescriptor> {
    driver
        .rules()
        .map(|rule| rule.descriptor())
        .find(|d| d.id.eq_ignore_ascii_case(id))
}

fn cmd_check(files: &[PathBuf], options: CheckOptions) -> Result<ExitCode, CliError> {
    let driver = build_driver(&options)?;
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut all_ok = true;
    let mut reports = Vec::new();

    for file in files {
        let compilation = match load(file) {
            Ok(compilation) => compilation,
            Err(error) => {
                eprintln!("error[{}]: {}", error.code(), error);
                all_ok = false;
                continue;
            }
        };

        let result = driver.run(&compilation);
        info!(path = %file.display(), diagnostics = result.diagnostics.len(), "checked");
        if result.has_errors() {
            all_ok = false;
        }

        match options.format {
            Format::Json => reports.push(json!({
                "file": file.display().to_string(),
                "compilation": compilation.name,
                "diagnostics": result.diagnostics,
                "inert_rules": result.inert_rules,
            })),
            Format::Human => {
                render::write_diagnostics(
                    &compilation,
                    &result.diagnostics,
                    options.color,
                    &mut stderr.lock(),
                )?;
                let mark = if result.diagnostics.is_empty() { "✓" } else { "✗" };
                writeln!(
                    stdout.lock(),
                    "{} {} - {} diagnostics in {} blocks",
                    mark,
                    file.display(),
                    result.diagnostics.len(),
                    result.blocks_analyzed
                )?;
            }
        }
    }

    if options.format == Format::Json {
        writeln!(stdout.lock(), "{}", serde_json::to_string_pretty(&reports)?)?;
    }

    Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn cmd_explain(rule: Option<&str>) -> Result<ExitCode, CliError> {
    let driver = AnalysisDriver::with_default_rules(AnalyzerSettings::default());
    let mut out = io::stdout().lock();

    let Some(id) = rule else {
        for descriptor in driver.rules().map(|r| r.descriptor()) {
            writeln!(
                out,
                "{:<12} {:<8} {}",
                descriptor.id, descriptor.default_severity, descriptor.title
            )?;
        }
        return Ok(ExitCode::SUCCESS);
    };

    let descriptor = find_rule(&driver, id).ok_or_else(|| CliError::UnknownRule(id.to_string()))?;
    writeln!(out, "{}: {}", descriptor.id, descriptor.title)?;
    writeln!(out)?;
    writeln!(out, "Category:         {}", descriptor.category)?;
    writeln!(out, "Default severity: {}", descriptor.default_severity)?;
    writeln!(out, "Enabled:          {}", descriptor.enabled_by_default)?;
    writeln!(out)?;
    writeln!(out, "{}", descriptor.help)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_dump(file: &Path, as_json: bool) -> Result<ExitCode, CliError> {
    let compilation = load(file)?;
    let mut out = io::stdout().lock();
    if as_json {
        let json = compilation.to_json_pretty().map_err(|source| CliError::Load {
            path: file.to_path_buf(),
            source,
        })?;
        writeln!(out, "{}", json)?;
    } else {
        render::write_dump(&compilation, &mut out)?;
    }
    Ok(ExitCode::SUCCESS)
}
