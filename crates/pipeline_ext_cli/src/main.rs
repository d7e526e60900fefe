//! Command-line probe for pipeline extension discovery.
//!
//! # Responsibility
//! - Load unit manifests, run one discovery operation and print the names.
//! - Keep output deterministic (sorted) for quick local checks.

use clap::{Parser, ValueEnum};
use log::{error, info};
use pipeline_ext_core::{
    default_log_level, init_logging, init_stderr_logging, DetectorConfig, ExtensionDetector,
    ExtensionNames, LocalProjectBackend, Origin, ScanResult, Scope, SymbolQueryBackend,
    SymbolStore, WholeEnvironmentBackend,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendChoice {
    /// Locally compiled units only.
    Local,
    /// Local and dependency units.
    Whole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CategoryChoice {
    All,
    Steps,
    Globals,
    Symbols,
}

/// List the pipeline extension names contributed by compiled symbols.
#[derive(Debug, Parser)]
#[clap(name = "pipeline-ext", version)]
struct Cli {
    /// Manifest of a unit compiled by the project under test.
    #[clap(long = "local", value_name = "MANIFEST")]
    local: Vec<PathBuf>,

    /// Manifest of a unit shipped by a dependency.
    #[clap(long = "dependency", value_name = "MANIFEST")]
    dependency: Vec<PathBuf>,

    #[clap(long, value_enum, default_value = "local")]
    backend: BackendChoice,

    /// Namespace prefix; omit to scan everything reachable.
    #[clap(long)]
    scope: Option<String>,

    #[clap(long, value_enum, default_value = "all")]
    category: CategoryChoice,

    /// Log every per-symbol failure with its cause.
    #[clap(long)]
    expand_failures: bool,

    /// Print `{"names": [...]}` instead of one name per line.
    #[clap(long)]
    json: bool,

    #[clap(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[clap(long)]
    log_dir: Option<String>,
}

#[derive(Debug, Serialize)]
struct NamesOutput<'a> {
    names: &'a ExtensionNames,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let logging = match cli.log_dir.as_deref() {
        Some(dir) => init_logging(&level, dir),
        None => init_stderr_logging(&level),
    };
    if let Err(err) = logging {
        eprintln!("pipeline-ext: {err}");
        return ExitCode::from(2);
    }

    let config = if cli.expand_failures {
        DetectorConfig::expanded()
    } else {
        DetectorConfig::default()
    };

    let mut store = SymbolStore::new();
    for path in &cli.local {
        store.add_manifest(path, Origin::Local);
    }
    for path in &cli.dependency {
        store.add_manifest(path, Origin::Dependency);
    }
    let store = Arc::new(store);

    let backend: Box<dyn SymbolQueryBackend> = match cli.backend {
        BackendChoice::Local => Box::new(LocalProjectBackend::new(store, config)),
        BackendChoice::Whole => Box::new(WholeEnvironmentBackend::new(store, config)),
    };
    let detector = ExtensionDetector::new(backend, config);
    let scope = Scope::from_option(cli.scope.as_deref());

    let names = match discover(&detector, cli.category, &scope) {
        Ok(names) => names,
        Err(err) => {
            error!("event=cli_scan module=cli status=error error={err}");
            eprintln!("pipeline-ext: {err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string(&NamesOutput { names: &names }) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("pipeline-ext: failed to encode output: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for name in &names {
            println!("{name}");
        }
    }

    info!(
        "event=cli_scan module=cli status=ok backend={} scope={} names={}",
        detector.backend().label(),
        scope,
        names.len()
    );
    ExitCode::SUCCESS
}

fn discover<B: SymbolQueryBackend>(
    detector: &ExtensionDetector<B>,
    category: CategoryChoice,
    scope: &Scope,
) -> ScanResult<ExtensionNames> {
    match category {
        CategoryChoice::All => detector.get_all_extensions(scope),
        CategoryChoice::Steps => detector.get_steps(scope),
        CategoryChoice::Globals => detector.get_global_variables(scope),
        CategoryChoice::Symbols => detector.get_alias_symbols(scope),
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendChoice, CategoryChoice, Cli};
    use clap::Parser;

    #[test]
    fn parses_backend_scope_and_manifests() {
        let cli = Cli::try_parse_from([
            "pipeline-ext",
            "--local",
            "/tmp/project.json",
            "--dependency",
            "/tmp/a.json",
            "--dependency",
            "/tmp/b.json",
            "--backend",
            "whole",
            "--scope",
            "org.example",
            "--category",
            "steps",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.local.len(), 1);
        assert_eq!(cli.dependency.len(), 2);
        assert_eq!(cli.backend, BackendChoice::Whole);
        assert_eq!(cli.category, CategoryChoice::Steps);
        assert_eq!(cli.scope.as_deref(), Some("org.example"));
        assert!(!cli.json);
    }

    #[test]
    fn defaults_to_local_backend_and_all_categories() {
        let cli = Cli::try_parse_from(["pipeline-ext"]).expect("no arguments should parse");
        assert_eq!(cli.backend, BackendChoice::Local);
        assert_eq!(cli.category, CategoryChoice::All);
        assert!(cli.scope.is_none());
    }
}
