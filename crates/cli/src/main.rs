// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Testgate CLI entry point.
//!
//! No flags are parsed: behavior is driven by the `PR_LABELS` environment
//! variable (comma-separated CI labels) and the discovered testgate.toml.
//! This is the only place where the enforcement verdict becomes a process
//! exit code.

use tracing_subscriber::{EnvFilter, fmt};

use testgate::color::resolve_color;
use testgate::enforce::Enforcer;
use testgate::error::ExitCode;
use testgate::report::Reporter;
use testgate::symbols::TsFunctionParser;
use testgate::{Error, config};

/// Environment variable carrying the change's CI labels.
const LABELS_ENV: &str = "PR_LABELS";

fn init_logging() {
    let filter = EnvFilter::try_from_env("TESTGATE_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("testgate: {}", e);
            match e.downcast_ref::<Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            }
        }
    };

    std::process::exit(exit_code as i32);
}

/// Parse the comma-separated label list from the environment.
fn ci_labels() -> Vec<String> {
    std::env::var(LABELS_ENV)
        .map(|raw| {
            raw.split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn run() -> anyhow::Result<ExitCode> {
    let root = std::env::current_dir()?;
    let config = config::resolve(&root)?;
    let labels = ci_labels();
    tracing::debug!("labels: {:?}", labels);

    let parser = TsFunctionParser;
    let enforcer = Enforcer::new(&root, &config, &parser);
    let verdict = enforcer.run(&labels)?;

    let mut reporter = Reporter::new(resolve_color(), config.skip_label.as_str());
    reporter.write_verdict(&verdict)?;

    if verdict.passed() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::EnforcementFailed)
    }
}
