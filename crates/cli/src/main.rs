//! `fieldcheck` -- validate JSON-lines submissions against declared rules.
//!
//! Reads one `{"type": ..., "fields": {...}}` object per line from the file
//! named by the first argument, or from stdin, and writes one verdict per
//! line to stdout.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                        |
//! |-------------------------|----------|---------|------------------------------------|
//! | `RUST_LOG`              | no       | --      | Log filter, `fieldcheck=info,fieldcheck_cli=info,fieldcheck_core=info` when unset |
//! | `FIELDCHECK_LOG_FORMAT` | no       | `text`  | `text` or `json` log output        |
//! | `FIELDCHECK_DETAILED`   | no       | `false` | Include violations in each verdict |
//!
//! Exit status: `0` all valid, `1` at least one rejected, `2` on error.

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use fieldcheck_cli::check;
use fieldcheck_cli::config::{CheckConfig, LogFormat};
use fieldcheck_core::{catalog, ValidatorRegistry};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "fieldcheck=info,fieldcheck_cli=info,fieldcheck_core=info";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match CheckConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(check::exit_status(&Err(e)));
        }
    };

    init_tracing(config.log_format);

    let registry = ValidatorRegistry::global();
    catalog::declare_all(registry);
    tracing::debug!(types = ?registry.declared_types(), "Registry ready");

    let path = std::env::args().nth(1);
    let stdout = io::stdout().lock();
    let result = match path.as_deref() {
        None | Some("-") => check::run(registry, io::stdin().lock(), stdout, config.detailed),
        Some(path) => match File::open(path) {
            Ok(file) => check::run(registry, BufReader::new(file), stdout, config.detailed),
            Err(e) => {
                tracing::error!(path, error = %e, "Cannot open input");
                return ExitCode::from(check::exit_status(&Err(e.into())));
            }
        },
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Submission check failed");
    }
    ExitCode::from(check::exit_status(&result))
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
    }
}
