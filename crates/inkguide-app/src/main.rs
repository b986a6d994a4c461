// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// inkguide: smart guide scenario player
//
// Entry point. Initialises logging, loads the guide configuration and a
// scenario, and replays the scenario through the dispatcher on a
// current-thread runtime.

mod console;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use inkguide_bridge::MemoryEditor;
use inkguide_core::GuideConfig;
use inkguide_core::error::{GuideError, Result};
use inkguide_core::notice::notice_for;
use inkguide_engine::{Dispatcher, GuideController, TokioClock};

use console::ConsoleSurface;
use scenario::Scenario;

const USAGE: &str = "usage: inkguide [--config <path>] <scenario.json>";

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    scenario: PathBuf,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> std::result::Result<Self, String> {
        let mut config = None;
        let mut scenario = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or("--config needs a path")?;
                    config = Some(PathBuf::from(path));
                }
                "--help" | "-h" => return Err(String::new()),
                flag if flag.starts_with('-') => return Err(format!("unknown option {flag}")),
                path if scenario.is_none() => scenario = Some(PathBuf::from(path)),
                extra => return Err(format!("unexpected argument {extra}")),
            }
        }
        let scenario = scenario.ok_or("missing scenario file")?;
        Ok(Self { config, scenario })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("inkguide: {message}");
            }
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "scenario failed");
            ExitCode::FAILURE
        }
    }
}

/// Settings from `path`, or defaults when none is given or it cannot be read.
fn load_config(path: Option<&PathBuf>) -> GuideConfig {
    let Some(path) = path else {
        return GuideConfig::default();
    };
    match GuideConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            if let Some(notice) = notice_for(&GuideError::Config(e.to_string())) {
                eprintln!("{} {}", notice.message, notice.suggestion);
            }
            GuideConfig::default()
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref());
    let scenario = Scenario::load(&args.scenario)?;

    let editor = MemoryEditor::new();
    scenario.populate(&editor);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let guide = GuideController::with_config(editor.clone(), config, Box::new(TokioClock));
        let (sender, dispatcher) = Dispatcher::new(guide, scenario.listener_version);

        let settle = Duration::from_millis(scenario.settle_ms);
        let driver = tokio::spawn(scenario::play(scenario.steps, settle, editor.clone(), sender));

        let mut surface = ConsoleSurface::new();
        let guide = dispatcher.run(&mut surface).await;

        driver
            .await
            .map_err(|e| GuideError::Io(std::io::Error::other(e)))??;

        tracing::info!(
            block = guide.current_block_id().unwrap_or("-"),
            imports = editor.imports().len(),
            "scenario finished"
        );
        Ok(())
    })
}
