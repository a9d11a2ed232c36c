// SPDX-License-Identifier: MIT
//
// kiln — a minimal screen-oriented terminal text viewer.
//
// This binary wires the two crates together:
//
//   kiln-term → raw-mode session, key decoding, frame output, geometry
//   kiln-view → line store, viewport, frame composition
//
// Startup order matters. Raw mode comes first, because the geometry
// fallback reads the terminal's cursor report and needs unechoed,
// unbuffered input. Then the window size, then the file. Each key flows
// through:
//
//   stdin → TtyInput → Decoder → Viewer::process_key → Viewport
//   Viewport + LineStore → render::compose → OutputBuffer → stdout
//
// Exit status is 0 after Ctrl+Q and 1 after any fatal error. On every exit
// path the terminal attributes are put back: `disable()` on the normal path
// so a failure can be reported, the session's `Drop` for early returns, and
// the panic hook for panics.

mod app;
mod config;
mod logging;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use kiln_term::ansi;
use kiln_term::geometry;
use kiln_term::input::Decoder;
use kiln_term::reader::TtyInput;
use kiln_term::resize;
use kiln_term::terminal::TerminalSession;
use kiln_view::LoadError;
use kiln_view::lines::LineStore;
use thiserror::Error;
use tracing::{error, info};

use crate::app::Viewer;
use crate::config::{Cli, Config};

/// Anything that ends the process with status 1.
#[derive(Debug, Error)]
enum FatalError {
    #[error(transparent)]
    Terminal(#[from] kiln_term::Error),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Exit status after Ctrl+Q, `--help` and `--version`.
const EXIT_SUCCESS: u8 = 0;
/// Exit status after any fatal error, usage errors included.
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(usage_status(&err));
        }
    };
    let config = Config::from(cli);

    if let Err(err) = logging::init(config.log.as_ref()) {
        eprintln!("kiln: {err}");
        return ExitCode::from(EXIT_FAILURE);
    }

    let result = run(&config);
    match &result {
        Ok(()) => info!("clean exit"),
        Err(err) => {
            error!(%err, "fatal");
            clear_screen_best_effort();
            eprintln!("kiln: {err}");
        }
    }
    ExitCode::from(exit_status(&result))
}

/// Status for a run of the viewer.
const fn exit_status(result: &Result<(), FatalError>) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}

/// Status when argument parsing stops early. `--help` and `--version` print
/// to stdout and are not failures; usage errors are.
fn usage_status(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

/// Hold the terminal in raw mode for the duration of [`view`].
fn run(config: &Config) -> Result<(), FatalError> {
    let mut session = TerminalSession::enable()?;

    let result = view(config);
    let restored = session.disable();

    result?;
    restored?;
    Ok(())
}

fn view(config: &Config) -> Result<(), FatalError> {
    let mut out = io::stdout().lock();
    let mut decoder = Decoder::new(TtyInput::stdin());

    let size = geometry::query_size(&mut out, decoder.source_mut())?;
    let lines = LineStore::open(config.path.as_deref())?;

    resize::install_handler();

    let mut viewer = Viewer::new(lines, size);
    viewer.run(&mut decoder, &mut out, || {
        resize::take_pending().then(geometry::window_size).flatten()
    })?;

    Ok(())
}

/// Clear and home so the diagnostic lands on a clean screen.
fn clear_screen_best_effort() {
    let mut out = io::stdout().lock();
    let _ = ansi::clear_screen(&mut out);
    let _ = ansi::cursor_home(&mut out);
    let _ = out.flush();
}

// ─── Tests ──────────────────────────────────────────────────────────────────
