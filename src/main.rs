// SPDX-License-Identifier: MIT
//
// ked — a minimal raw-mode terminal text editor.
//
// This is the binary that wires the crates together:
//
//   k-term   → raw mode, window size, key reads, frame output
//   k-syntax → language table and the row token scanner
//   k-core   → buffer, cursor, dispatch, search, screen composition
//
// The loop itself is deliberately tiny and single-threaded:
//
//   refresh → read key → dispatch → repeat
//
// Every iteration composes a complete frame from current state and
// writes it as one chunk; the key read is the only blocking point, and
// it wakes periodically to notice window resizes. Fatal errors unwind
// through main, the Terminal handle restores the user's settings on
// drop, and only then is the error printed to a working terminal.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use k_core::editor::{ControlFlow, Editor};
use k_core::screen;
use k_term::input::KeySource;
use k_term::reader::TermKeys;
use k_term::terminal::Terminal;

fn main() -> ExitCode {
    let path = env::args_os().nth(1).map(PathBuf::from);

    match run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The Terminal handle has already restored the screen by the
            // time the error escapes run().
            eprintln!("ked: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<PathBuf>) -> k_core::Result<()> {
    let mut term = Terminal::new()?;
    term.enter()?;

    let size = term.size();
    let mut editor = match &path {
        Some(path) => Editor::from_file(path, size)?,
        None => Editor::new(size)?,
    };
    editor.set_status_message("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");

    let mut keys = TermKeys::new();
    let mut out = io::stdout();

    loop {
        screen::refresh(&mut editor, &mut out)?;

        let key = keys.read_key()?;
        if editor.process_key(key, &mut keys, &mut out)? == ControlFlow::Quit {
            break;
        }
    }

    term.leave()?;
    Ok(())
}
