#![warn(clippy::all, rust_2018_idioms)]

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use paint_scripts::Session;

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: paint_scripts <session.json>");
        return ExitCode::FAILURE;
    };

    let replay = match Session::load(&path).and_then(|session| session.run()) {
        Ok(replay) => replay,
        Err(e) => {
            log::error!("{}: {}", path, e);
            eprintln!("{}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(replay.host.log()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to encode log: {}", e);
            ExitCode::FAILURE
        }
    }
}

// Sessions are replayed from files, which the web build has none of.
#[cfg(target_arch = "wasm32")]
fn main() {}
