//! Host-side helper: `cargo run` builds the WASM package into `static/pkg` and
//! serves `static/` locally so the background can be viewed in a browser.
#![cfg_attr(target_arch = "wasm32", allow(unused_imports, dead_code))]

use std::io;
use std::process::{Command, ExitCode, Stdio};
use std::{thread, time::Duration};

const PORT: &str = "8000";

// Only meaningful on non-wasm targets.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> io::Result<()> {
    log::info!("building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(st) => {
            return Err(io::Error::other(format!(
                "wasm-pack exited with {st}; is wasm-pack installed?"
            )));
        }
        Err(_) => {
            log::warn!("wasm-pack not found in PATH; serving whatever is already in static/pkg");
        }
    }

    log::info!("serving static/ at http://127.0.0.1:{PORT} …");
    let mut server = Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Keep process alive while the server runs.
    loop {
        if let Some(status) = server.try_wait()? {
            return Err(io::Error::other(format!("http server exited with {status}")));
        }
        thread::sleep(Duration::from_secs(1));
    }
}
