//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`
//! and serves `static/` locally.

use std::env;
use std::process::{exit, Command, ExitStatus, Stdio};

const BUNDLE_ARGS: [&str; 6] = ["build", "--release", "--target", "web", "--out-dir", "static/pkg"];

fn build_bundle() {
    println!("Building todo universe bundle …");
    // The marker keeps build.rs from starting a second wasm-pack run.
    let status = Command::new("wasm-pack")
        .args(BUNDLE_ARGS)
        .env("TODO_UNIVERSE_BUNDLING", "1")
        .status();
    match status {
        Ok(status) if status.success() => {}
        Ok(status) => {
            eprintln!("wasm-pack exited with {status}");
            exit(1);
        }
        Err(err) => eprintln!("wasm-pack unavailable ({err}); serving existing static/pkg"),
    }
}

fn serve(port: &str) -> std::io::Result<ExitStatus> {
    println!("Todo universe at http://127.0.0.1:{port} (Ctrl+C to stop)");
    Command::new("python3")
        .args(["-m", "http.server", port, "--directory", "static"])
        .stdout(Stdio::null())
        .spawn()?
        .wait()
}

fn main() {
    let port = env::var("UNIVERSE_PORT").unwrap_or_else(|_| "8000".to_string());
    build_bundle();
    match serve(&port) {
        Ok(status) if status.success() => {}
        Ok(status) => {
            eprintln!("http server exited with {status}");
            exit(1);
        }
        Err(err) => {
            eprintln!("failed to start http server: {err}");
            exit(1);
        }
    }
}
