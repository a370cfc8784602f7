// Stages `static/` into `dist/`; on wasm targets also produces the JS bundle.
use std::path::Path;
use std::process::Command;
use std::{env, fs};

use fs_extra::dir::{copy, CopyOptions};

// Set on the nested wasm-pack invocation so its own cargo build skips bundling.
const NESTED: &str = "TODO_UNIVERSE_BUNDLING";

fn bundle() {
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .env(NESTED, "1")
        .status();
    match status {
        Ok(st) if st.success() => {}
        Ok(st) => println!("cargo:warning=wasm-pack build failed ({st})"),
        Err(_) => println!("cargo:warning=wasm-pack not installed – skipping"),
    }
}

fn stage(src: &Path, dst: &Path) {
    if dst.exists() {
        fs::remove_dir_all(dst).ok();
    }
    if let Err(err) = fs::create_dir_all(dst) {
        println!("cargo:warning=cannot create {}: {err}", dst.display());
        return;
    }
    if !src.exists() {
        return;
    }
    let options = CopyOptions::new().content_only(true).overwrite(true);
    if let Err(err) = copy(src, dst, &options) {
        println!("cargo:warning=copying static assets failed: {err}");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=static/index.html");
    println!("cargo:rerun-if-changed=static/style.css");

    let target = env::var("TARGET").unwrap_or_default();
    if target == "wasm32-unknown-unknown" && env::var_os(NESTED).is_none() {
        bundle();
    }
    stage(Path::new("static"), Path::new("dist"));
}
