#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

pub mod account;
pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod notify;
pub mod render;
pub mod render_loop;
pub mod scene;
pub mod session;
pub mod storage;
pub mod todos;
pub mod view_mode;

pub use app::{Renderers, Universe};
pub use config::UniverseConfig;
pub use error::{Result, StorageError, UniverseError};

// Browser shell: only compiled when targeting wasm32. Everything above is
// plain Rust and runs (and is tested) on the host too.
#[cfg(target_arch = "wasm32")]
mod wasm;
