//! Imports Blue Archive account snapshots into the justin163 planner.
//!
//! Built for `wasm32-unknown-unknown` and loaded into the planner page. The
//! merge logic is target-independent and unit-tested natively; everything
//! that touches the browser lives in `browser`.

#[cfg(any(target_arch = "wasm32", test))]
mod coerce;
#[cfg(any(target_arch = "wasm32", test))]
mod config;
#[cfg(any(target_arch = "wasm32", test))]
mod error;
#[cfg(any(target_arch = "wasm32", test))]
mod importer;
#[cfg(any(target_arch = "wasm32", test))]
mod merge;
#[cfg(any(target_arch = "wasm32", test))]
mod save;
#[cfg(any(target_arch = "wasm32", test))]
mod snapshot;
#[cfg(any(target_arch = "wasm32", test))]
mod version;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    // Only fails if a logger is already installed, which is fine.
    let _ = console_log::init_with_level(log::Level::Info);
    browser::install();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("ba-planner-import runs inside the planner page; build it with `trunk build --release`.");
}
