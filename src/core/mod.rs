pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub mod web_io;
