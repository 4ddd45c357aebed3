pub mod config;
pub mod drag;
pub mod errors;
pub mod logging;
pub mod server;
pub mod sync;
