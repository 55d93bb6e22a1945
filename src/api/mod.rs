//! Transport adapters: HTTP server, serverless handler, and console

pub mod console;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod server;

pub use handler::handle_event;
