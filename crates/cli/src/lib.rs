//! Public library modules for the CLI crate
pub mod error;
pub mod output;
pub mod server;
pub mod summarizer;
pub mod uploads;
