//! Library crate for m3u-scan-rs exposing reusable modules.
pub mod playlist;
pub mod probe;
pub mod report;
pub mod scanner;
pub mod server;
pub mod source;
pub mod types;
