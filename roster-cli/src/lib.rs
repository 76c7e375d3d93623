//! Command-line and HTTP front-ends for `roster-validator`.

pub mod cli;
pub mod logging;
pub mod server;
