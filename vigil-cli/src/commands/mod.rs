//! Command handlers -- one module per subcommand

pub mod config;
pub mod dashboard;
pub mod events;
pub mod export;
pub mod sync;
