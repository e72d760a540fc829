//! Haven server: configuration loading and startup maintenance shared by
//! the `haven` binary's subcommands.

pub mod prepare;
pub mod settings;

pub use prepare::{Healed, Prepared, heal, prepare};
pub use settings::ServerConfig;
