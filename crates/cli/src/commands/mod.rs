//! CLI subcommands

pub mod estimate;
pub mod interactive;
pub mod lookup;
pub mod rates;
