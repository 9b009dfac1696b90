//! Lookup relay between the catch-rate form and the upstream provider

pub mod api;
pub mod config;
