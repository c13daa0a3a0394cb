//! CLI module for vault-renew.

pub mod args;
pub mod commands;

pub use args::Cli;
