//! Overseer: live health dashboard for a small cluster of hosts polled over SSH.

pub mod app;
pub mod cli;
pub mod core;
pub mod screens;
pub mod utils;
