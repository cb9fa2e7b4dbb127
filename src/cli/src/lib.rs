pub mod commands;
pub mod config;
pub mod constants;
pub mod logging;
pub mod process_command;
