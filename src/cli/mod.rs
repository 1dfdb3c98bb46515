pub mod args;
pub mod command_handlers;
pub mod prompt;
