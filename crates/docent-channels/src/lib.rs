//! Terminal front end for Docent.

pub mod cli;
mod line_editor;

pub use cli::CliChannel;
