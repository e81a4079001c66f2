/*!
# CLI module
Command line interface functionality that is specific to runqc.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The process CLI subcommand
pub mod process;
/// The reference CLI subcommand
pub mod reference;
