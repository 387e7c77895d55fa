//! Command handlers, one module per subcommand.

pub mod config_cmd;
pub mod poll;
pub mod watch;
