//! CLI command handlers, one file per command.

mod check_decoder;
mod config_path;
mod paths;
mod resolve;

pub use check_decoder::run_check_decoder;
pub use config_path::run_config_path;
pub use paths::run_paths;
pub use resolve::{run_resolve, ResolveArgs};
