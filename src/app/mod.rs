pub mod cli;
pub mod dispatch;

pub use cli::{CheckCommands, Cli, Commands, ItemCommands};
pub use dispatch::dispatch;
