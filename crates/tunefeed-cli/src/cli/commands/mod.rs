//! CLI command handlers. Each command is in its own file.

mod completions;
mod probe;
mod run;

pub use completions::{run_completions, run_manpage};
pub use probe::run_probe;
pub use run::{run_session, RunOverrides};
