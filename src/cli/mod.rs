mod args;
mod ingest;
mod remove;
mod search;
mod stats;

pub use args::{Args, Command};
pub use ingest::run_ingest;
pub use remove::run_remove;
pub use search::run_search;
pub use stats::run_stats;
